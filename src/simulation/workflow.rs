//! Staged fulfillment of one order.
//!
//! A [`DeliveryWorkflow`] is an immutable list of [`StageSpec`]s plus a cursor. Stages are
//! scheduled lazily: a stage's due position is only computed when the previous stage has
//! fired, from the scheduler's position at that moment. At most one event per workflow
//! is ever waiting in the scheduler.

use crate::model::Order;
use crate::simulation::{DeliveryAction, DeliveryEvent, DeliveryEventType, DeliveryScheduler, WorkflowId};
use tracing::debug;

/// How a stage turns the scheduler's position into its due position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageTiming {
    /// `delay` ticks after the position at scheduling time.
    After(u64),
    /// A fixed position. A position already in the past becomes due immediately.
    At(u64),
}

impl StageTiming {
    pub fn due_at(&self, position: u64) -> u64 {
        match self {
            StageTiming::After(delay) => position.saturating_add(*delay),
            StageTiming::At(due) => (*due).max(position),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSpec {
    pub event_type: DeliveryEventType,
    pub timing: StageTiming,
    pub action: DeliveryAction,
}

/// What [`DeliveryWorkflow::schedule_next`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleOutcome {
    /// The next stage was enqueued at `due`.
    Scheduled { due: u64 },
    /// An earlier stage is still waiting in the scheduler; nothing was enqueued.
    InFlight,
    /// Every stage has run.
    Complete,
}

/// Collects stage specs in order. Nothing is enqueued until
/// [`DeliveryWorkflow::execute`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowBuilder {
    stages: Vec<StageSpec>,
}

impl WorkflowBuilder {
    pub fn stage(mut self, event_type: DeliveryEventType, timing: StageTiming, action: DeliveryAction) -> Self {
        self.stages.push(StageSpec {
            event_type,
            timing,
            action,
        });
        self
    }

    pub fn build(self, id: WorkflowId, order: Order) -> DeliveryWorkflow {
        DeliveryWorkflow {
            id,
            stages: self.stages,
            cursor: 0,
            current_order: order,
            in_flight: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DeliveryWorkflow {
    id: WorkflowId,
    stages: Vec<StageSpec>,
    cursor: usize,
    current_order: Order,
    in_flight: bool,
}

impl DeliveryWorkflow {
    pub fn builder() -> WorkflowBuilder {
        WorkflowBuilder::default()
    }

    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.stages
    }

    /// Number of stages already handed to the scheduler.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_order(&self) -> &Order {
        &self.current_order
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn is_complete(&self) -> bool {
        !self.in_flight && self.cursor >= self.stages.len()
    }

    /// Enqueues the first stage. Returns immediately; the stage fires on a later frame.
    pub fn execute(&mut self, scheduler: &mut DeliveryScheduler) -> ScheduleOutcome {
        self.schedule_next(scheduler)
    }

    /// Records the order as returned by the stage that just fired.
    pub fn set_current_order_state(&mut self, order: Order) {
        self.current_order = order;
        self.in_flight = false;
    }

    /// Enqueues the next pending stage against the current order snapshot.
    pub fn schedule_next(&mut self, scheduler: &mut DeliveryScheduler) -> ScheduleOutcome {
        if self.in_flight {
            return ScheduleOutcome::InFlight;
        }
        let Some(stage) = self.stages.get(self.cursor).copied() else {
            return ScheduleOutcome::Complete;
        };

        let due = stage.timing.due_at(scheduler.position());
        scheduler.enqueue(DeliveryEvent {
            due,
            event_type: stage.event_type,
            order: self.current_order.clone(),
            workflow: self.id,
            action: stage.action,
        });
        self.cursor += 1;
        self.in_flight = true;

        debug!(
            workflow = %self.id,
            order_id = %self.current_order.id,
            event_type = %stage.event_type,
            due,
            "Stage scheduled"
        );
        ScheduleOutcome::Scheduled { due }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderId, OrderStatus};

    fn three_stage(order: Order) -> DeliveryWorkflow {
        DeliveryWorkflow::builder()
            .stage(
                DeliveryEventType::OrderAssigned,
                StageTiming::After(2),
                DeliveryAction::Assign { store_id: 4 },
            )
            .stage(
                DeliveryEventType::OrderPreparing,
                StageTiming::After(1),
                DeliveryAction::Prepare,
            )
            .stage(
                DeliveryEventType::OrderPrepared,
                StageTiming::At(3),
                DeliveryAction::Ready,
            )
            .build(WorkflowId(1), order)
    }

    #[test]
    fn test_timing_resolves_against_position() {
        assert_eq!(StageTiming::After(3).due_at(10), 13);
        assert_eq!(StageTiming::At(15).due_at(10), 15);
        assert_eq!(StageTiming::At(4).due_at(10), 10);
        assert_eq!(StageTiming::After(u64::MAX).due_at(10), u64::MAX);
    }

    #[test]
    fn test_building_enqueues_nothing() {
        let scheduler = DeliveryScheduler::new();
        let workflow = three_stage(Order::new(OrderId(1)));

        assert!(scheduler.is_empty());
        assert_eq!(workflow.cursor(), 0);
        assert_eq!(workflow.stages().len(), 3);
    }

    #[test]
    fn test_at_most_one_event_in_flight() {
        let mut scheduler = DeliveryScheduler::new();
        let mut workflow = three_stage(Order::new(OrderId(1)));

        assert_eq!(workflow.execute(&mut scheduler), ScheduleOutcome::Scheduled { due: 2 });
        assert_eq!(workflow.schedule_next(&mut scheduler), ScheduleOutcome::InFlight);
        assert_eq!(scheduler.pending_for(WorkflowId(1)), 1);
    }

    #[test]
    fn test_walks_every_stage_then_completes() {
        let mut scheduler = DeliveryScheduler::new();
        let mut workflow = three_stage(Order::new(OrderId(1)));
        workflow.execute(&mut scheduler);

        let mut fired = Vec::new();
        while !workflow.is_complete() {
            scheduler.advance();
            for event in scheduler.next_frame() {
                let mut order = event.order.clone();
                order.status = OrderStatus::OrderAssigned;
                fired.push((event.event_type, event.due));
                workflow.set_current_order_state(order);
                let outcome = workflow.schedule_next(&mut scheduler);
                assert!(scheduler.pending_for(WorkflowId(1)) <= 1);
                if outcome == ScheduleOutcome::Complete {
                    assert!(scheduler.is_empty());
                }
            }
        }

        assert_eq!(
            fired,
            vec![
                (DeliveryEventType::OrderAssigned, 2),
                (DeliveryEventType::OrderPreparing, 3),
                (DeliveryEventType::OrderPrepared, 3),
            ]
        );
        assert_eq!(workflow.current_order().status, OrderStatus::OrderAssigned);
    }

    #[test]
    fn test_next_stage_carries_latest_snapshot() {
        let mut scheduler = DeliveryScheduler::new();
        let mut workflow = three_stage(Order::new(OrderId(1)));
        workflow.execute(&mut scheduler);

        scheduler.advance_to(2);
        let first = scheduler.next_frame().remove(0);
        let mut assigned = first.order.clone();
        assigned.status = OrderStatus::OrderAssigned;
        workflow.set_current_order_state(assigned.clone());
        workflow.schedule_next(&mut scheduler);

        scheduler.advance_to(3);
        let second = scheduler.next_frame().remove(0);
        assert_eq!(second.order, assigned);
        assert_eq!(second.event_type, DeliveryEventType::OrderPreparing);
    }
}
