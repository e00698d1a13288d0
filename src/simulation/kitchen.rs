//! Simulation state of one restaurant.
//!
//! The [`Kitchen`] owns the restaurant's scheduler and its workflows and knows how to
//! react to the two periodic ticks: a new order arriving and a frame of due events being
//! processed. It has no timers of its own; [`RestaurantActor`](crate::simulation::RestaurantActor)
//! decides when each tick happens.

use crate::clients::OrderService;
use crate::model::{OrderId, Restaurant, RestaurantProperties};
use crate::order_actor::OrderError;
use crate::simulation::{
    DeliveryAction, DeliveryEventType, DeliveryScheduler, DeliveryWorkflow, ScheduleOutcome,
    StageTiming, WorkflowId,
};
use rand::rngs::StdRng;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Shared preparation queue of a kitchen.
///
/// Each order reserves a random slice of kitchen time on top of every order before it,
/// so later orders are ready later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KitchenQueue {
    pub prepared_until: u64,
}

impl KitchenQueue {
    /// Reserves `delay` more ticks and returns the new queue with the position at which
    /// the reserving order will be prepared.
    pub fn reserve(self, delay: u64) -> (Self, u64) {
        let prepared_until = self.prepared_until.saturating_add(delay);
        (Self { prepared_until }, prepared_until)
    }
}

/// Timings of the three fulfillment stages of one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryPlan {
    pub assign: StageTiming,
    pub preparing: StageTiming,
    pub prepared: StageTiming,
}

/// A random delay of `1 + round(uniform(0, 1) * window)` ticks, capped at `u64::MAX`.
pub fn future_time_frame(rng: &mut impl Rng, window: f64) -> u64 {
    // `as` saturates: NaN becomes 0, anything past the range becomes u64::MAX.
    let drawn = (rng.gen::<f64>() * window).round() as u64;
    drawn.saturating_add(1)
}

/// Draws the stage timings for a new order and threads the kitchen queue through.
pub fn plan_delivery(
    queue: KitchenQueue,
    preparation_rate: f64,
    rng: &mut impl Rng,
) -> (DeliveryPlan, KitchenQueue) {
    let (queue, prepared_at) = queue.reserve(future_time_frame(rng, preparation_rate));
    let plan = DeliveryPlan {
        assign: StageTiming::After(future_time_frame(rng, 2.0)),
        preparing: StageTiming::After(future_time_frame(rng, 3.0)),
        prepared: StageTiming::At(prepared_at),
    };
    (plan, queue)
}

/// Counters exposed through [`RestaurantClient::snapshot`](crate::simulation::RestaurantClient::snapshot).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KitchenStats {
    pub position: u64,
    pub orders_created: u64,
    pub orders_failed: u64,
    pub events_fired: u64,
    pub workflows_active: usize,
    pub workflows_completed: u64,
    pub workflows_stalled: u64,
}

/// What one call to [`Kitchen::process_frame`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    pub position: u64,
    /// `(workflow, event type, due)` of every event in the frame, in firing order.
    pub fired: Vec<(WorkflowId, DeliveryEventType, u64)>,
    pub completed: Vec<WorkflowId>,
    pub stalled: Vec<WorkflowId>,
}

pub struct Kitchen {
    restaurant: Restaurant,
    properties: RestaurantProperties,
    service: Arc<dyn OrderService>,
    scheduler: DeliveryScheduler,
    workflows: HashMap<WorkflowId, DeliveryWorkflow>,
    next_workflow: u64,
    queue: KitchenQueue,
    rng: StdRng,
    stats: KitchenStats,
}

impl Kitchen {
    pub fn new(
        restaurant: Restaurant,
        properties: RestaurantProperties,
        service: Arc<dyn OrderService>,
        rng: StdRng,
    ) -> Self {
        Self {
            restaurant,
            properties,
            service,
            scheduler: DeliveryScheduler::new(),
            workflows: HashMap::new(),
            next_workflow: 1,
            queue: KitchenQueue::default(),
            rng,
            stats: KitchenStats::default(),
        }
    }

    pub fn restaurant(&self) -> &Restaurant {
        &self.restaurant
    }

    pub fn properties(&self) -> &RestaurantProperties {
        &self.properties
    }

    pub fn scheduler(&self) -> &DeliveryScheduler {
        &self.scheduler
    }

    pub fn workflow(&self, id: WorkflowId) -> Option<&DeliveryWorkflow> {
        self.workflows.get(&id)
    }

    pub fn stats(&self) -> KitchenStats {
        KitchenStats {
            position: self.scheduler.position(),
            workflows_active: self.workflows.len(),
            ..self.stats
        }
    }

    /// Advances the simulated clock by one tick.
    pub fn tick(&mut self) -> u64 {
        self.scheduler.advance()
    }

    /// Creates an order through the service and starts its three-stage workflow.
    pub async fn order_received(&mut self) -> Result<WorkflowId, OrderError> {
        let candidate = OrderId(self.rng.gen_range(0..=100_000_000));
        let order = match self.service.create(candidate).await {
            Ok(order) => order,
            Err(e) => {
                self.stats.orders_failed += 1;
                return Err(e);
            }
        };
        self.stats.orders_created += 1;

        let (plan, queue) = plan_delivery(self.queue, self.properties.preparation_rate, &mut self.rng);
        self.queue = queue;

        let id = WorkflowId(self.next_workflow);
        self.next_workflow += 1;

        let mut workflow = DeliveryWorkflow::builder()
            .stage(
                DeliveryEventType::OrderAssigned,
                plan.assign,
                DeliveryAction::Assign {
                    store_id: self.restaurant.store_id,
                },
            )
            .stage(DeliveryEventType::OrderPreparing, plan.preparing, DeliveryAction::Prepare)
            .stage(DeliveryEventType::OrderPrepared, plan.prepared, DeliveryAction::Ready)
            .build(id, order);
        workflow.execute(&mut self.scheduler);

        debug!(
            store_id = self.restaurant.store_id,
            workflow = %id,
            order_id = %workflow.current_order().id,
            prepared_until = self.queue.prepared_until,
            "Order received"
        );
        self.workflows.insert(id, workflow);
        Ok(id)
    }

    /// Fires every event due at the current position and advances their workflows.
    ///
    /// A failing action is logged and its workflow is dropped without scheduling its
    /// next stage; the other events of the frame still run.
    pub async fn process_frame(&mut self) -> FrameReport {
        let mut report = FrameReport {
            position: self.scheduler.position(),
            ..FrameReport::default()
        };
        if self.scheduler.is_empty() {
            return report;
        }

        let frame = self.scheduler.next_frame();
        if frame.is_empty() {
            return report;
        }
        let summary: Vec<String> = frame.iter().map(|event| event.to_string()).collect();

        for event in frame {
            report.fired.push((event.workflow, event.event_type, event.due));
            self.stats.events_fired += 1;

            let order = match event.action.apply(self.service.as_ref(), &event.order).await {
                Ok(order) => order,
                Err(e) => {
                    error!(
                        store_id = self.restaurant.store_id,
                        workflow = %event.workflow,
                        order_id = %event.order.id,
                        event_type = %event.event_type,
                        error = %e,
                        "Delivery action failed, workflow stalled"
                    );
                    self.workflows.remove(&event.workflow);
                    self.stats.workflows_stalled += 1;
                    report.stalled.push(event.workflow);
                    continue;
                }
            };

            let Some(workflow) = self.workflows.get_mut(&event.workflow) else {
                continue;
            };
            workflow.set_current_order_state(order);
            if workflow.schedule_next(&mut self.scheduler) == ScheduleOutcome::Complete {
                self.workflows.remove(&event.workflow);
                self.stats.workflows_completed += 1;
                report.completed.push(event.workflow);
            }
        }

        info!(
            store_id = self.restaurant.store_id,
            position = report.position,
            "[ORDER_EVENT]: {}: [{}]",
            self.restaurant.name,
            summary.join(", ")
        );
        report
    }
}
