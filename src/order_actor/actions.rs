//! Lifecycle actions for the Order actor.
//!
//! Every variant of [`OrderAction`] is one guarded, compensating transition:
//!
//! 1. The order must currently sit in the action's required status, otherwise the call
//!    fails with [`OrderError::BadRequest`] and nothing is touched.
//! 2. The new status is applied and the snapshot is saved.
//! 3. An audit [`OrderEvent`] is appended to the journal.
//! 4. If the append fails, the pre-transition status is restored and saved again. The
//!    caller gets [`TransitionOutcome::Compensated`] carrying the reverted order and the
//!    reason instead of an error.
//!
//! | Action | Requires | Moves to |
//! |---|---|---|
//! | `Assign` | `CREATED` | `ORDER_ASSIGNED` |
//! | `Prepare` | `ORDER_ASSIGNED` | `ORDER_PREPARING` |
//! | `Ready` | `ORDER_PREPARING` | `ORDER_PREPARED` |
//! | `Dispatch` | `ORDER_PREPARED` | `ORDER_DELIVERING` |
//! | `Deliver` | `ORDER_DELIVERING` | `ORDER_DELIVERED` |

use crate::model::{Order, OrderEvent, OrderEventType, OrderStatus};
use crate::order_actor::{EventJournal, OrderError, OrderRepository};
use tracing::{debug, error};

/// Custom actions for Order entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderAction {
    /// Hands the order to a store.
    Assign { store_id: u32 },
    Prepare,
    Ready,
    /// A driver picked the order up.
    Dispatch,
    Deliver,
}

/// Result of an [`OrderAction`] that passed its precondition.
#[derive(Debug, Clone, PartialEq)]
pub enum TransitionOutcome {
    /// The transition went through and its event was recorded.
    Applied(Order),
    /// The event could not be recorded; `order` is back in its original status.
    Compensated { order: Order, reason: OrderError },
}

impl TransitionOutcome {
    pub fn order(&self) -> &Order {
        match self {
            TransitionOutcome::Applied(order) => order,
            TransitionOutcome::Compensated { order, .. } => order,
        }
    }

    pub fn into_order(self) -> Order {
        match self {
            TransitionOutcome::Applied(order) => order,
            TransitionOutcome::Compensated { order, .. } => order,
        }
    }

    pub fn is_compensated(&self) -> bool {
        matches!(self, TransitionOutcome::Compensated { .. })
    }
}

impl OrderAction {
    pub fn required_status(&self) -> OrderStatus {
        match self {
            OrderAction::Assign { .. } => OrderStatus::Created,
            OrderAction::Prepare => OrderStatus::OrderAssigned,
            OrderAction::Ready => OrderStatus::OrderPreparing,
            OrderAction::Dispatch => OrderStatus::OrderPrepared,
            OrderAction::Deliver => OrderStatus::OrderDelivering,
        }
    }

    pub fn target_status(&self) -> OrderStatus {
        match self {
            OrderAction::Assign { .. } => OrderStatus::OrderAssigned,
            OrderAction::Prepare => OrderStatus::OrderPreparing,
            OrderAction::Ready => OrderStatus::OrderPrepared,
            OrderAction::Dispatch => OrderStatus::OrderDelivering,
            OrderAction::Deliver => OrderStatus::OrderDelivered,
        }
    }

    pub fn event_type(&self) -> OrderEventType {
        match self {
            OrderAction::Assign { .. } => OrderEventType::OrderAssigned,
            OrderAction::Prepare => OrderEventType::OrderPreparing,
            OrderAction::Ready => OrderEventType::OrderPrepared,
            OrderAction::Dispatch => OrderEventType::OrderDelivering,
            OrderAction::Deliver => OrderEventType::OrderDelivered,
        }
    }

    fn check_order_state(&self, order: &Order) -> Result<(), OrderError> {
        let required = self.required_status();
        if order.status != required {
            return Err(OrderError::BadRequest(format!(
                "Order must be in a {} state. {{state={}}}",
                required, order.status
            )));
        }
        Ok(())
    }

    /// Runs this transition against `order`.
    ///
    /// Returns `Err` only when the precondition fails or the repository does; a failed
    /// journal append is reported through [`TransitionOutcome::Compensated`].
    pub async fn apply(
        &self,
        order: Order,
        repository: &dyn OrderRepository,
        journal: &dyn EventJournal,
    ) -> Result<TransitionOutcome, OrderError> {
        self.check_order_state(&order)?;

        let previous_status = order.status;
        let previous_store = order.store_id;

        let mut order = order;
        order.status = self.target_status();
        if let OrderAction::Assign { store_id } = self {
            order.store_id = Some(*store_id);
        }
        let event = OrderEvent::new(self.event_type(), &order);
        order.events.push(event.clone());
        let mut order = repository.save(order).await?;

        match journal.append(&event).await {
            Ok(()) => {
                debug!(order_id = %order.id, status = %order.status, "Transition applied");
                Ok(TransitionOutcome::Applied(order))
            }
            Err(reason) => {
                error!(
                    order_id = %order.id,
                    action = ?self,
                    error = %reason,
                    "Could not complete transition, reverting to {}",
                    previous_status
                );
                order.events.pop();
                order.status = previous_status;
                order.store_id = previous_store;
                let order = match repository.save(order).await {
                    Ok(order) => order,
                    Err(e) => {
                        error!(
                            order_id = %event.order_id,
                            stored_status = %event.status,
                            error = %e,
                            "Revert could not be saved, repository diverges from the service"
                        );
                        return Err(e);
                    }
                };
                Ok(TransitionOutcome::Compensated { order, reason })
            }
        }
    }
}
