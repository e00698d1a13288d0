use crate::clients::OrderService;
use crate::model::Order;
use crate::order_actor::OrderError;
use std::fmt::Display;

/// Index of a [`DeliveryWorkflow`](crate::simulation::DeliveryWorkflow) in its kitchen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorkflowId(pub u64);

impl Display for WorkflowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "workflow_{}", self.0)
    }
}

/// Which fulfillment step an event drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeliveryEventType {
    OrderAssigned,
    OrderPreparing,
    OrderPrepared,
}

impl Display for DeliveryEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DeliveryEventType::OrderAssigned => "ORDER_ASSIGNED",
            DeliveryEventType::OrderPreparing => "ORDER_PREPARING",
            DeliveryEventType::OrderPrepared => "ORDER_PREPARED",
        };
        f.write_str(name)
    }
}

/// The call a stage makes against the order service when its event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryAction {
    Assign { store_id: u32 },
    Prepare,
    Ready,
}

impl DeliveryAction {
    /// Applies the action to `order` and returns the service's view of it afterwards.
    pub async fn apply(&self, service: &dyn OrderService, order: &Order) -> Result<Order, OrderError> {
        match self {
            DeliveryAction::Assign { store_id } => service.assign_order(order.id, *store_id).await,
            DeliveryAction::Prepare => service.prepare_order(order.id).await,
            DeliveryAction::Ready => service.order_ready(order.id).await,
        }
    }
}

/// One scheduled occurrence on a restaurant's event calendar.
#[derive(Debug, Clone, PartialEq)]
pub struct DeliveryEvent {
    /// Simulated clock position at which the event becomes due.
    pub due: u64,
    pub event_type: DeliveryEventType,
    /// Order snapshot the action runs against.
    pub order: Order,
    /// Workflow to advance once the action has run.
    pub workflow: WorkflowId,
    pub action: DeliveryAction,
}

impl Display for DeliveryEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}@{} order={} {}",
            self.event_type, self.due, self.order.id, self.workflow
        )
    }
}
