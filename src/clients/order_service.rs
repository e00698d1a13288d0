use crate::model::{Order, OrderId};
use crate::order_actor::OrderError;
use async_trait::async_trait;

/// Operations the simulation needs from the order-tracking service.
///
/// Each transition only succeeds from one status:
///
/// | Operation | Requires | Moves to |
/// |---|---|---|
/// | `create` | - | `CREATED` |
/// | `assign_order` | `CREATED` | `ORDER_ASSIGNED` |
/// | `prepare_order` | `ORDER_ASSIGNED` | `ORDER_PREPARING` |
/// | `order_ready` | `ORDER_PREPARING` | `ORDER_PREPARED` |
/// | `start_delivery` | `ORDER_PREPARED` | `ORDER_DELIVERING` |
/// | `deliver` | `ORDER_DELIVERING` | `ORDER_DELIVERED` |
///
/// A transition whose audit event could not be recorded still returns `Ok`, with the
/// order in its original status.
#[async_trait]
pub trait OrderService: Send + Sync {
    async fn create(&self, candidate_id: OrderId) -> Result<Order, OrderError>;

    async fn assign_order(&self, order_id: OrderId, store_id: u32) -> Result<Order, OrderError>;

    async fn prepare_order(&self, order_id: OrderId) -> Result<Order, OrderError>;

    async fn order_ready(&self, order_id: OrderId) -> Result<Order, OrderError>;

    async fn start_delivery(&self, order_id: OrderId) -> Result<Order, OrderError>;

    async fn deliver(&self, order_id: OrderId) -> Result<Order, OrderError>;
}
