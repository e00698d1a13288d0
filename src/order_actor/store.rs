//! Persistence boundaries of the order service.
//!
//! [`OrderRepository`] keeps the latest snapshot of every order; [`EventJournal`] keeps
//! the audit trail. Lifecycle commands write to both, and a failing journal append is
//! what triggers compensation.

use crate::model::{Order, OrderEvent, OrderId};
use crate::order_actor::OrderError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// Snapshot storage for orders.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores `order`, replacing any previous snapshot with the same id.
    async fn save(&self, order: Order) -> Result<Order, OrderError>;

    async fn find(&self, id: OrderId) -> Result<Option<Order>, OrderError>;
}

/// Append-only audit log of order events.
#[async_trait]
pub trait EventJournal: Send + Sync {
    async fn append(&self, event: &OrderEvent) -> Result<(), OrderError>;
}

#[derive(Debug, Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn save(&self, order: Order) -> Result<Order, OrderError> {
        let mut orders = self
            .orders
            .lock()
            .map_err(|e| OrderError::Persistence(e.to_string()))?;
        orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn find(&self, id: OrderId) -> Result<Option<Order>, OrderError> {
        let orders = self
            .orders
            .lock()
            .map_err(|e| OrderError::Persistence(e.to_string()))?;
        Ok(orders.get(&id).cloned())
    }
}

#[derive(Debug, Default)]
pub struct InMemoryJournal {
    events: Mutex<Vec<OrderEvent>>,
}

impl InMemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every event appended so far, oldest first.
    pub fn events(&self) -> Vec<OrderEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EventJournal for InMemoryJournal {
    async fn append(&self, event: &OrderEvent) -> Result<(), OrderError> {
        let mut events = self
            .events
            .lock()
            .map_err(|e| OrderError::AuditAppend(e.to_string()))?;
        events.push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{OrderEventType, OrderStatus};

    #[tokio::test]
    async fn test_repository_keeps_latest_snapshot() {
        let repository = InMemoryOrderRepository::new();
        let mut order = Order::new(OrderId(3));
        repository.save(order.clone()).await.unwrap();

        order.status = OrderStatus::OrderAssigned;
        repository.save(order).await.unwrap();

        let stored = repository.find(OrderId(3)).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::OrderAssigned);
        assert!(repository.find(OrderId(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_journal_preserves_append_order() {
        let journal = InMemoryJournal::new();
        let order = Order::new(OrderId(1));
        journal
            .append(&OrderEvent::new(OrderEventType::OrderCreated, &order))
            .await
            .unwrap();
        journal
            .append(&OrderEvent::new(OrderEventType::OrderAssigned, &order))
            .await
            .unwrap();

        let types: Vec<_> = journal.events().iter().map(|e| e.event_type).collect();
        assert_eq!(
            types,
            vec![OrderEventType::OrderCreated, OrderEventType::OrderAssigned]
        );
    }
}
