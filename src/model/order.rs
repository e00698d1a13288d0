use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of an order. Transitions only ever move forward along this chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    OrderAssigned,
    OrderPreparing,
    OrderPrepared,
    OrderDelivering,
    OrderDelivered,
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OrderStatus::Created => "CREATED",
            OrderStatus::OrderAssigned => "ORDER_ASSIGNED",
            OrderStatus::OrderPreparing => "ORDER_PREPARING",
            OrderStatus::OrderPrepared => "ORDER_PREPARED",
            OrderStatus::OrderDelivering => "ORDER_DELIVERING",
            OrderStatus::OrderDelivered => "ORDER_DELIVERED",
        };
        f.write_str(name)
    }
}

/// Tag of an audit record appended to an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    OrderCreated,
    OrderAssigned,
    OrderPreparing,
    OrderPrepared,
    OrderDelivering,
    OrderDelivered,
}

/// Audit record of a successful transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub event_type: OrderEventType,
    pub timestamp: DateTime<Utc>,
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub store_id: Option<u32>,
}

impl OrderEvent {
    /// Captures `order` as it stands right now.
    pub fn new(event_type: OrderEventType, order: &Order) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            order_id: order.id,
            status: order.status,
            store_id: order.store_id,
        }
    }
}

/// Represents a customer order as tracked by the order service.
///
/// # Actor Framework
/// This struct implements the [`ActorEntity`](crate::framework::ActorEntity) trait,
/// allowing it to be managed by a [`ResourceActor`](crate::framework::ResourceActor).
///
/// See [`impl ActorEntity for Order`](#impl-ActorEntity-for-Order) for details on:
/// - Creation parameters ([`OrderCreate`])
/// - Lifecycle actions ([`OrderAction`](crate::order_actor::OrderAction))
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub status: OrderStatus,
    pub store_id: Option<u32>,
    pub events: Vec<OrderEvent>,
}

/// Payload for creating a new order.
///
/// `candidate_id` is the id the caller would like; the service may pick another one.
#[derive(Debug, Clone, Default)]
pub struct OrderCreate {
    pub candidate_id: Option<OrderId>,
}

impl Order {
    /// Creates a fresh order in the `Created` state with no history.
    pub fn new(id: OrderId) -> Self {
        Self {
            id,
            status: OrderStatus::Created,
            store_id: None,
            events: Vec::new(),
        }
    }
}
