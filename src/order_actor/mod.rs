//! # Order Actor
//!
//! The in-process order-tracking service. Orders live in a
//! [`ResourceActor`](crate::framework::ResourceActor); lifecycle transitions are the
//! actor's custom actions.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](crate::framework::ActorEntity) implementation for [`Order`]
//! - [`actions`] - [`OrderAction`] transitions with precondition checks and compensation
//! - [`store`] - [`OrderRepository`] and [`EventJournal`] boundaries with in-memory versions
//! - [`error`] - [`OrderError`]
//! - [`new()`] - Factory function that creates the actor and client
//!
//! Because the actor handles one request at a time, two transitions on the same order id
//! can never race their read-modify-write.

pub mod actions;
pub mod entity;
pub mod error;
pub mod store;

pub use actions::*;
pub use error::*;
pub use store::*;

use crate::clients::OrderClient;
use crate::framework::ResourceActor;
use crate::model::Order;
use std::sync::Arc;

/// Collaborators injected into the Order actor through `run()`.
#[derive(Clone)]
pub struct OrderServiceContext {
    pub repository: Arc<dyn OrderRepository>,
    pub journal: Arc<dyn EventJournal>,
}

impl OrderServiceContext {
    pub fn new(repository: Arc<dyn OrderRepository>, journal: Arc<dyn EventJournal>) -> Self {
        Self {
            repository,
            journal,
        }
    }

    /// Context backed by [`InMemoryOrderRepository`] and [`InMemoryJournal`].
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryOrderRepository::new()),
            Arc::new(InMemoryJournal::new()),
        )
    }
}

/// Creates a new Order actor and its client.
pub fn new() -> (ResourceActor<Order>, OrderClient) {
    let (actor, generic_client) = ResourceActor::new(64);
    (actor, OrderClient::new(generic_client))
}
