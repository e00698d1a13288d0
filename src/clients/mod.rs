//! Type-safe wrappers around [`ResourceClient`](crate::framework::ResourceClient) and the
//! [`OrderService`] boundary the simulation drives.

pub mod actor_client;
pub mod order_client;
pub mod order_service;
pub mod retry;

pub use actor_client::*;
pub use order_client::*;
pub use order_service::*;
pub use retry::*;
