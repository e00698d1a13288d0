//! # Lifecycle & Orchestration
//!
//! Everything that turns a configuration into a running simulation and back:
//!
//! 1. [`config`] - [`SimulatorConfig`], defaults plus `SIM_*` environment overrides
//! 2. [`bootstrap`] - [`load_restaurants`], selecting restaurants from a locations file
//! 3. [`load_simulator`] - [`LoadSimulator`], spawning the order actor and the restaurant
//!    actors, wiring the service (with or without retry) and shutting everything down
//! 4. [`tracing`] - [`setup_tracing`]
//!
//! ## Dependency Injection via Context
//!
//! The order actor receives its repository and journal through `run(context)`, not at
//! construction time. Restaurants receive the order service as an `Arc<dyn OrderService>`
//! inside their [`Kitchen`](crate::simulation::Kitchen), so tests can hand them any
//! implementation.
//!
//! ## Shutdown Order
//!
//! Restaurants are stopped first, which drops their service handles; the order actor
//! then sees its channel close and exits.

pub mod bootstrap;
pub mod config;
pub mod load_simulator;
pub mod tracing;

pub use bootstrap::*;
pub use config::*;
pub use load_simulator::*;
pub use self::tracing::setup_tracing;
