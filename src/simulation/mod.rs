//! # Delivery Simulation
//!
//! Discrete-event simulation of restaurants fulfilling orders against the order service.
//!
//! - [`scheduler`] - [`DeliveryScheduler`], the per-restaurant event calendar
//! - [`workflow`] - [`DeliveryWorkflow`], the staged fulfillment of one order
//! - [`kitchen`] - [`Kitchen`], what a restaurant does on each tick
//! - [`restaurant`] - [`RestaurantActor`] and [`RestaurantClient`], the tickers and the actor loop
//!
//! Time is simulated: a restaurant's position only moves when its frame ticker fires,
//! and every due position is expressed in those ticks.

pub mod error;
pub mod event;
pub mod kitchen;
pub mod restaurant;
pub mod scheduler;
pub mod workflow;

pub use error::*;
pub use event::*;
pub use kitchen::*;
pub use restaurant::*;
pub use scheduler::*;
pub use workflow::*;
