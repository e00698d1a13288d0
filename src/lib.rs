//! # Delivery Simulator
//!
//! > **Restaurants generating load against an order-tracking service.**
//!
//! Each restaurant is an actor with its own simulated clock. On a randomized interval it
//! creates an order and schedules that order's fulfillment as a three-stage workflow
//! (assigned, preparing, prepared). On a fixed frame tick it advances its clock, fires
//! every stage that has become due and schedules the next one. Every stage calls the
//! order service, which applies the status transition, records an audit event and
//! reverts the transition if the event cannot be recorded.
//!
//! ## 🚀 Core Concepts
//!
//! ### Simulated time
//! A restaurant's position only moves on its frame tick. Due positions are computed when
//! a stage is scheduled, never when the workflow is built, so a slow service call delays
//! the following stages instead of letting them pile up.
//!
//! ### Actors
//! The order service is a generic [`ResourceActor`](framework::ResourceActor) over
//! [`Order`](model::Order). Restaurants are [`RestaurantActor`](simulation::RestaurantActor)s.
//! Both process one message at a time, so neither needs locks around its own state, and
//! two transitions on the same order can never interleave.
//!
//! ### Compensation as data
//! A transition whose audit event fails is rolled back and reported as
//! [`TransitionOutcome::Compensated`](order_actor::TransitionOutcome::Compensated) rather
//! than as an error.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic actor loop and client, plus [`MockClient`](framework::mock::MockClient)
//! for testing clients without a running actor.
//!
//! ### 2. The Order Service ([`model`], [`order_actor`], [`clients`])
//! - **Key items**: [`OrderAction`](order_actor::OrderAction),
//!   [`OrderService`](clients::OrderService), [`OrderClient`](clients::OrderClient),
//!   [`RetryingOrderService`](clients::RetryingOrderService).
//!
//! ### 3. The Simulation ([`simulation`])
//! - **Key items**: [`DeliveryScheduler`](simulation::DeliveryScheduler),
//!   [`DeliveryWorkflow`](simulation::DeliveryWorkflow), [`Kitchen`](simulation::Kitchen),
//!   [`RestaurantClient`](simulation::RestaurantClient).
//!
//! ### 4. The Orchestrator ([`lifecycle`])
//! - **Key items**: [`SimulatorConfig`](lifecycle::SimulatorConfig),
//!   [`load_restaurants`](lifecycle::load_restaurants),
//!   [`LoadSimulator`](lifecycle::LoadSimulator). See [`lifecycle::tracing`] for logging.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # San Francisco restaurants from data/locations.json, one frame per second
//! RUST_LOG=info cargo run
//!
//! # Faster, reproducible run with client retries
//! SIM_SEED=7 SIM_PROFILE=development RUST_LOG=debug cargo run
//! ```

pub mod clients;
pub mod framework;
pub mod lifecycle;
pub mod model;
pub mod order_actor;
pub mod simulation;
