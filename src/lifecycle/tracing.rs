//! # Observability & Tracing
//!
//! [`setup_tracing`] installs a compact `tracing-subscriber` formatter filtered by
//! `RUST_LOG`. Module paths are hidden (`with_target(false)`); every log line carries
//! structured fields such as `store_id`, `order_id`, `position` and `event_type` instead.
//!
//! ## Usage Examples
//!
//! ```bash
//! # One [ORDER_EVENT] line per processed frame, restaurant open/close, compensations
//! RUST_LOG=info cargo run
//!
//! # Every order request, stage scheduling and actor message
//! RUST_LOG=debug cargo run
//!
//! # Scheduler enqueues as well
//! RUST_LOG=trace cargo run
//!
//! # Only the simulation internals
//! RUST_LOG=delivery_sim::simulation=debug cargo run
//! ```
//!
//! ## Sample Output
//!
//! With `RUST_LOG=info`:
//!
//! ```text
//! INFO Restaurant opened store_id=12 new_order_ms=71523 frame_ms=1000
//! INFO Created entity_type="Order" id=48211093 size=1
//! INFO Action ok entity_type="Order" id=48211093
//! INFO [ORDER_EVENT]: Mission Tacos: [ORDER_ASSIGNED@63 order=48211093 workflow_1] store_id=12 position=63
//! ```
//!
//! A compensated transition shows up as an `ERROR` from the order actor followed by a
//! `WARN Transition compensated` on the client side.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
