//! Pure data structures shared by the order service and the simulation.

pub mod order;
pub mod restaurant;

pub use order::*;
pub use restaurant::*;
