use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A restaurant location as it appears in the bootstrap data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    pub name: String,
    pub city: String,
    pub country: String,
    pub longitude: f64,
    pub latitude: f64,
    pub store_id: u32,
}

/// Pacing of one restaurant. Fixed for the restaurant's lifetime.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RestaurantProperties {
    /// Delay between two generated orders, in milliseconds.
    pub new_order_time: u64,
    /// Delay between two frame-processing ticks, in milliseconds.
    pub preparation_time: u64,
    /// Width of the random window added to the kitchen queue per order.
    pub preparation_rate: f64,
}

impl RestaurantProperties {
    pub fn new(new_order_time: u64, preparation_time: u64, preparation_rate: f64) -> Self {
        Self {
            new_order_time,
            preparation_time,
            preparation_rate,
        }
    }

    pub fn new_order_interval(&self) -> Duration {
        Duration::from_millis(self.new_order_time)
    }

    pub fn preparation_interval(&self) -> Duration {
        Duration::from_millis(self.preparation_time)
    }
}
