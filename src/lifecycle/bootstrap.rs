//! Restaurant bootstrap from a locations file.

use crate::lifecycle::{ConfigError, SimulatorConfig};
use crate::model::{Restaurant, RestaurantProperties};
use rand::Rng;
use tracing::{debug, info};

/// Reads the locations file named by `config.locations_path`.
pub async fn read_locations(config: &SimulatorConfig) -> Result<String, ConfigError> {
    tokio::fs::read_to_string(&config.locations_path)
        .await
        .map_err(|source| ConfigError::Io {
            path: config.locations_path.clone(),
            source,
        })
}

/// Selects the restaurants to simulate from a JSON array of locations.
///
/// Keeps `config.city` only, sorted by store id and capped at `restaurant_limit`. Each
/// restaurant gets its own new-order interval drawn from
/// [`SimulatorConfig::new_order_range`].
pub fn load_restaurants(
    json: &str,
    config: &SimulatorConfig,
    rng: &mut impl Rng,
) -> Result<Vec<(Restaurant, RestaurantProperties)>, ConfigError> {
    let mut restaurants: Vec<Restaurant> = serde_json::from_str(json)?;
    let total = restaurants.len();

    restaurants.retain(|r| r.city == config.city);
    restaurants.sort_by_key(|r| r.store_id);
    restaurants.truncate(config.restaurant_limit);

    let selected: Vec<(Restaurant, RestaurantProperties)> = restaurants
        .into_iter()
        .map(|restaurant| {
            let properties = RestaurantProperties::new(
                rng.gen_range(config.new_order_range()),
                config.preparation_time_ms,
                config.preparation_rate,
            );
            debug!(
                store_id = restaurant.store_id,
                name = %restaurant.name,
                new_order_ms = properties.new_order_time,
                "Restaurant selected"
            );
            (restaurant, properties)
        })
        .collect();

    info!(city = %config.city, total, selected = selected.len(), "Restaurants loaded");
    Ok(selected)
}
