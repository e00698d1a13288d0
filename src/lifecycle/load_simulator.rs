use crate::clients::{OrderClient, OrderService, RetryingOrderService};
use crate::lifecycle::SimulatorConfig;
use crate::model::{Restaurant, RestaurantProperties};
use crate::order_actor::OrderServiceContext;
use crate::simulation::{Kitchen, RestaurantActor, RestaurantClient, RestaurantSnapshot, SimulationError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// Runtime orchestrator for a load simulation.
///
/// `LoadSimulator` owns:
/// - **The order service**: a `ResourceActor<Order>` with its injected repository and journal
/// - **One restaurant actor per selected location**, each with its own seeded RNG
/// - **Task handles** for graceful shutdown
///
/// Restaurants talk to the order service through an [`OrderService`], wrapped in a
/// [`RetryingOrderService`] when `config.retry.enabled` is set.
///
/// # Example
///
/// ```ignore
/// let mut rng = StdRng::seed_from_u64(7);
/// let restaurants = load_restaurants(&json, &config, &mut rng)?;
/// let simulator = LoadSimulator::new(&config, restaurants, &mut rng);
///
/// simulator.open_all().await?;
/// tokio::signal::ctrl_c().await?;
/// simulator.shutdown().await?;
/// ```
pub struct LoadSimulator {
    /// Direct handle on the order service, for inspection.
    pub order_client: OrderClient,
    restaurants: Vec<RestaurantClient>,
    restaurant_handles: Vec<JoinHandle<()>>,
    order_handle: JoinHandle<()>,
}

impl LoadSimulator {
    /// Starts the order service with in-memory storage and one actor per restaurant.
    /// Restaurants start closed.
    pub fn new(
        config: &SimulatorConfig,
        restaurants: Vec<(Restaurant, RestaurantProperties)>,
        rng: &mut StdRng,
    ) -> Self {
        Self::with_context(OrderServiceContext::in_memory(), config, restaurants, rng)
    }

    pub fn with_context(
        context: OrderServiceContext,
        config: &SimulatorConfig,
        restaurants: Vec<(Restaurant, RestaurantProperties)>,
        rng: &mut StdRng,
    ) -> Self {
        // 1. Order service
        let (order_actor, order_client) = crate::order_actor::new();
        let order_handle = tokio::spawn(order_actor.run(context));

        let service: Arc<dyn OrderService> = if config.retry.enabled {
            info!(max_attempts = config.retry.max_attempts, "Order service retries enabled");
            Arc::new(RetryingOrderService::new(order_client.clone(), config.retry.policy()))
        } else {
            Arc::new(order_client.clone())
        };

        // 2. Restaurants, each with its own RNG stream
        let mut clients = Vec::with_capacity(restaurants.len());
        let mut handles = Vec::with_capacity(restaurants.len());
        for (restaurant, properties) in restaurants {
            let kitchen = Kitchen::new(
                restaurant,
                properties,
                service.clone(),
                StdRng::seed_from_u64(rng.gen()),
            );
            let (actor, client) = RestaurantActor::new(kitchen);
            handles.push(tokio::spawn(actor.run()));
            clients.push(client);
        }
        info!(restaurants = clients.len(), "Load simulator started");

        Self {
            order_client,
            restaurants: clients,
            restaurant_handles: handles,
            order_handle,
        }
    }

    pub fn restaurants(&self) -> &[RestaurantClient] {
        &self.restaurants
    }

    /// Opens every restaurant. Returns how many were closed before.
    pub async fn open_all(&self) -> Result<usize, SimulationError> {
        let mut opened = 0;
        for restaurant in &self.restaurants {
            if restaurant.open().await? {
                opened += 1;
            }
        }
        Ok(opened)
    }

    /// Stops order generation everywhere. Scheduled work keeps draining.
    pub async fn close_all(&self) -> Result<(), SimulationError> {
        for restaurant in &self.restaurants {
            restaurant.close().await?;
        }
        Ok(())
    }

    pub async fn snapshots(&self) -> Result<Vec<RestaurantSnapshot>, SimulationError> {
        let mut snapshots = Vec::with_capacity(self.restaurants.len());
        for restaurant in &self.restaurants {
            snapshots.push(restaurant.snapshot().await?);
        }
        Ok(snapshots)
    }

    /// Stops the restaurants, then the order service.
    ///
    /// Restaurants go first so no tick is left calling a stopped order actor. The order
    /// actor exits once every `OrderClient` clone is gone, so callers must drop their own
    /// clones before awaiting this.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down load simulator...");

        drop(self.restaurants);
        for handle in self.restaurant_handles {
            if let Err(e) = handle.await {
                error!("Restaurant task failed: {:?}", e);
                return Err(format!("Restaurant task failed: {:?}", e));
            }
        }

        drop(self.order_client);
        if let Err(e) = self.order_handle.await {
            error!("Order actor task failed: {:?}", e);
            return Err(format!("Order actor task failed: {:?}", e));
        }

        info!("Load simulator shutdown complete.");
        Ok(())
    }
}
