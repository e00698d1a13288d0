use delivery_sim::lifecycle::{load_restaurants, read_locations, setup_tracing, LoadSimulator, SimulatorConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = SimulatorConfig::from_env().map_err(|e| e.to_string())?;
    info!(
        city = %config.city,
        limit = config.restaurant_limit,
        retry = config.retry.enabled,
        "Starting delivery simulator"
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let json = read_locations(&config).await.map_err(|e| e.to_string())?;
    let restaurants = load_restaurants(&json, &config, &mut rng).map_err(|e| e.to_string())?;
    if restaurants.is_empty() {
        error!(city = %config.city, "No restaurants to simulate");
        return Err(format!("no restaurants found in {}", config.city));
    }

    let simulator = LoadSimulator::new(&config, restaurants, &mut rng);
    let opened = simulator.open_all().await.map_err(|e| e.to_string())?;
    info!(opened, "Restaurants open, press Ctrl-C to stop");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for Ctrl-C");
    }

    simulator.close_all().await.map_err(|e| e.to_string())?;
    for snapshot in simulator.snapshots().await.map_err(|e| e.to_string())? {
        info!(
            store_id = snapshot.restaurant.store_id,
            name = %snapshot.restaurant.name,
            position = snapshot.stats.position,
            orders = snapshot.stats.orders_created,
            completed = snapshot.stats.workflows_completed,
            stalled = snapshot.stats.workflows_stalled,
            "Restaurant summary"
        );
    }

    simulator.shutdown().await?;
    info!("Simulator stopped");
    Ok(())
}
