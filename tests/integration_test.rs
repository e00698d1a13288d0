use delivery_sim::clients::{ActorClient, OrderClient, OrderService};
use delivery_sim::lifecycle::{load_restaurants, LoadSimulator, SimulatorConfig};
use delivery_sim::model::{OrderEventType, OrderId, OrderStatus, Restaurant, RestaurantProperties};
use delivery_sim::order_actor::{InMemoryJournal, InMemoryOrderRepository, OrderServiceContext};
use delivery_sim::simulation::{FrameReport, Kitchen};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

const LOCATIONS: &str = include_str!("../data/locations.json");

fn restaurant(store_id: u32) -> Restaurant {
    Restaurant {
        name: format!("Store {}", store_id),
        city: "San Francisco".into(),
        country: "US".into(),
        longitude: -122.41,
        latitude: 37.77,
        store_id,
    }
}

/// Drives a kitchen by hand until its scheduler is empty.
async fn drain(kitchen: &mut Kitchen) -> Vec<FrameReport> {
    let mut reports = Vec::new();
    while !kitchen.scheduler().is_empty() {
        kitchen.tick();
        reports.push(kitchen.process_frame().await);
    }
    reports
}

/// Kitchen against the real Order actor: every generated order ends up prepared and
/// audited, and no event fires before its due position.
#[tokio::test]
async fn test_kitchen_drives_real_order_service() {
    let journal = Arc::new(InMemoryJournal::new());
    let context = OrderServiceContext::new(Arc::new(InMemoryOrderRepository::new()), journal.clone());
    let (order_actor, order_client) = delivery_sim::order_actor::new();
    let actor_handle = tokio::spawn(order_actor.run(context));

    let mut kitchen = Kitchen::new(
        restaurant(12),
        RestaurantProperties::new(60_000, 1000, 15.0),
        Arc::new(order_client.clone()),
        StdRng::seed_from_u64(2024),
    );

    let mut workflows = Vec::new();
    for _ in 0..4 {
        workflows.push(kitchen.order_received().await.unwrap());
        kitchen.tick();
        kitchen.process_frame().await;
    }
    let order_ids: Vec<OrderId> = journal
        .events()
        .iter()
        .filter(|e| e.event_type == OrderEventType::OrderCreated)
        .map(|e| e.order_id)
        .collect();
    assert_eq!(order_ids.len(), 4);

    let reports = drain(&mut kitchen).await;
    for report in &reports {
        let dues: Vec<u64> = report.fired.iter().map(|(_, _, due)| *due).collect();
        assert!(dues.iter().all(|due| *due <= report.position));
        assert!(dues.windows(2).all(|w| w[0] <= w[1]));
        assert!(report.stalled.is_empty());
    }

    let stats = kitchen.stats();
    assert_eq!(stats.orders_created, 4);
    assert_eq!(stats.workflows_completed, 4);
    assert_eq!(stats.events_fired, 12);

    for id in order_ids {
        let order = order_client.get(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::OrderPrepared);
        assert_eq!(order.store_id, Some(12));
        assert_eq!(order.events.len(), 4);
    }

    drop(kitchen);
    drop(order_client);
    actor_handle.await.unwrap();
}

/// The same seed replays the same timeline against a fresh service.
#[tokio::test]
async fn test_seeded_kitchens_are_reproducible() {
    let mut timelines = Vec::new();
    for _ in 0..2 {
        let (order_actor, order_client) = delivery_sim::order_actor::new();
        let actor_handle = tokio::spawn(order_actor.run(OrderServiceContext::in_memory()));
        let mut kitchen = Kitchen::new(
            restaurant(3),
            RestaurantProperties::new(60_000, 1000, 15.0),
            Arc::new(order_client.clone()) as Arc<dyn OrderService>,
            StdRng::seed_from_u64(11),
        );

        kitchen.order_received().await.unwrap();
        kitchen.order_received().await.unwrap();
        let timeline: Vec<(u64, usize)> = drain(&mut kitchen)
            .await
            .into_iter()
            .map(|r| (r.position, r.fired.len()))
            .collect();
        timelines.push(timeline);

        drop(kitchen);
        drop(order_client);
        actor_handle.await.unwrap();
    }
    assert_eq!(timelines[0], timelines[1]);
}

/// Full system on a paused clock: bootstrap, open, run, close, drain, shut down.
#[tokio::test(start_paused = true)]
async fn test_load_simulator_end_to_end() {
    let config = SimulatorConfig {
        restaurant_limit: 3,
        new_order_min_ms: 200,
        new_order_jitter_ms: 100,
        preparation_time_ms: 10,
        preparation_rate: 5.0,
        ..SimulatorConfig::default()
    };
    let mut rng = StdRng::seed_from_u64(99);
    let restaurants = load_restaurants(LOCATIONS, &config, &mut rng).unwrap();
    let store_ids: Vec<u32> = restaurants.iter().map(|(r, _)| r.store_id).collect();
    assert_eq!(store_ids, vec![3, 7, 9]);

    let simulator = LoadSimulator::new(&config, restaurants, &mut rng);
    assert_eq!(simulator.open_all().await.unwrap(), 3);

    tokio::time::sleep(Duration::from_secs(3)).await;
    simulator.close_all().await.unwrap();
    tokio::time::sleep(Duration::from_secs(5)).await;

    let snapshots = simulator.snapshots().await.unwrap();
    assert_eq!(snapshots.len(), 3);
    for snapshot in &snapshots {
        assert!(!snapshot.open);
        assert!(snapshot.stats.orders_created > 0);
        assert_eq!(snapshot.stats.workflows_active, 0);
        assert_eq!(snapshot.stats.workflows_completed, snapshot.stats.orders_created);
    }

    let order_client: OrderClient = simulator.order_client.clone();
    let sample = order_client.create(OrderId(1)).await.unwrap();
    assert_eq!(sample.status, OrderStatus::Created);
    drop(order_client);

    simulator.shutdown().await.unwrap();
}
