use async_trait::async_trait;
use delivery_sim::clients::{ActorClient, OrderService};
use delivery_sim::model::{OrderEvent, OrderEventType, OrderId, OrderStatus};
use delivery_sim::order_actor::{
    EventJournal, InMemoryJournal, InMemoryOrderRepository, OrderAction, OrderError, OrderRepository,
    OrderServiceContext,
};
use std::sync::Arc;

/// Journal that refuses one event type and records the rest.
struct SelectiveJournal {
    refuse: OrderEventType,
    inner: InMemoryJournal,
}

#[async_trait]
impl EventJournal for SelectiveJournal {
    async fn append(&self, event: &OrderEvent) -> Result<(), OrderError> {
        if event.event_type == self.refuse {
            return Err(OrderError::AuditAppend("journal offline".into()));
        }
        self.inner.append(event).await
    }
}

/// Real Order actor with an in-memory repository and journal.
#[tokio::test]
async fn test_order_walks_its_lifecycle() {
    let repository = Arc::new(InMemoryOrderRepository::new());
    let journal = Arc::new(InMemoryJournal::new());
    let context = OrderServiceContext::new(repository.clone(), journal.clone());

    let (order_actor, order_client) = delivery_sim::order_actor::new();
    let actor_handle = tokio::spawn(order_actor.run(context));

    let order = order_client.create(OrderId(4242)).await.unwrap();
    assert_eq!(order.id, OrderId(4242));
    assert_eq!(order.status, OrderStatus::Created);

    let order = order_client.assign_order(order.id, 12).await.unwrap();
    assert_eq!(order.status, OrderStatus::OrderAssigned);
    assert_eq!(order.store_id, Some(12));

    order_client.prepare_order(order.id).await.unwrap();
    order_client.order_ready(order.id).await.unwrap();
    order_client.start_delivery(order.id).await.unwrap();
    let order = order_client.deliver(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::OrderDelivered);

    // The actor's copy, the repository snapshot and the journal agree
    let held = order_client.get(order.id).await.unwrap().unwrap();
    assert_eq!(held, order);
    let stored = repository.find(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::OrderDelivered);
    assert_eq!(stored.events.len(), held.events.len());
    assert_eq!(stored, held);

    let recorded: Vec<OrderEventType> = journal.events().iter().map(|e| e.event_type).collect();
    assert_eq!(
        recorded,
        vec![
            OrderEventType::OrderCreated,
            OrderEventType::OrderAssigned,
            OrderEventType::OrderPreparing,
            OrderEventType::OrderPrepared,
            OrderEventType::OrderDelivering,
            OrderEventType::OrderDelivered,
        ]
    );
    assert_eq!(held.events.len(), 6);

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_out_of_order_transition_is_rejected_without_mutation() {
    let journal = Arc::new(InMemoryJournal::new());
    let context = OrderServiceContext::new(Arc::new(InMemoryOrderRepository::new()), journal.clone());
    let (order_actor, order_client) = delivery_sim::order_actor::new();
    let actor_handle = tokio::spawn(order_actor.run(context));

    let order = order_client.create(OrderId(8)).await.unwrap();
    let err = order_client.order_ready(order.id).await.unwrap_err();

    match err {
        OrderError::BadRequest(message) => {
            assert_eq!(message, "Order must be in a ORDER_PREPARING state. {state=CREATED}")
        }
        other => panic!("expected BadRequest, got {:?}", other),
    }
    let held = order_client.get(order.id).await.unwrap().unwrap();
    assert_eq!(held.status, OrderStatus::Created);
    assert_eq!(journal.events().len(), 1);

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_failed_audit_append_is_compensated() {
    let repository = Arc::new(InMemoryOrderRepository::new());
    let journal = Arc::new(SelectiveJournal {
        refuse: OrderEventType::OrderDelivered,
        inner: InMemoryJournal::new(),
    });
    let context = OrderServiceContext::new(repository.clone(), journal.clone());
    let (order_actor, order_client) = delivery_sim::order_actor::new();
    let actor_handle = tokio::spawn(order_actor.run(context));

    let order = order_client.create(OrderId(77)).await.unwrap();
    for action in [
        OrderAction::Assign { store_id: 3 },
        OrderAction::Prepare,
        OrderAction::Ready,
        OrderAction::Dispatch,
    ] {
        let outcome = order_client.transition(order.id, action).await.unwrap();
        assert!(!outcome.is_compensated());
    }

    // Through the service boundary compensation is not an error
    let order = order_client.deliver(order.id).await.unwrap();
    assert_eq!(order.status, OrderStatus::OrderDelivering);

    let outcome = order_client
        .transition(order.id, OrderAction::Deliver)
        .await
        .unwrap();
    assert!(outcome.is_compensated());
    let stored = repository.find(order.id).await.unwrap().unwrap();
    assert_eq!(stored.status, OrderStatus::OrderDelivering);
    assert!(journal
        .inner
        .events()
        .iter()
        .all(|e| e.event_type != OrderEventType::OrderDelivered));

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_taken_candidate_id_gets_a_fresh_one() {
    let (order_actor, order_client) = delivery_sim::order_actor::new();
    let actor_handle = tokio::spawn(order_actor.run(OrderServiceContext::in_memory()));

    let first = order_client.create(OrderId(5)).await.unwrap();
    let second = order_client.create(OrderId(5)).await.unwrap();

    assert_eq!(first.id, OrderId(5));
    assert_ne!(second.id, OrderId(5));

    let err = order_client.prepare_order(OrderId(999)).await.unwrap_err();
    assert!(matches!(err, OrderError::NotFound(_)));

    drop(order_client);
    actor_handle.await.unwrap();
}

#[tokio::test]
async fn test_refused_creation_leaves_nothing_stored() {
    let repository = Arc::new(InMemoryOrderRepository::new());
    let journal = Arc::new(SelectiveJournal {
        refuse: OrderEventType::OrderCreated,
        inner: InMemoryJournal::new(),
    });
    let context = OrderServiceContext::new(repository.clone(), journal.clone());
    let (order_actor, order_client) = delivery_sim::order_actor::new();
    let actor_handle = tokio::spawn(order_actor.run(context));

    let err = order_client.create(OrderId(31)).await.unwrap_err();

    assert!(matches!(err, OrderError::AuditAppend(_)));
    assert!(repository.find(OrderId(31)).await.unwrap().is_none());
    assert!(order_client.get(OrderId(31)).await.unwrap().is_none());

    drop(order_client);
    actor_handle.await.unwrap();
}
