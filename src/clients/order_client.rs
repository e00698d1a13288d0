//! # Order Client
//!
//! High-level API over the Order actor. It wraps a `ResourceClient<Order>` and implements
//! [`OrderService`] so the simulation can drive the in-process service.
use crate::clients::{ActorClient, OrderService};
use crate::framework::{FrameworkError, ResourceClient};
use crate::model::{Order, OrderCreate, OrderId};
use crate::order_actor::{OrderAction, OrderError, TransitionOutcome};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Client for interacting with the Order actor.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Runs `action` against the order and reports whether it was compensated.
    #[instrument(skip(self))]
    pub async fn transition(
        &self,
        id: OrderId,
        action: OrderAction,
    ) -> Result<TransitionOutcome, OrderError> {
        debug!("Sending request");
        let outcome = self
            .inner
            .perform_action(id, action)
            .await
            .map_err(Self::map_error)?;
        if let TransitionOutcome::Compensated { reason, .. } = &outcome {
            warn!(order_id = %id, error = %reason, "Transition compensated");
        }
        Ok(outcome)
    }
}

#[async_trait]
impl ActorClient<Order> for OrderClient {
    type Error = OrderError;

    fn inner(&self) -> &ResourceClient<Order> {
        &self.inner
    }

    /// Entity errors come back boxed; unwrap them so a rejected transition stays a
    /// `BadRequest` on this side of the channel.
    fn map_error(e: FrameworkError) -> Self::Error {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<OrderError>() {
                Ok(order_error) => *order_error,
                Err(other) => OrderError::ActorCommunicationError(other.to_string()),
            },
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

#[async_trait]
impl OrderService for OrderClient {
    #[instrument(skip(self))]
    async fn create(&self, candidate_id: OrderId) -> Result<Order, OrderError> {
        debug!("Sending request");
        let params = OrderCreate {
            candidate_id: Some(candidate_id),
        };
        let id = self.inner.create(params).await.map_err(Self::map_error)?;
        self.get(id)
            .await?
            .ok_or_else(|| OrderError::NotFound(id.to_string()))
    }

    async fn assign_order(&self, order_id: OrderId, store_id: u32) -> Result<Order, OrderError> {
        self.transition(order_id, OrderAction::Assign { store_id })
            .await
            .map(TransitionOutcome::into_order)
    }

    async fn prepare_order(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderAction::Prepare)
            .await
            .map(TransitionOutcome::into_order)
    }

    async fn order_ready(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderAction::Ready)
            .await
            .map(TransitionOutcome::into_order)
    }

    async fn start_delivery(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderAction::Dispatch)
            .await
            .map(TransitionOutcome::into_order)
    }

    async fn deliver(&self, order_id: OrderId) -> Result<Order, OrderError> {
        self.transition(order_id, OrderAction::Deliver)
            .await
            .map(TransitionOutcome::into_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockClient;
    use crate::model::OrderStatus;

    #[tokio::test]
    async fn test_create_fetches_the_created_order() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_create().return_ok(OrderId(5));
        mock.expect_get(OrderId(5))
            .return_ok(Some(Order::new(OrderId(5))));

        let client = OrderClient::new(mock.client());
        let order = client.create(OrderId(5)).await.unwrap();

        assert_eq!(order.id, OrderId(5));
        assert_eq!(order.status, OrderStatus::Created);
        mock.verify();
    }

    #[tokio::test]
    async fn test_entity_error_keeps_its_type() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_action(OrderId(5))
            .return_err(FrameworkError::EntityError(Box::new(OrderError::BadRequest(
                "Order must be in a CREATED state.".into(),
            ))));

        let client = OrderClient::new(mock.client());
        let err = client.assign_order(OrderId(5), 3).await.unwrap_err();

        assert!(matches!(err, OrderError::BadRequest(_)));
        assert!(!err.is_transient());
        mock.verify();
    }

    #[tokio::test]
    async fn test_compensated_transition_returns_original_order() {
        let mut delivering = Order::new(OrderId(8));
        delivering.status = OrderStatus::OrderDelivering;

        let mut mock = MockClient::<Order>::new();
        mock.expect_action(OrderId(8))
            .return_ok(TransitionOutcome::Compensated {
                order: delivering.clone(),
                reason: OrderError::AuditAppend("journal offline".into()),
            });

        let client = OrderClient::new(mock.client());
        let order = client.deliver(OrderId(8)).await.unwrap();

        assert_eq!(order, delivering);
        mock.verify();
    }

    #[tokio::test]
    async fn test_missing_order_maps_to_not_found() {
        let mut mock = MockClient::<Order>::new();
        mock.expect_action(OrderId(2))
            .return_err(FrameworkError::NotFound("2".into()));

        let client = OrderClient::new(mock.client());
        let err = client.prepare_order(OrderId(2)).await.unwrap_err();

        assert_eq!(err, OrderError::NotFound("2".into()));
        mock.verify();
    }
}
