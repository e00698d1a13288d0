//! [`ActorEntity`] implementation for the Order domain type.
//!
//! Creation stores the first snapshot and the `ORDER_CREATED` event; every lifecycle
//! action delegates to [`OrderAction::apply`] and keeps whatever order comes back,
//! including a compensated one.

use crate::framework::ActorEntity;
use crate::model::{Order, OrderCreate, OrderEvent, OrderEventType, OrderId};
use crate::order_actor::{OrderAction, OrderError, OrderServiceContext, TransitionOutcome};
use async_trait::async_trait;

#[async_trait]
impl ActorEntity for Order {
    type Id = OrderId;
    type Create = OrderCreate;
    type Action = OrderAction;
    type ActionResult = TransitionOutcome;
    type Context = OrderServiceContext;
    type Error = OrderError;

    fn requested_id(params: &OrderCreate) -> Option<OrderId> {
        params.candidate_id
    }

    fn from_create_params(id: OrderId, _params: OrderCreate) -> Result<Self, OrderError> {
        Ok(Self::new(id))
    }

    async fn on_create(&mut self, ctx: &OrderServiceContext) -> Result<(), OrderError> {
        // Journal first: an order the journal refused is never stored.
        let event = OrderEvent::new(OrderEventType::OrderCreated, self);
        ctx.journal.append(&event).await?;
        self.events.push(event);
        *self = ctx.repository.save(self.clone()).await?;
        Ok(())
    }

    async fn handle_action(
        &mut self,
        action: OrderAction,
        ctx: &OrderServiceContext,
    ) -> Result<TransitionOutcome, OrderError> {
        let outcome = action
            .apply(self.clone(), ctx.repository.as_ref(), ctx.journal.as_ref())
            .await?;
        *self = outcome.order().clone();
        Ok(outcome)
    }
}
