//! # Resource Actor
//!
//! One Tokio task owns a map of entities and answers three kinds of request over an
//! `mpsc` channel: create, get and run an entity-specific action. Each request carries a
//! `oneshot` sender for its answer.
//!
//! - [`ActorEntity`] describes what is stored and how it reacts to actions.
//! - [`ResourceActor`] is the loop.
//! - [`ResourceClient`] is the cloneable sending half.
//! - [`FrameworkError`] covers the plumbing failures plus boxed entity errors.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// A type that can be stored in and mutated by a [`ResourceActor`].
///
/// The loop is generic; an entity only has to say how it is built from a create payload
/// and what each of its actions does. Collaborators the hooks need (repositories, other
/// clients) arrive as `Context`, handed to [`ResourceActor::run`] rather than to `new`,
/// so actors can be wired to each other after they have all been constructed.
#[async_trait]
pub trait ActorEntity: Clone + Send + Sync + 'static {
    /// Key in the actor's map. `From<u64>` lets the actor mint ids itself.
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug + From<u64>;

    /// Payload of a create request.
    type Create: Send + Sync + Debug;

    /// Entity-specific operations.
    type Action: Send + Sync + Debug;

    /// What a successful action returns to the caller.
    type ActionResult: Send + Sync + Debug;

    /// Dependencies injected through [`ResourceActor::run`].
    type Context: Send + Sync;

    /// Single error type for every hook of the entity.
    type Error: std::error::Error + Send + Sync + 'static;

    /// An identifier the caller asked for, if any.
    ///
    /// The actor honours it when no entity already holds that id and falls back to
    /// its own sequence otherwise.
    fn requested_id(_params: &Self::Create) -> Option<Self::Id> {
        None
    }

    /// Builds the entity. Runs before [`on_create`](Self::on_create).
    fn from_create_params(id: Self::Id, params: Self::Create) -> Result<Self, Self::Error>;

    /// Runs once before the entity is stored. An error here discards the entity.
    async fn on_create(&mut self, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs one action.
    ///
    /// Whatever state `self` holds when this returns is what the actor keeps, on success
    /// and on failure alike.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Actor channel closed")]
    ActorClosed,
    #[error("Actor stopped before responding")]
    ActorDropped,
    #[error("No entity with id {0}")]
    NotFound(String),
    /// An [`ActorEntity::Error`], boxed to cross the channel. Downcast to recover it.
    #[error("{0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

/// Sending half of a request's answer.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Requests understood by every [`ResourceActor`].
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

/// Owns every entity of one type.
///
/// Requests are handled one at a time, to completion, in arrival order. Two actions on
/// the same id therefore never interleave and the map needs no lock.
pub struct ResourceActor<T: ActorEntity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    entities: HashMap<T::Id, T>,
    next_id: u64,
    entity_type: &'static str,
}

impl<T: ActorEntity> ResourceActor<T> {
    /// Returns the actor and a client connected to it. `buffer_size` bounds the request
    /// channel; senders wait while it is full.
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let entity_type = std::any::type_name::<T>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown");
        let actor = Self {
            receiver,
            entities: HashMap::new(),
            next_id: 1,
            entity_type,
        };
        (actor, ResourceClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self, context: T::Context) {
        info!(entity_type = self.entity_type, "Actor started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.create(params, &context).await);
                }
                ResourceRequest::Get { id, respond_to } => {
                    let entity = self.entities.get(&id).cloned();
                    debug!(entity_type = self.entity_type, %id, found = entity.is_some(), "Get");
                    let _ = respond_to.send(Ok(entity));
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    let _ = respond_to.send(self.act(id, action, &context).await);
                }
            }
        }

        info!(entity_type = self.entity_type, size = self.entities.len(), "Shutdown");
    }

    fn allocate_id(&mut self, params: &T::Create) -> T::Id {
        if let Some(id) = T::requested_id(params) {
            if !self.entities.contains_key(&id) {
                return id;
            }
        }
        loop {
            let id = T::Id::from(self.next_id);
            self.next_id += 1;
            if !self.entities.contains_key(&id) {
                return id;
            }
        }
    }

    async fn create(&mut self, params: T::Create, context: &T::Context) -> Result<T::Id, FrameworkError> {
        let entity_type = self.entity_type;
        debug!(entity_type, ?params, "Create");
        let id = self.allocate_id(&params);

        let mut entity = T::from_create_params(id.clone(), params).map_err(|e| {
            warn!(entity_type, error = %e, "Create rejected");
            FrameworkError::EntityError(Box::new(e))
        })?;
        entity.on_create(context).await.map_err(|e| {
            warn!(entity_type, %id, error = %e, "on_create failed");
            FrameworkError::EntityError(Box::new(e))
        })?;

        self.entities.insert(id.clone(), entity);
        info!(entity_type, %id, size = self.entities.len(), "Created");
        Ok(id)
    }

    async fn act(
        &mut self,
        id: T::Id,
        action: T::Action,
        context: &T::Context,
    ) -> Result<T::ActionResult, FrameworkError> {
        let entity_type = self.entity_type;
        debug!(entity_type, %id, ?action, "Action");
        let Some(entity) = self.entities.get_mut(&id) else {
            warn!(entity_type, %id, "Not found");
            return Err(FrameworkError::NotFound(id.to_string()));
        };

        match entity.handle_action(action, context).await {
            Ok(result) => {
                info!(entity_type, %id, "Action ok");
                Ok(result)
            }
            Err(e) => {
                warn!(entity_type, %id, error = %e, "Action failed");
                Err(FrameworkError::EntityError(Box::new(e)))
            }
        }
    }
}

/// Cloneable handle on a [`ResourceActor`]. The actor stops once every clone is gone.
pub struct ResourceClient<T: ActorEntity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self::new(self.sender.clone())
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    /// Sends the request built around a fresh response channel and waits for the answer.
    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::Create) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to })
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to })
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action {
            id,
            action,
            respond_to,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: u64,
        punches: u32,
    }

    #[derive(Debug)]
    struct TicketCreate {
        wanted: Option<u64>,
        void: bool,
    }

    #[derive(Debug)]
    enum TicketAction {
        Punch,
        Refuse,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("ticket refused")]
    struct TicketError;

    #[async_trait]
    impl ActorEntity for Ticket {
        type Id = u64;
        type Create = TicketCreate;
        type Action = TicketAction;
        type ActionResult = u32;
        type Context = ();
        type Error = TicketError;

        fn requested_id(params: &TicketCreate) -> Option<u64> {
            params.wanted
        }

        fn from_create_params(id: u64, params: TicketCreate) -> Result<Self, TicketError> {
            if params.void {
                return Err(TicketError);
            }
            Ok(Self { id, punches: 0 })
        }

        async fn handle_action(&mut self, action: TicketAction, _ctx: &()) -> Result<u32, TicketError> {
            match action {
                TicketAction::Punch => {
                    self.punches += 1;
                    Ok(self.punches)
                }
                TicketAction::Refuse => Err(TicketError),
            }
        }
    }

    fn ticket(wanted: Option<u64>) -> TicketCreate {
        TicketCreate { wanted, void: false }
    }

    #[tokio::test]
    async fn test_actions_mutate_the_stored_entity() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        tokio::spawn(actor.run(()));

        let id = client.create(ticket(None)).await.unwrap();
        assert_eq!(id, 1);

        assert_eq!(client.perform_action(id, TicketAction::Punch).await.unwrap(), 1);
        assert_eq!(client.perform_action(id, TicketAction::Punch).await.unwrap(), 2);

        let err = client.perform_action(id, TicketAction::Refuse).await.unwrap_err();
        assert!(matches!(err, FrameworkError::EntityError(_)));

        let stored = client.get(id).await.unwrap().unwrap();
        assert_eq!(stored.punches, 2);
    }

    #[tokio::test]
    async fn test_requested_id_is_honoured_unless_taken() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        tokio::spawn(actor.run(()));

        let first = client.create(ticket(Some(42))).await.unwrap();
        let second = client.create(ticket(Some(42))).await.unwrap();
        assert_eq!(first, 42);
        assert_eq!(second, 1);
    }

    #[tokio::test]
    async fn test_rejected_create_stores_nothing() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        tokio::spawn(actor.run(()));

        let err = client
            .create(TicketCreate {
                wanted: Some(3),
                void: true,
            })
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "ticket refused");
        assert!(client.get(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_action_on_missing_entity_is_not_found() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        tokio::spawn(actor.run(()));

        let err = client.perform_action(7, TicketAction::Punch).await.unwrap_err();
        assert!(matches!(err, FrameworkError::NotFound(id) if id == "7"));
    }

    #[tokio::test]
    async fn test_client_fails_once_actor_is_gone() {
        let (actor, client) = ResourceActor::<Ticket>::new(10);
        drop(actor);

        let err = client.get(1).await.unwrap_err();
        assert!(matches!(err, FrameworkError::ActorClosed));
    }
}
