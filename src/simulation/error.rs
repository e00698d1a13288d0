use thiserror::Error;

/// Errors from talking to a [`RestaurantActor`](crate::simulation::RestaurantActor).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Restaurant actor closed")]
    ActorClosed,

    #[error("Restaurant actor dropped the response channel")]
    ActorDropped,
}
