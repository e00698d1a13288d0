//! Error types for the Order actor.

use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The requested order was not found.
    #[error("Order not found: {0}")]
    NotFound(String),

    /// The order is not in the state the requested transition starts from.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The audit event for a transition could not be appended.
    #[error("Could not append order event: {0}")]
    AuditAppend(String),

    /// Saving an order snapshot failed.
    #[error("Order persistence error: {0}")]
    Persistence(String),

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    /// Whether retrying the same call may succeed.
    ///
    /// Only transport-level failures qualify; a rejected transition or a missing order
    /// will fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, OrderError::ActorCommunicationError(_))
    }
}

impl From<String> for OrderError {
    fn from(msg: String) -> Self {
        OrderError::ActorCommunicationError(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_communication_errors_are_transient() {
        assert!(OrderError::ActorCommunicationError("closed".into()).is_transient());
        assert!(!OrderError::BadRequest("wrong state".into()).is_transient());
        assert!(!OrderError::NotFound("7".into()).is_transient());
        assert!(!OrderError::AuditAppend("disk full".into()).is_transient());
    }
}
