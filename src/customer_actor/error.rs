use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::InvalidInput;

/// Errors that can occur during customer registry operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CustomerError {
    #[error("Customer validation error: {0}")]
    ValidationError(String),
    #[error("Customer not found: {0}")]
    NotFound(String),
    #[error("Customer backend error: {0}")]
    BackendError(String),
}

impl From<FrameworkError> for CustomerError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => CustomerError::NotFound(id),
            FrameworkError::Validation(msg) | FrameworkError::Conflict(msg) => CustomerError::ValidationError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => CustomerError::BackendError(e.to_string()),
        }
    }
}

impl From<InvalidInput> for CustomerError {
    fn from(e: InvalidInput) -> Self {
        CustomerError::ValidationError(e.0)
    }
}
