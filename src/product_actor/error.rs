use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::InvalidInput;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Product backend error: {0}")]
    BackendError(String),
}

impl From<FrameworkError> for ProductError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ProductError::NotFound(id),
            FrameworkError::Validation(msg) | FrameworkError::Conflict(msg) => ProductError::ValidationError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => ProductError::BackendError(e.to_string()),
        }
    }
}

impl From<InvalidInput> for ProductError {
    fn from(e: InvalidInput) -> Self {
        ProductError::ValidationError(e.0)
    }
}
