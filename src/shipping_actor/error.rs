use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::InvalidInput;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShippingError {
    #[error("Shipping rate validation error: {0}")]
    ValidationError(String),
    #[error("Region not found: {0}")]
    NotFound(String),
    #[error("Shipping backend error: {0}")]
    BackendError(String),
}

impl From<FrameworkError> for ShippingError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => ShippingError::NotFound(id),
            FrameworkError::Validation(msg) | FrameworkError::Conflict(msg) => ShippingError::ValidationError(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => ShippingError::BackendError(e.to_string()),
        }
    }
}

impl From<InvalidInput> for ShippingError {
    fn from(e: InvalidInput) -> Self {
        ShippingError::ValidationError(e.0)
    }
}
