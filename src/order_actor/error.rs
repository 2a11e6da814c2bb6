use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::customer_actor::CustomerError;
use crate::domain::InvalidInput;
use crate::product_actor::ProductError;
use crate::shipping_actor::ShippingError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
    #[error("Order backend error: {0}")]
    BackendError(String),
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::Validation(msg) => OrderError::ValidationError(msg),
            FrameworkError::Conflict(msg) => OrderError::InvalidTransition(msg),
            FrameworkError::ActorClosed | FrameworkError::ActorDropped => OrderError::BackendError(e.to_string()),
        }
    }
}

impl From<InvalidInput> for OrderError {
    fn from(e: InvalidInput) -> Self {
        OrderError::ValidationError(e.0)
    }
}

impl From<CustomerError> for OrderError {
    fn from(e: CustomerError) -> Self {
        match e {
            CustomerError::ValidationError(msg) => OrderError::ValidationError(msg),
            CustomerError::NotFound(id) => OrderError::NotFound(id),
            CustomerError::BackendError(msg) => OrderError::BackendError(msg),
        }
    }
}

impl From<ProductError> for OrderError {
    fn from(e: ProductError) -> Self {
        match e {
            ProductError::ValidationError(msg) => OrderError::ValidationError(msg),
            ProductError::NotFound(id) => OrderError::NotFound(id),
            ProductError::BackendError(msg) => OrderError::BackendError(msg),
        }
    }
}

impl From<ShippingError> for OrderError {
    fn from(e: ShippingError) -> Self {
        match e {
            ShippingError::ValidationError(msg) => OrderError::ValidationError(msg),
            ShippingError::NotFound(name) => OrderError::NotFound(name),
            ShippingError::BackendError(msg) => OrderError::BackendError(msg),
        }
    }
}
