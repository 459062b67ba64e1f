use crate::actor_framework::FrameworkError;
use crate::error::ErrorKind;
use thiserror::Error;

/// Errors that can occur during catalog and stock operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BookError {
    #[error("Book not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for {title}: requested {requested}, available {available}")]
    InsufficientStock { title: String, requested: u32, available: u32 },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Book already reviewed by user {0}")]
    DuplicateReview(String),
    #[error("Reviewer not found: {0}")]
    ReviewerNotFound(String),
    #[error("Book validation error: {0}")]
    ValidationError(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl BookError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::ReviewerNotFound(_) => ErrorKind::NotFound,
            Self::InsufficientStock { .. } | Self::DuplicateReview(_) => ErrorKind::Conflict,
            Self::InvalidQuantity(_) | Self::ValidationError(_) => ErrorKind::ValidationError,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<FrameworkError> for BookError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}
