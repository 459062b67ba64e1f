use crate::actor_framework::FrameworkError;
use crate::book_actor::BookError;
use crate::domain::OrderStatus;
use crate::error::ErrorKind;
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Order has no items")]
    EmptyOrder,
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Book not found: {0}")]
    BookNotFound(String),
    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),
    #[error("Order is already cancelled")]
    AlreadyCancelled,
    #[error("Order can no longer be cancelled (status {0})")]
    CannotCancel(OrderStatus),
    #[error("Order can no longer be modified (status {0})")]
    CannotModify(OrderStatus),
    #[error("Order has already been paid")]
    AlreadyPaid,
    #[error("Order cannot be paid (status {0})")]
    CannotPay(OrderStatus),
    #[error("Cancelled order has returned its stock and cannot be reopened")]
    CannotReopen,
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::BookNotFound(_) => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::EmptyOrder | Self::ValidationError(_) => ErrorKind::ValidationError,
            Self::InsufficientStock(_) | Self::AlreadyCancelled | Self::AlreadyPaid => {
                ErrorKind::Conflict
            }
            Self::CannotCancel(_) | Self::CannotModify(_) | Self::CannotPay(_) | Self::CannotReopen => {
                ErrorKind::StateError
            }
            Self::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<FrameworkError> for OrderError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}

impl From<BookError> for OrderError {
    fn from(e: BookError) -> Self {
        match e {
            BookError::NotFound(id) => Self::BookNotFound(id),
            e @ BookError::InsufficientStock { .. } => Self::InsufficientStock(e.to_string()),
            BookError::InvalidQuantity(qty) => {
                Self::ValidationError(format!("quantity must be at least 1, got {qty}"))
            }
            BookError::ValidationError(msg) => Self::ValidationError(msg),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}
