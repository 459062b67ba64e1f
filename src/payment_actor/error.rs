use crate::actor_framework::FrameworkError;
use crate::domain::PaymentStatus;
use crate::error::ErrorKind;
use crate::order_actor::OrderError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the payment ledger.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PaymentError {
    #[error("Payment not found: {0}")]
    NotFound(String),
    #[error("Order not found: {0}")]
    OrderNotFound(String),
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error("Order has already been paid")]
    AlreadyPaid,
    #[error("Payment has already been fully refunded")]
    AlreadyRefunded,
    #[error("Payment is not completed (status {0})")]
    NotCompleted(PaymentStatus),
    #[error("Refund of {requested} exceeds the refundable balance of {remaining}")]
    RefundExceedsAmount { requested: Decimal, remaining: Decimal },
    #[error("Cannot move payment from {from} to {to}")]
    CannotForceStatus { from: PaymentStatus, to: PaymentStatus },
    #[error("Payment validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl PaymentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) | Self::OrderNotFound(_) => ErrorKind::NotFound,
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::AlreadyPaid | Self::AlreadyRefunded => ErrorKind::Conflict,
            Self::NotCompleted(_) | Self::CannotForceStatus { .. } => ErrorKind::StateError,
            Self::RefundExceedsAmount { .. } => ErrorKind::LimitExceeded,
            Self::ValidationError(_) => ErrorKind::ValidationError,
            Self::Order(inner) => inner.kind(),
            Self::ActorCommunicationError(_) => ErrorKind::Internal,
        }
    }
}

impl From<FrameworkError> for PaymentError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::NotFound(id) => Self::NotFound(id),
            other => Self::ActorCommunicationError(other.to_string()),
        }
    }
}
