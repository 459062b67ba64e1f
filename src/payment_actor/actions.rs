use crate::domain::{AdminPaymentUpdate, Payment};
use rust_decimal::Decimal;

/// Custom actions for Payment entities.
#[derive(Debug, Clone)]
pub enum PaymentAction {
    /// Refund `amount`, or the whole remaining balance when `None`.
    Refund {
        amount: Option<Decimal>,
        reason: Option<String>,
        default_reason: String,
    },
    /// Back-office adjustment: an explicit refund amount or a forced status.
    AdminAdjust {
        update: AdminPaymentUpdate,
        default_reason: String,
    },
    /// Compensation when the payment could not be attached to its order.
    MarkFailed,
}

/// Outcome of a refund-bearing action.
#[derive(Debug, Clone)]
pub struct RefundOutcome {
    pub payment: Payment,
    /// What this call refunded; zero when nothing moved.
    pub refunded: Decimal,
    /// True when this call took the payment to `refunded`.
    pub became_refunded: bool,
}

/// Results from PaymentActions - variants match 1:1 with PaymentAction
#[derive(Debug, Clone)]
pub enum PaymentActionResult {
    Refund(RefundOutcome),
    AdminAdjust(RefundOutcome),
    MarkFailed(Payment),
}
