use crate::payment_actor::PaymentError;
use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Card,
    Paypal,
    BankTransfer,
}

impl FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "paypal" => Ok(Self::Paypal),
            "bank_transfer" => Ok(Self::BankTransfer),
            other => Err(format!("Invalid payment method: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
    PartiallyRefunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
            Self::PartiallyRefunded => "partially_refunded",
        };
        f.write_str(name)
    }
}

/// Represents a payment attempt against an order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub user_id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub status: PaymentStatus,
    pub transaction_id: String,
    pub card_last4: String,
    pub refunded_amount: Decimal,
    pub refund_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for recording a payment.
#[derive(Debug, Clone)]
pub struct PaymentCreate {
    pub user_id: String,
    pub order_id: String,
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub card_last4: String,
}

/// What the payer sends at the payment step.
#[derive(Debug, Clone, Default)]
pub struct PaymentRequest {
    pub order_id: String,
    pub payment_method: Option<PaymentMethod>,
    pub card_last4: Option<String>,
}

/// Back-office adjustment of a payment.
#[derive(Debug, Clone, Default)]
pub struct AdminPaymentUpdate {
    pub status: Option<PaymentStatus>,
    pub refund_amount: Option<Decimal>,
    pub refund_reason: Option<String>,
}

impl Payment {
    /// Amount still refundable.
    pub fn remaining(&self) -> Decimal {
        self.amount - self.refunded_amount
    }

    /// The refund accounting rule. Every refund path goes through here so
    /// `refunded_amount <= amount` and the status/amount correspondence hold.
    ///
    /// Returns the amount refunded by this call.
    pub fn apply_refund(
        &mut self,
        amount: Option<Decimal>,
        reason: Option<String>,
        default_reason: &str,
    ) -> Result<Decimal, PaymentError> {
        match self.status {
            PaymentStatus::Refunded => return Err(PaymentError::AlreadyRefunded),
            PaymentStatus::Completed | PaymentStatus::PartiallyRefunded => {}
            other => return Err(PaymentError::NotCompleted(other)),
        }

        let requested = amount.unwrap_or_else(|| self.remaining());
        if requested <= Decimal::ZERO {
            return Err(PaymentError::ValidationError(format!(
                "Refund amount must be positive, got {requested}"
            )));
        }

        let new_total = self.refunded_amount + requested;
        if new_total > self.amount {
            return Err(PaymentError::RefundExceedsAmount {
                requested,
                remaining: self.remaining(),
            });
        }

        self.refunded_amount = new_total;
        self.refund_reason = Some(reason.unwrap_or_else(|| default_reason.to_string()));
        self.status = if new_total == self.amount {
            PaymentStatus::Refunded
        } else {
            PaymentStatus::PartiallyRefunded
        };
        self.updated_at = Utc::now();
        Ok(requested)
    }

    /// Admin status override. `Refunded` refunds the remaining balance through
    /// [`Payment::apply_refund`]. The other settable statuses are only allowed
    /// while nothing has been refunded, and never change whether the payment
    /// settles its order: a completed payment cannot be forced to
    /// `pending`/`failed`, nor a failed one to `completed`.
    pub fn force_status(
        &mut self,
        status: PaymentStatus,
        reason: Option<String>,
        default_reason: &str,
    ) -> Result<(), PaymentError> {
        match status {
            PaymentStatus::Refunded => {
                self.apply_refund(None, reason, default_reason)?;
            }
            PaymentStatus::PartiallyRefunded => {
                return Err(PaymentError::ValidationError(
                    "Partial refunds need an explicit amount".to_string(),
                ));
            }
            PaymentStatus::Pending | PaymentStatus::Completed | PaymentStatus::Failed => {
                let settles = status == PaymentStatus::Completed;
                if self.refunded_amount > Decimal::ZERO || settles != self.settles_order() {
                    return Err(PaymentError::CannotForceStatus { from: self.status, to: status });
                }
                self.status = status;
                self.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    /// A payment that still counts against its order.
    pub fn settles_order(&self) -> bool {
        !matches!(self.status, PaymentStatus::Pending | PaymentStatus::Failed)
    }

    pub fn is_refunded(&self) -> bool {
        self.status == PaymentStatus::Refunded
    }
}

/// `TXN_<unix-millis>_<7 upper-case alphanumerics>`
pub fn generate_transaction_id(now: DateTime<Utc>, rng: &mut impl Rng) -> String {
    let suffix: String = rng
        .sample_iter(Alphanumeric)
        .take(7)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect();
    format!("TXN_{}_{}", now.timestamp_millis(), suffix)
}

/// `cardLast4` is either absent or exactly four digits.
pub fn validate_card_last4(card_last4: Option<&str>) -> Result<String, PaymentError> {
    match card_last4 {
        None => Ok("****".to_string()),
        Some(digits) if digits.len() == 4 && digits.chars().all(|c| c.is_ascii_digit()) => {
            Ok(digits.to_string())
        }
        Some(other) => Err(PaymentError::ValidationError(format!(
            "cardLast4 must be four digits, got {other:?}"
        ))),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub total_payments: usize,
    pub total_spent: Decimal,
    pub completed_payments: usize,
    pub refunded_payments: usize,
    pub pending_payments: usize,
    pub total_refunded: Decimal,
}

impl PaymentSummary {
    pub fn from_payments(payments: &[Payment]) -> Self {
        let count = |status| payments.iter().filter(|p| p.status == status).count();
        Self {
            total_payments: payments.len(),
            total_spent: payments
                .iter()
                .filter(|p| {
                    matches!(p.status, PaymentStatus::Completed | PaymentStatus::PartiallyRefunded)
                })
                .map(Payment::remaining)
                .sum(),
            completed_payments: count(PaymentStatus::Completed),
            refunded_payments: count(PaymentStatus::Refunded),
            pending_payments: count(PaymentStatus::Pending),
            total_refunded: payments.iter().map(|p| p.refunded_amount).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    const REASON: &str = "Customer request";

    fn payment(amount: Decimal) -> Payment {
        let now = Utc::now();
        Payment {
            id: "payment_1".into(),
            user_id: "user_1".into(),
            order_id: "order_1".into(),
            amount,
            payment_method: PaymentMethod::Card,
            status: PaymentStatus::Completed,
            transaction_id: "TXN_1_ABCDEFG".into(),
            card_last4: "4242".into(),
            refunded_amount: Decimal::ZERO,
            refund_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_partial_then_remaining_refund() {
        let mut p = payment(dec!(30.00));
        assert_eq!(p.apply_refund(Some(dec!(10.00)), None, REASON), Ok(dec!(10.00)));
        assert_eq!(p.status, PaymentStatus::PartiallyRefunded);
        assert_eq!(p.refund_reason.as_deref(), Some(REASON));

        assert_eq!(p.apply_refund(Some(dec!(20.00)), Some("damaged".into()), REASON), Ok(dec!(20.00)));
        assert_eq!(p.status, PaymentStatus::Refunded);
        assert_eq!(p.refunded_amount, dec!(30.00));

        assert_eq!(p.apply_refund(None, None, REASON), Err(PaymentError::AlreadyRefunded));
    }

    #[test]
    fn test_refund_requires_completed_payment() {
        let mut p = payment(dec!(30.00));
        p.status = PaymentStatus::Failed;
        assert_eq!(
            p.apply_refund(None, None, REASON),
            Err(PaymentError::NotCompleted(PaymentStatus::Failed))
        );
    }

    #[test]
    fn test_force_refunded_books_the_remaining_amount() {
        let mut p = payment(dec!(12.00));
        p.apply_refund(Some(dec!(2.00)), None, REASON).unwrap();
        p.force_status(PaymentStatus::Refunded, None, REASON).unwrap();
        assert_eq!(p.refunded_amount, dec!(12.00));
        assert!(p.is_refunded());

        let mut q = payment(dec!(12.00));
        q.apply_refund(Some(dec!(2.00)), None, REASON).unwrap();
        assert_eq!(
            q.force_status(PaymentStatus::Completed, None, REASON),
            Err(PaymentError::CannotForceStatus {
                from: PaymentStatus::PartiallyRefunded,
                to: PaymentStatus::Completed
            })
        );
    }

    #[test]
    fn test_force_status_keeps_settlement_with_the_order() {
        let mut p = payment(dec!(12.00));
        for status in [PaymentStatus::Failed, PaymentStatus::Pending] {
            assert_eq!(
                p.force_status(status, None, REASON),
                Err(PaymentError::CannotForceStatus { from: PaymentStatus::Completed, to: status })
            );
        }
        assert_eq!(p.status, PaymentStatus::Completed);

        let mut failed = payment(dec!(12.00));
        failed.status = PaymentStatus::Failed;
        assert!(failed.force_status(PaymentStatus::Completed, None, REASON).is_err());
        assert_eq!(failed.force_status(PaymentStatus::Pending, None, REASON), Ok(()));
    }

    #[test]
    fn test_transaction_id_format() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let id = generate_transaction_id(now, &mut rng);
        let parts: Vec<&str> = id.split('_').collect();
        assert_eq!(parts[0], "TXN");
        assert_eq!(parts[1], now.timestamp_millis().to_string());
        assert_eq!(parts[2].len(), 7);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_card_last4_validation() {
        assert_eq!(validate_card_last4(None), Ok("****".to_string()));
        assert_eq!(validate_card_last4(Some("4242")), Ok("4242".to_string()));
        assert!(validate_card_last4(Some("42a2")).is_err());
    }

    #[test]
    fn test_summary_counts_net_spend() {
        let mut partial = payment(dec!(20.00));
        partial.apply_refund(Some(dec!(5.00)), None, REASON).unwrap();
        let mut refunded = payment(dec!(8.00));
        refunded.apply_refund(None, None, REASON).unwrap();
        let mut pending = payment(dec!(3.00));
        pending.status = PaymentStatus::Pending;

        let summary = PaymentSummary::from_payments(&[payment(dec!(10.00)), partial, refunded, pending]);
        assert_eq!(summary.total_payments, 4);
        assert_eq!(summary.total_spent, dec!(25.00));
        assert_eq!(summary.completed_payments, 1);
        assert_eq!(summary.refunded_payments, 1);
        assert_eq!(summary.pending_payments, 1);
        assert_eq!(summary.total_refunded, dec!(13.00));
    }

    proptest! {
        #[test]
        fn refunds_never_exceed_amount(amount_cents in 1i64..100_000, requests in prop::collection::vec(1i64..50_000, 1..8)) {
            let amount = Decimal::new(amount_cents, 2);
            let mut p = payment(amount);
            for cents in requests {
                let requested = Decimal::new(cents, 2);
                let before = p.clone();
                match p.apply_refund(Some(requested), None, REASON) {
                    Ok(_) => prop_assert_eq!(p.refunded_amount, before.refunded_amount + requested),
                    Err(PaymentError::RefundExceedsAmount { remaining, .. }) => {
                        prop_assert!(requested > remaining);
                        prop_assert_eq!(&p, &before);
                    }
                    Err(PaymentError::AlreadyRefunded) => prop_assert!(before.is_refunded()),
                    Err(other) => prop_assert!(false, "unexpected error {:?}", other),
                }
                prop_assert!(p.refunded_amount <= p.amount);
                prop_assert_eq!(p.status == PaymentStatus::Refunded, p.refunded_amount == p.amount);
                prop_assert_eq!(
                    p.status == PaymentStatus::PartiallyRefunded,
                    p.refunded_amount > Decimal::ZERO && p.refunded_amount < p.amount
                );
            }
        }
    }
}
