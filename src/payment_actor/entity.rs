use super::actions::{PaymentAction, PaymentActionResult, RefundOutcome};
use super::error::PaymentError;
use crate::actor_framework::Entity;
use crate::domain::{generate_transaction_id, AdminPaymentUpdate, Payment, PaymentCreate, PaymentStatus};
use chrono::Utc;
use rust_decimal::Decimal;

impl Payment {
    fn refund_outcome(&self, refunded: Decimal, was_refunded: bool) -> RefundOutcome {
        RefundOutcome {
            payment: self.clone(),
            refunded,
            became_refunded: !was_refunded && self.is_refunded(),
        }
    }

    fn admin_adjust(
        &mut self,
        update: AdminPaymentUpdate,
        default_reason: &str,
    ) -> Result<Decimal, PaymentError> {
        if let Some(amount) = update.refund_amount {
            return self.apply_refund(Some(amount), update.refund_reason, default_reason);
        }
        if let Some(status) = update.status {
            let before = self.refunded_amount;
            self.force_status(status, update.refund_reason, default_reason)?;
            return Ok(self.refunded_amount - before);
        }
        if let Some(reason) = update.refund_reason {
            self.refund_reason = Some(reason);
            self.updated_at = Utc::now();
        }
        Ok(Decimal::ZERO)
    }
}

impl Entity for Payment {
    type Id = String;
    type CreatePayload = PaymentCreate;
    type Patch = ();
    type Action = PaymentAction;
    type ActionResult = PaymentActionResult;
    type Error = PaymentError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Records a completed payment and stamps it with a fresh transaction id.
    fn from_create(id: String, params: PaymentCreate) -> Result<Self, PaymentError> {
        if params.amount < Decimal::ZERO {
            return Err(PaymentError::ValidationError(format!(
                "amount must not be negative, got {}",
                params.amount
            )));
        }
        let now = Utc::now();
        Ok(Self {
            id,
            user_id: params.user_id,
            order_id: params.order_id,
            amount: params.amount,
            payment_method: params.payment_method,
            status: PaymentStatus::Completed,
            transaction_id: generate_transaction_id(now, &mut rand::rng()),
            card_last4: params.card_last4,
            refunded_amount: Decimal::ZERO,
            refund_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Transaction ids are unique, and an order settles at most one payment.
    fn check_unique(&self, existing: &Self) -> Result<(), PaymentError> {
        if existing.transaction_id == self.transaction_id {
            return Err(PaymentError::ValidationError(format!(
                "duplicate transaction id {}",
                self.transaction_id
            )));
        }
        if existing.order_id == self.order_id && existing.settles_order() && self.settles_order() {
            return Err(PaymentError::AlreadyPaid);
        }
        Ok(())
    }

    /// The ledger is only changed through refund accounting.
    fn on_update(&mut self, _patch: ()) -> Result<(), PaymentError> {
        Ok(())
    }

    fn handle_action(&mut self, action: PaymentAction) -> Result<PaymentActionResult, PaymentError> {
        let was_refunded = self.is_refunded();
        match action {
            PaymentAction::Refund { amount, reason, default_reason } => {
                let refunded = self.apply_refund(amount, reason, &default_reason)?;
                Ok(PaymentActionResult::Refund(self.refund_outcome(refunded, was_refunded)))
            }
            PaymentAction::AdminAdjust { update, default_reason } => {
                let refunded = self.admin_adjust(update, &default_reason)?;
                Ok(PaymentActionResult::AdminAdjust(self.refund_outcome(refunded, was_refunded)))
            }
            PaymentAction::MarkFailed => {
                self.status = PaymentStatus::Failed;
                self.updated_at = Utc::now();
                Ok(PaymentActionResult::MarkFailed(self.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PaymentMethod;
    use rust_decimal_macros::dec;

    fn create(order_id: &str, amount: Decimal) -> PaymentCreate {
        PaymentCreate {
            user_id: "user_1".into(),
            order_id: order_id.into(),
            amount,
            payment_method: PaymentMethod::Card,
            card_last4: "****".into(),
        }
    }

    fn refund(amount: Option<Decimal>) -> PaymentAction {
        PaymentAction::Refund { amount, reason: None, default_reason: "Customer request".into() }
    }

    fn outcome(result: PaymentActionResult) -> RefundOutcome {
        match result {
            PaymentActionResult::Refund(o) | PaymentActionResult::AdminAdjust(o) => o,
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_created_completed_with_transaction_id() {
        let p = Payment::from_create("payment_1".into(), create("order_1", dec!(20.00))).unwrap();
        assert_eq!(p.status, PaymentStatus::Completed);
        assert!(p.transaction_id.starts_with("TXN_"));
        assert_eq!(p.refunded_amount, Decimal::ZERO);
    }

    #[test]
    fn test_second_settled_payment_for_order_is_rejected() {
        let first = Payment::from_create("p1".into(), create("order_1", dec!(20.00))).unwrap();
        let second = Payment::from_create("p2".into(), create("order_1", dec!(20.00))).unwrap();
        assert_eq!(second.check_unique(&first), Err(PaymentError::AlreadyPaid));

        let mut failed = first.clone();
        failed.handle_action(PaymentAction::MarkFailed).unwrap();
        assert_eq!(second.check_unique(&failed), Ok(()));
    }

    #[test]
    fn test_full_refund_is_flagged_once() {
        let mut p = Payment::from_create("p".into(), create("order_1", dec!(20.00))).unwrap();
        let partial = outcome(p.handle_action(refund(Some(dec!(5.00)))).unwrap());
        assert!(!partial.became_refunded);

        let rest = outcome(p.handle_action(refund(None)).unwrap());
        assert_eq!(rest.refunded, dec!(15.00));
        assert!(rest.became_refunded);
        assert_eq!(p.handle_action(refund(None)).unwrap_err(), PaymentError::AlreadyRefunded);
    }

    #[test]
    fn test_admin_force_refunded_uses_accounting() {
        let mut p = Payment::from_create("p".into(), create("order_1", dec!(20.00))).unwrap();
        let update = AdminPaymentUpdate { status: Some(PaymentStatus::Refunded), ..Default::default() };
        let o = outcome(
            p.handle_action(PaymentAction::AdminAdjust { update, default_reason: "Admin".into() })
                .unwrap(),
        );
        assert_eq!(o.refunded, dec!(20.00));
        assert!(o.became_refunded);
        assert_eq!(p.refunded_amount, p.amount);
        assert_eq!(p.refund_reason.as_deref(), Some("Admin"));
    }

    #[test]
    fn test_admin_refund_over_balance_is_limit_exceeded() {
        let mut p = Payment::from_create("p".into(), create("order_1", dec!(20.00))).unwrap();
        let update = AdminPaymentUpdate { refund_amount: Some(dec!(25.00)), ..Default::default() };
        let err = p
            .handle_action(PaymentAction::AdminAdjust { update, default_reason: "Admin".into() })
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::LimitExceeded);
    }
}
