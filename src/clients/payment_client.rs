use crate::actor_framework::ResourceClient;
use crate::clients::OrderClient;
use crate::domain::{
    validate_card_last4, AdminPaymentUpdate, Caller, OrderStatus, Page, Payment, PaymentCreate, PaymentRequest,
    PaymentStatus, PaymentSummary,
};
use crate::order_actor::OrderError;
use crate::payment_actor::{PaymentAction, PaymentActionResult, PaymentError, RefundOutcome};
use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument, warn};

/// Client for the payment ledger.
///
/// Payments are simulated: a recorded payment is immediately `completed`.
/// The client keeps the paid order in step with the ledger on payment and on
/// full refund.
#[derive(Clone)]
pub struct PaymentClient {
    inner: ResourceClient<Payment>,
    order_client: OrderClient,
    default_refund_reason: String,
    page_limit: usize,
}

impl_client_methods!(PaymentClient, Payment, PaymentError, payment);

impl PaymentClient {
    pub fn new(
        inner: ResourceClient<Payment>,
        order_client: OrderClient,
        default_refund_reason: String,
        page_limit: usize,
    ) -> Self {
        Self { inner, order_client, default_refund_reason, page_limit }
    }

    /// Pays for an order owned by the caller.
    ///
    /// If the order cannot be marked paid once the payment is recorded, the
    /// payment is marked `failed` and the error is returned.
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    pub async fn create_payment(&self, caller: &Caller, request: PaymentRequest) -> Result<Payment, PaymentError> {
        info!("Processing create_payment request");
        let card_last4 = validate_card_last4(request.card_last4.as_deref())?;

        let order = self
            .order_client
            .find_order(request.order_id.clone())
            .await?
            .ok_or_else(|| PaymentError::OrderNotFound(request.order_id.clone()))?;
        if !caller.can_access(&order.user_id) {
            warn!("Payment for another user's order refused");
            return Err(PaymentError::AccessDenied(format!("order {} belongs to another user", order.id)));
        }
        if order.is_paid {
            return Err(PaymentError::AlreadyPaid);
        }
        if order.status == OrderStatus::Cancelled {
            return Err(OrderError::CannotPay(order.status).into());
        }

        debug!("Sending request");
        let payload = PaymentCreate {
            user_id: order.user_id.clone(),
            order_id: order.id.clone(),
            amount: order.total_price,
            payment_method: request.payment_method.unwrap_or(order.payment_method),
            card_last4,
        };
        let payment = self.inner.create(payload).await?;
        let payment = self.require_payment(payment).await?;

        if let Err(e) = self
            .order_client
            .mark_paid(order.id.clone(), payment.id.clone(), payment.created_at)
            .await
        {
            error!(payment_id = %payment.id, error = %e, "Could not mark order paid, failing payment");
            if let Err(compensation) = self.inner.perform_action(payment.id.clone(), PaymentAction::MarkFailed).await {
                error!(error = %compensation, "Compensation failed");
            }
            return Err(e.into());
        }

        info!(payment_id = %payment.id, transaction_id = %payment.transaction_id, amount = %payment.amount, "Payment completed");
        Ok(payment)
    }

    /// The caller's payments, newest first.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, caller: &Caller) -> Result<Vec<Payment>, PaymentError> {
        debug!("Sending request");
        let user_id = caller.user_id.clone();
        let mut payments = self.inner.find(move |p: &Payment| p.user_id == user_id).await?;
        payments.reverse();
        Ok(payments)
    }

    #[instrument(skip(self))]
    pub async fn summary(&self, caller: &Caller) -> Result<PaymentSummary, PaymentError> {
        let payments = self.list_mine(caller).await?;
        Ok(PaymentSummary::from_payments(&payments))
    }

    #[instrument(skip(self))]
    pub async fn get_payment(&self, caller: &Caller, id: String) -> Result<Payment, PaymentError> {
        let payment = self.require_payment(id).await?;
        Self::authorize(caller, payment)
    }

    #[instrument(skip(self))]
    pub async fn get_by_transaction(&self, caller: &Caller, transaction_id: String) -> Result<Payment, PaymentError> {
        debug!("Sending request");
        let txn = transaction_id.clone();
        let payment = self
            .inner
            .find(move |p: &Payment| p.transaction_id == txn)
            .await?
            .into_iter()
            .next()
            .ok_or(PaymentError::NotFound(transaction_id))?;
        Self::authorize(caller, payment)
    }

    /// Refunds `amount`, or everything still refundable when `None`.
    #[instrument(skip(self))]
    pub async fn refund(
        &self,
        caller: &Caller,
        id: String,
        amount: Option<Decimal>,
        reason: Option<String>,
    ) -> Result<Payment, PaymentError> {
        self.get_payment(caller, id.clone()).await?;
        debug!("Sending request");
        let action = PaymentAction::Refund {
            amount,
            reason,
            default_reason: self.default_refund_reason.clone(),
        };
        match self.inner.perform_action(id, action).await? {
            PaymentActionResult::Refund(outcome) => self.settle_refund(outcome).await,
            _ => Err(PaymentError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    #[instrument(skip(self))]
    pub async fn list_payments(
        &self,
        caller: &Caller,
        status: Option<PaymentStatus>,
        page: usize,
        limit: Option<usize>,
    ) -> Result<Page<Payment>, PaymentError> {
        require_admin!(caller, PaymentError);
        debug!("Sending request");
        let mut payments = self
            .inner
            .find(move |p: &Payment| status.is_none_or(|s| p.status == s))
            .await?;
        payments.reverse();
        Ok(Page::paginate(payments, page, limit.unwrap_or(self.page_limit)))
    }

    /// Back-office refund or status override, through the same accounting as
    /// customer refunds.
    #[instrument(skip(self, update))]
    pub async fn admin_update_payment(
        &self,
        caller: &Caller,
        id: String,
        update: AdminPaymentUpdate,
    ) -> Result<Payment, PaymentError> {
        require_admin!(caller, PaymentError);
        debug!("Sending request");
        let action = PaymentAction::AdminAdjust {
            update,
            default_reason: self.default_refund_reason.clone(),
        };
        match self.inner.perform_action(id, action).await? {
            PaymentActionResult::AdminAdjust(outcome) => self.settle_refund(outcome).await,
            _ => Err(PaymentError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Raw ledger query used by the dashboard.
    pub(crate) async fn find_payments(
        &self,
        predicate: impl Fn(&Payment) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<Payment>, PaymentError> {
        debug!("Sending request");
        self.inner.find(predicate).await
    }

    fn authorize(caller: &Caller, payment: Payment) -> Result<Payment, PaymentError> {
        if !caller.can_access(&payment.user_id) {
            warn!(payment_id = %payment.id, "Payment access refused");
            return Err(PaymentError::AccessDenied(format!("payment {} belongs to another user", payment.id)));
        }
        Ok(payment)
    }

    /// A refund that emptied the payment cancels its order and returns the
    /// order's stock.
    async fn settle_refund(&self, outcome: RefundOutcome) -> Result<Payment, PaymentError> {
        let payment = outcome.payment;
        info!(payment_id = %payment.id, refunded = %outcome.refunded, status = %payment.status, "Refund booked");
        if outcome.became_refunded {
            match self.order_client.cancel_for_refund(payment.order_id.clone()).await {
                Ok(_) => {}
                Err(OrderError::NotFound(order_id)) => {
                    warn!(%order_id, "Refunded payment has no order left to cancel");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(payment)
    }
}
