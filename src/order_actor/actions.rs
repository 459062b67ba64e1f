use crate::domain::{AdminOrderUpdate, Order, OrderLine, ShippingAddress};
use chrono::{DateTime, Utc};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Customer cancellation.
    Cancel,
    /// Replaces the shipping address while the order is still modifiable.
    UpdateAddress(ShippingAddress),
    /// Back-office edit; may set any status.
    AdminUpdate(AdminOrderUpdate),
    /// Links a completed payment to the order.
    MarkPaid { payment_id: String, paid_at: DateTime<Utc> },
    /// Cancellation triggered by a full refund; also clears `is_paid`.
    CancelForRefund,
    /// Hands back the reserved stock ahead of a deletion.
    ReleaseStock,
}

/// The order after a transition, plus the lines whose stock must go back to
/// the catalog. `lines` is empty when the stock was already released.
#[derive(Debug, Clone)]
pub struct StockRelease {
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Results from OrderActions - variants match 1:1 with OrderAction
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Cancel(StockRelease),
    UpdateAddress(Order),
    AdminUpdate(StockRelease),
    MarkPaid(Order),
    CancelForRefund(StockRelease),
    ReleaseStock(Vec<OrderLine>),
}
