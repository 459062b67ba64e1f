use super::actions::{OrderAction, OrderActionResult, StockRelease};
use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{total_price, Order, OrderCreate, OrderLine, OrderStatus, ShippingAddress};
use chrono::Utc;

fn validate_address(address: &ShippingAddress) -> Result<(), OrderError> {
    match address.missing_field() {
        Some(field) => Err(OrderError::ValidationError(format!("shipping {field} is required"))),
        None => Ok(()),
    }
}

impl Order {
    /// Flips `stock_released` and returns the lines to give back, or nothing
    /// if they were already given back.
    fn take_stock(&mut self) -> Vec<OrderLine> {
        if self.stock_released {
            return Vec::new();
        }
        self.stock_released = true;
        self.lines()
    }

    fn released(&mut self) -> StockRelease {
        let lines = self.take_stock();
        StockRelease { order: self.clone(), lines }
    }
}

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Order from priced items.
    ///
    /// The total is computed here from the item snapshots and never again.
    /// The order starts `pending`, holding the stock reserved for it.
    fn from_create(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(item) = params.items.iter().find(|item| item.qty == 0) {
            return Err(OrderError::ValidationError(format!(
                "quantity must be at least 1 for {}",
                item.product_id
            )));
        }
        validate_address(&params.shipping_address)?;

        Ok(Self {
            id,
            user_id: params.user_id,
            total_price: total_price(&params.items),
            items: params.items,
            shipping_address: params.shipping_address,
            payment_method: params.payment_method,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            status: OrderStatus::Pending,
            payment_id: None,
            stock_released: false,
            created_at: Utc::now(),
        })
    }

    /// Orders are only changed through actions.
    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Ok(())
    }

    /// Handles the order state machine.
    ///
    /// # Actions
    /// - `Cancel`: from `pending`/`confirmed` only
    /// - `UpdateAddress`: while the status still allows modification
    /// - `AdminUpdate`: any status; `is_delivered = true` forces `delivered`.
    ///   A cancelled order whose stock went back stays cancelled.
    /// - `MarkPaid`: once, and never on a cancelled order
    /// - `CancelForRefund`: unconditional cancellation, clears `is_paid`
    /// - `ReleaseStock`: used before deletion
    ///
    /// Every path that ends in `cancelled` returns the stock at most once.
    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Cancel => {
                if self.status == OrderStatus::Cancelled {
                    return Err(OrderError::AlreadyCancelled);
                }
                if !self.status.can_cancel() {
                    return Err(OrderError::CannotCancel(self.status));
                }
                self.status = OrderStatus::Cancelled;
                Ok(OrderActionResult::Cancel(self.released()))
            }
            OrderAction::UpdateAddress(address) => {
                if !self.status.can_modify() {
                    return Err(OrderError::CannotModify(self.status));
                }
                validate_address(&address)?;
                self.shipping_address = address;
                Ok(OrderActionResult::UpdateAddress(self.clone()))
            }
            OrderAction::AdminUpdate(update) => {
                let previous = self.status;
                let target = match update.is_delivered {
                    Some(true) => OrderStatus::Delivered,
                    _ => update.status.unwrap_or(previous),
                };
                if previous == OrderStatus::Cancelled && self.stock_released && target != OrderStatus::Cancelled {
                    return Err(OrderError::CannotReopen);
                }
                if let Some(address) = update.shipping_address {
                    validate_address(&address)?;
                    self.shipping_address = address;
                }
                if let Some(status) = update.status {
                    self.status = status;
                }
                if let Some(delivered) = update.is_delivered {
                    self.is_delivered = delivered;
                    if delivered {
                        self.status = OrderStatus::Delivered;
                    }
                }
                let release = if self.status == OrderStatus::Cancelled && previous != OrderStatus::Cancelled {
                    self.released()
                } else {
                    StockRelease { order: self.clone(), lines: Vec::new() }
                };
                Ok(OrderActionResult::AdminUpdate(release))
            }
            OrderAction::MarkPaid { payment_id, paid_at } => {
                if self.is_paid {
                    return Err(OrderError::AlreadyPaid);
                }
                if self.status == OrderStatus::Cancelled {
                    return Err(OrderError::CannotPay(self.status));
                }
                self.is_paid = true;
                self.paid_at = Some(paid_at);
                self.payment_id = Some(payment_id);
                Ok(OrderActionResult::MarkPaid(self.clone()))
            }
            OrderAction::CancelForRefund => {
                self.status = OrderStatus::Cancelled;
                self.is_paid = false;
                Ok(OrderActionResult::CancelForRefund(self.released()))
            }
            OrderAction::ReleaseStock => Ok(OrderActionResult::ReleaseStock(self.take_stock())),
        }
    }
}
