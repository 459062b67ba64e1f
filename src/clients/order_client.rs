use crate::actor_framework::ResourceClient;
use crate::clients::BookClient;
use crate::domain::{
    AdminOrderUpdate, Caller, NewOrder, Order, OrderCreate, OrderItem, OrderLine, OrderStatus, Page,
    ShippingAddress,
};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError, StockRelease};
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

/// Client for the order store.
///
/// This client handles the orchestration around an order's lifecycle:
/// stock checks and reservations on creation, and stock release on every
/// path that cancels or removes an order.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    book_client: BookClient,
    page_limit: usize,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>, book_client: BookClient, page_limit: usize) -> Self {
        Self { inner, book_client, page_limit }
    }

    /// Places an order for the caller.
    ///
    /// Every line is checked against stock before anything moves, then the
    /// stock is reserved and the order stored with prices taken from the
    /// catalog. A failure after the reservation puts the stock back.
    #[instrument(skip(self, order), fields(user_id = %caller.user_id, lines = order.items.len()))]
    pub async fn create_order(&self, caller: &Caller, order: NewOrder) -> Result<Order, OrderError> {
        info!("Processing create_order request");

        if order.items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(line) = order.items.iter().find(|line| line.qty == 0) {
            return Err(OrderError::ValidationError(format!(
                "quantity must be at least 1 for {}",
                line.product_id
            )));
        }
        if let Some(field) = order.shipping_address.missing_field() {
            return Err(OrderError::ValidationError(format!("shipping {field} is required")));
        }

        // Step 1: check every line before any mutation
        let books = self.book_client.check_availability(&order.items).await.map_err(|e| {
            warn!(error = %e, "Availability check failed");
            OrderError::from(e)
        })?;

        let mut items = Vec::with_capacity(order.items.len());
        for line in &order.items {
            let book = books
                .get(&line.product_id)
                .ok_or_else(|| OrderError::BookNotFound(line.product_id.clone()))?;
            items.push(OrderItem {
                product_id: book.id.clone(),
                title: book.title.clone(),
                image: book.image.clone(),
                price: book.price,
                qty: line.qty,
            });
        }

        // Step 2: conditional reservation, compensated inside the book client
        self.book_client.reserve(&order.items).await.map_err(|e| {
            error!(error = %e, "Stock reservation failed");
            OrderError::from(e)
        })?;

        // Step 3: store the order
        let payload = OrderCreate {
            user_id: caller.user_id.clone(),
            items,
            shipping_address: order.shipping_address,
            payment_method: order.payment_method.unwrap_or_default(),
        };
        let created = match self.inner.create(payload).await {
            Ok(id) => self.require_order(id).await,
            Err(e) => Err(e),
        };
        match created {
            Ok(order) => {
                info!(order_id = %order.id, total = %order.total_price, "Order created");
                Ok(order)
            }
            Err(e) => {
                error!(error = %e, "Order creation failed, releasing stock");
                if let Err(release_err) = self.book_client.release(&order.items).await {
                    error!(error = %release_err, "Compensation failed");
                }
                Err(e)
            }
        }
    }

    /// The caller's orders, newest first.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, caller: &Caller) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        let user_id = caller.user_id.clone();
        let mut orders = self.inner.find(move |o: &Order| o.user_id == user_id).await?;
        orders.reverse();
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, caller: &Caller, id: String) -> Result<Order, OrderError> {
        let order = self.require_order(id).await?;
        if !caller.can_access(&order.user_id) {
            warn!(order_id = %order.id, "Order access refused");
            return Err(OrderError::AccessDenied(format!("order {} belongs to another user", order.id)));
        }
        Ok(order)
    }

    #[instrument(skip(self, address))]
    pub async fn update_address(&self, caller: &Caller, id: String, address: ShippingAddress) -> Result<Order, OrderError> {
        self.get_order(caller, id.clone()).await?;
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::UpdateAddress(address)).await? {
            OrderActionResult::UpdateAddress(order) => {
                info!("Shipping address updated");
                Ok(order)
            }
            _ => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Customer cancellation; the reserved stock goes back to the catalog.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, caller: &Caller, id: String) -> Result<Order, OrderError> {
        self.get_order(caller, id.clone()).await?;
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::Cancel).await? {
            OrderActionResult::Cancel(release) => {
                info!("Order cancelled");
                self.return_stock(release).await
            }
            _ => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Back-office listing, newest first. `limit` defaults to the configured
    /// page size.
    #[instrument(skip(self))]
    pub async fn list_orders(
        &self,
        caller: &Caller,
        status: Option<OrderStatus>,
        page: usize,
        limit: Option<usize>,
    ) -> Result<Page<Order>, OrderError> {
        require_admin!(caller, OrderError);
        debug!("Sending request");
        let mut orders = self
            .inner
            .find(move |o: &Order| status.is_none_or(|s| o.status == s))
            .await?;
        orders.reverse();
        Ok(Page::paginate(orders, page, limit.unwrap_or(self.page_limit)))
    }

    #[instrument(skip(self, update))]
    pub async fn admin_update_order(&self, caller: &Caller, id: String, update: AdminOrderUpdate) -> Result<Order, OrderError> {
        require_admin!(caller, OrderError);
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::AdminUpdate(update)).await? {
            OrderActionResult::AdminUpdate(release) => {
                info!(status = %release.order.status, "Order updated by admin");
                self.return_stock(release).await
            }
            _ => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Removes an order in any status. Stock it still holds is returned first.
    #[instrument(skip(self))]
    pub async fn delete_order(&self, caller: &Caller, id: String) -> Result<(), OrderError> {
        require_admin!(caller, OrderError);
        debug!("Sending request");
        let lines = match self.inner.perform_action(id.clone(), OrderAction::ReleaseStock).await? {
            OrderActionResult::ReleaseStock(lines) => lines,
            _ => return Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
        };
        self.release_lines(&lines).await?;
        self.inner.delete(id).await?;
        info!("Order deleted");
        Ok(())
    }

    /// Links a payment to its order.
    #[instrument(skip(self))]
    pub(crate) async fn mark_paid(&self, id: String, payment_id: String, paid_at: DateTime<Utc>) -> Result<Order, OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::MarkPaid { payment_id, paid_at }).await? {
            OrderActionResult::MarkPaid(order) => {
                info!("Order marked paid");
                Ok(order)
            }
            _ => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Cancellation caused by a full refund.
    #[instrument(skip(self))]
    pub(crate) async fn cancel_for_refund(&self, id: String) -> Result<Order, OrderError> {
        debug!("Sending request");
        match self.inner.perform_action(id, OrderAction::CancelForRefund).await? {
            OrderActionResult::CancelForRefund(release) => {
                info!("Order cancelled after full refund");
                self.return_stock(release).await
            }
            _ => Err(OrderError::ActorCommunicationError("Unexpected result".to_string())),
        }
    }

    /// Raw query used by the recommendation and ledger layers.
    pub(crate) async fn find_orders(
        &self,
        predicate: impl Fn(&Order) -> bool + Send + Sync + 'static,
    ) -> Result<Vec<Order>, OrderError> {
        debug!("Sending request");
        self.inner.find(predicate).await
    }

    async fn return_stock(&self, release: StockRelease) -> Result<Order, OrderError> {
        self.release_lines(&release.lines).await?;
        Ok(release.order)
    }

    async fn release_lines(&self, lines: &[OrderLine]) -> Result<(), OrderError> {
        if lines.is_empty() {
            return Ok(());
        }
        self.book_client.release(lines).await.map_err(|e| {
            error!(error = %e, "Stock release failed");
            OrderError::from(e)
        })
    }
}
