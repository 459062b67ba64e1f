use crate::book_actor::BookError;
use crate::clients::{BookClient, OrderClient, PaymentClient, UserClient};
use crate::config::StatsConfig;
use crate::domain::{AdminStats, Caller};
use crate::error::ErrorKind;
use crate::order_actor::OrderError;
use crate::payment_actor::PaymentError;
use crate::user_actor::UserError;
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{info, instrument};

/// Errors from building the back-office dashboard.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StatsError {
    #[error("Access denied: {0}")]
    AccessDenied(String),
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Book(#[from] BookError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Payment(#[from] PaymentError),
}

impl StatsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AccessDenied(_) => ErrorKind::AccessDenied,
            Self::User(e) => e.kind(),
            Self::Book(e) => e.kind(),
            Self::Order(e) => e.kind(),
            Self::Payment(e) => e.kind(),
        }
    }
}

/// Read-only figures over every store, for administrators.
#[derive(Clone)]
pub struct StatsClient {
    user_client: UserClient,
    book_client: BookClient,
    order_client: OrderClient,
    payment_client: PaymentClient,
    config: StatsConfig,
}

impl StatsClient {
    pub fn new(
        user_client: UserClient,
        book_client: BookClient,
        order_client: OrderClient,
        payment_client: PaymentClient,
        config: StatsConfig,
    ) -> Self {
        Self { user_client, book_client, order_client, payment_client, config }
    }

    #[instrument(skip(self))]
    pub async fn admin_stats(&self, caller: &Caller) -> Result<AdminStats, StatsError> {
        require_admin!(caller, StatsError);
        let books = self.book_client.list_books(None).await?;
        let total_users = self.user_client.count_users().await?;
        let orders = self.order_client.find_orders(|_| true).await?;
        let payments = self.payment_client.find_payments(|_| true).await?;

        let since = Utc::now() - Duration::days(self.config.recent_days);
        let stats = AdminStats::compute(&books, total_users, &orders, &payments, since, self.config.top_books);
        info!(
            orders = stats.total_orders,
            revenue = %stats.total_revenue,
            out_of_stock = stats.out_of_stock,
            "Dashboard computed"
        );
        Ok(stats)
    }
}
