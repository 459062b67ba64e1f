use super::{Book, Order, OrderStatus, Payment, PaymentSummary};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusCount {
    pub status: OrderStatus,
    pub count: usize,
}

/// A best seller, titled with the snapshot taken at order time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopBook {
    pub product_id: String,
    pub title: String,
    pub total_sold: u64,
}

/// Back-office dashboard over the four collections.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_books: usize,
    pub total_users: usize,
    pub total_orders: usize,
    pub total_payments: usize,
    /// Paid amounts net of refunds, over completed and partially refunded
    /// payments.
    pub total_revenue: Decimal,
    pub recent_orders: usize,
    pub out_of_stock: usize,
    /// Only statuses with at least one order, in lifecycle order.
    pub orders_by_status: Vec<StatusCount>,
    pub top_books: Vec<TopBook>,
}

impl AdminStats {
    /// `recent_since` bounds `recent_orders`; `top_limit` caps `top_books`.
    /// Cancelled orders count in the totals but sold nothing.
    pub fn compute(
        books: &[Book],
        total_users: usize,
        orders: &[Order],
        payments: &[Payment],
        recent_since: DateTime<Utc>,
        top_limit: usize,
    ) -> Self {
        let orders_by_status = OrderStatus::ALL
            .into_iter()
            .map(|status| StatusCount { status, count: orders.iter().filter(|o| o.status == status).count() })
            .filter(|entry| entry.count > 0)
            .collect();

        let mut top_books: Vec<TopBook> = Vec::new();
        for item in orders
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .flat_map(|o| o.items.iter())
        {
            match top_books.iter_mut().find(|t| t.product_id == item.product_id) {
                Some(top) => top.total_sold += u64::from(item.qty),
                None => top_books.push(TopBook {
                    product_id: item.product_id.clone(),
                    title: item.title.clone(),
                    total_sold: u64::from(item.qty),
                }),
            }
        }
        // stable: ties keep first-ordered first
        top_books.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
        top_books.truncate(top_limit);

        Self {
            total_books: books.len(),
            total_users,
            total_orders: orders.len(),
            total_payments: payments.len(),
            total_revenue: PaymentSummary::from_payments(payments).total_spent,
            recent_orders: orders.iter().filter(|o| o.created_at >= recent_since).count(),
            out_of_stock: books.iter().filter(|b| !b.in_stock()).count(),
            orders_by_status,
            top_books,
        }
    }
}
