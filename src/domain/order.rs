use super::PaymentMethod;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] =
        [Self::Pending, Self::Confirmed, Self::Shipped, Self::Delivered, Self::Cancelled];

    /// Address and other customer edits are only possible before shipping.
    pub fn can_modify(self) -> bool {
        !matches!(self, Self::Shipped | Self::Delivered | Self::Cancelled)
    }

    pub fn can_cancel(self) -> bool {
        !matches!(self, Self::Shipped | Self::Delivered | Self::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == s)
            .ok_or_else(|| format!("Invalid order status: {s}"))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingAddress {
    pub fn new(
        address: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    /// Every field is required. Returns the name of the first blank one.
    pub fn missing_field(&self) -> Option<&'static str> {
        [
            ("address", &self.address),
            ("city", &self.city),
            ("postalCode", &self.postal_code),
            ("country", &self.country),
        ]
        .into_iter()
        .find(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
    }
}

/// A line of an order, with title/image/price captured at order time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_id: String,
    pub title: String,
    pub image: String,
    pub price: Decimal,
    pub qty: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

/// A line as requested at checkout: which book and how many.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: String,
    pub qty: u32,
}

impl OrderLine {
    pub fn new(product_id: impl Into<String>, qty: u32) -> Self {
        Self { product_id: product_id.into(), qty }
    }
}

impl From<&OrderItem> for OrderLine {
    fn from(item: &OrderItem) -> Self {
        Self { product_id: item.product_id.clone(), qty: item.qty }
    }
}

/// Represents a customer order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    /// Set once the reserved stock has gone back to the catalog, so no path
    /// can return it twice.
    pub stock_released: bool,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn holds_stock(&self) -> bool {
        !self.stock_released
    }

    pub fn lines(&self) -> Vec<OrderLine> {
        self.items.iter().map(OrderLine::from).collect()
    }

    pub fn contains(&self, product_id: &str) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

/// Payload for storing a priced, stock-reserved order.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub user_id: String,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
}

/// Checkout request as received from the caller.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub items: Vec<OrderLine>,
    pub shipping_address: ShippingAddress,
    pub payment_method: Option<PaymentMethod>,
}

/// Back-office edit of an order.
#[derive(Debug, Clone, Default)]
pub struct AdminOrderUpdate {
    pub status: Option<OrderStatus>,
    pub is_delivered: Option<bool>,
    pub shipping_address: Option<ShippingAddress>,
}

pub fn total_price(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::line_total).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_modifiable_states() {
        let open: Vec<_> = OrderStatus::ALL.into_iter().filter(|s| s.can_modify()).collect();
        assert_eq!(open, vec![OrderStatus::Pending, OrderStatus::Confirmed]);
        assert!(!OrderStatus::Shipped.can_cancel());
    }

    #[test]
    fn test_status_parses_wire_names() {
        assert_eq!("cancelled".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_total_price_sums_line_totals() {
        let item = |price, qty| OrderItem {
            product_id: "b".into(),
            title: "t".into(),
            image: String::new(),
            price,
            qty,
        };
        assert_eq!(total_price(&[item(dec!(9.99), 2), item(dec!(5.00), 1)]), dec!(24.98));
    }

    #[test]
    fn test_missing_address_field() {
        let mut address = ShippingAddress::new("1 rue Lepic", "Paris", "75018", "France");
        assert_eq!(address.missing_field(), None);
        address.postal_code = "  ".into();
        assert_eq!(address.missing_field(), Some("postalCode"));
    }
}
