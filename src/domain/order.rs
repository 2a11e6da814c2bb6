use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::PhoneNumber;

/// Where an order sits in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Accepted,
    Rejected,
    Shipped,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Accepted,
        OrderStatus::Rejected,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Rejected | OrderStatus::Delivered)
    }

    /// Status reached by `event`, or `None` when the event is not allowed here.
    pub fn next(self, event: &OrderEvent) -> Option<OrderStatus> {
        use OrderStatus::*;
        match (self, event) {
            (Pending, OrderEvent::Accept) => Some(Accepted),
            (Pending, OrderEvent::Reject { .. }) => Some(Rejected),
            (Accepted, OrderEvent::Ship) => Some(Shipped),
            (Shipped, OrderEvent::ConfirmDelivery) => Some(Delivered),
            // A failed delivery penalizes the customer, the parcel stays out.
            (Shipped, OrderEvent::ReportNotDelivered) => Some(Shipped),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Accepted => "accepted",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
        };
        f.write_str(name)
    }
}

/// Operator actions on an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderEvent {
    Accept,
    Reject { reason: String },
    Ship,
    ConfirmDelivery,
    ReportNotDelivered,
}

impl fmt::Display for OrderEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrderEvent::Accept => "accept",
            OrderEvent::Reject { .. } => "reject",
            OrderEvent::Ship => "ship",
            OrderEvent::ConfirmDelivery => "confirm_delivery",
            OrderEvent::ReportNotDelivered => "report_not_delivered",
        };
        f.write_str(name)
    }
}

/// One line of an order. Name and price are copied at checkout so the order
/// stays correct after the product is renamed, repriced or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: String,
    pub product_name: String,
    pub price: Decimal,
    pub quantity: u32,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// A cash-on-delivery order together with the items it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub customer_id: String,
    pub customer_name: String,
    pub phone: PhoneNumber,
    pub address: String,
    pub wilaya: String,
    pub items: Vec<OrderItem>,
    pub delivery_price: Decimal,
    /// Items plus delivery, fixed at creation.
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn subtotal(&self) -> Decimal {
        subtotal(&self.items)
    }
}

pub fn subtotal(items: &[OrderItem]) -> Decimal {
    items.iter().map(OrderItem::line_total).sum()
}

/// Validated payload for the aggregate write of an order and its items.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub customer_id: String,
    pub customer_name: String,
    pub phone: PhoneNumber,
    pub address: String,
    pub wilaya: String,
    pub items: Vec<OrderItem>,
    pub delivery_price: Decimal,
}

/// A cart line as submitted by the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: u32) -> Self {
        Self { product_id: product_id.into(), quantity }
    }
}

/// Everything the checkout form submits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub wilaya: String,
    pub items: Vec<CartLine>,
}

/// Dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: usize,
    pub by_status: BTreeMap<OrderStatus, usize>,
    /// Sum of totals of delivered orders.
    pub delivered_revenue: Decimal,
}

impl OrderStats {
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut stats = OrderStats::default();
        for order in orders {
            stats.total += 1;
            *stats.by_status.entry(order.status).or_default() += 1;
            if order.status == OrderStatus::Delivered {
                stats.delivered_revenue += order.total_amount;
            }
        }
        stats
    }

    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status.get(&status).copied().unwrap_or(0)
    }
}
