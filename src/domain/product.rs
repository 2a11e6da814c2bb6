use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Reference price shown struck through.
    pub old_price: Decimal,
    /// Selling price.
    pub new_price: Decimal,
    pub image_url: String,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whole-percent discount of `new_price` against `old_price`, if any.
    pub fn discount_percent(&self) -> Option<Decimal> {
        if self.old_price.is_zero() || self.new_price >= self.old_price {
            return None;
        }
        let off = (self.old_price - self.new_price) / self.old_price * Decimal::ONE_HUNDRED;
        Some(off.round())
    }
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub old_price: Decimal,
    pub new_price: Decimal,
    pub image_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub old_price: Option<Decimal>,
    pub new_price: Option<Decimal>,
    pub image_url: Option<String>,
}
