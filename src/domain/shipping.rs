use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{require_non_negative, InvalidInput};

/// Delivery price for one wilaya. Rows are deactivated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingRate {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub active: bool,
}

/// Payload for adding a region, or repricing it when the name already exists.
#[derive(Debug, Clone)]
pub struct ShippingRateCreate {
    pub name: String,
    pub price: Decimal,
}

#[derive(Debug, Clone, Default)]
pub struct ShippingRatePatch {
    pub price: Option<Decimal>,
    pub active: Option<bool>,
}

/// Staged copy of the whole rate table. Edits stay local until the sheet is
/// saved through the shipping client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSheet {
    pub rows: Vec<ShippingRate>,
}

impl RateSheet {
    pub fn new(mut rows: Vec<ShippingRate>) -> Self {
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Self { rows }
    }

    /// Sets every region to `price`.
    pub fn apply_uniform_rate(&mut self, price: Decimal) -> Result<(), InvalidInput> {
        let price = require_non_negative("price", price)?;
        for row in &mut self.rows {
            row.price = price;
        }
        Ok(())
    }

    pub fn set_price(&mut self, region: &str, price: Decimal) -> Result<(), InvalidInput> {
        let price = require_non_negative("price", price)?;
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.name == region)
            .ok_or_else(|| InvalidInput(format!("unknown region '{region}'")))?;
        row.price = price;
        Ok(())
    }
}
