use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use crate::actor_framework::{Filter, ResourceClient};
use crate::domain::{require_non_negative, RateSheet, ShippingRate, ShippingRateCreate, ShippingRatePatch};
use crate::shipping_actor::ShippingError;

/// Client for the shipping rate table.
#[derive(Clone)]
pub struct ShippingClient {
    inner: ResourceClient<ShippingRate>,
    default_price: Decimal,
}

impl ShippingClient {
    pub fn new(inner: ResourceClient<ShippingRate>, default_price: Decimal) -> Self {
        Self { inner, default_price }
    }

    pub fn default_price(&self) -> Decimal {
        self.default_price
    }

    /// Adds a region, or reprices it when the name is already known.
    #[instrument(skip(self))]
    pub async fn upsert_region(&self, name: &str, price: Decimal) -> Result<String, ShippingError> {
        let payload = ShippingRateCreate { name: name.to_string(), price };
        let upserted = self.inner.upsert(payload).await?;
        debug!(region_id = %upserted.id(), "Region stored");
        Ok(upserted.into_id())
    }

    /// Delivery price for `region`: the active exact match, or the default.
    #[instrument(skip(self))]
    pub async fn price_for(&self, region: &str) -> Result<Decimal, ShippingError> {
        let wanted = region.trim().to_string();
        let rows = self
            .inner
            .list(Some(Box::new(move |r: &ShippingRate| r.active && r.name == wanted)))
            .await?;
        match rows.first() {
            Some(rate) => Ok(rate.price),
            None => {
                debug!(default_price = %self.default_price, "No active rate, using default");
                Ok(self.default_price)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn find_region(&self, region: &str) -> Result<Option<ShippingRate>, ShippingError> {
        let wanted = region.trim().to_string();
        let mut rows = self.inner.list(Some(Box::new(move |r: &ShippingRate| r.name == wanted))).await?;
        Ok(rows.pop())
    }

    #[instrument(skip(self))]
    pub async fn set_rate(&self, region: &str, price: Decimal) -> Result<ShippingRate, ShippingError> {
        let price = require_non_negative("price", price)?;
        self.patch_region(region, ShippingRatePatch { price: Some(price), active: None }).await
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, region: &str, active: bool) -> Result<ShippingRate, ShippingError> {
        self.patch_region(region, ShippingRatePatch { price: None, active: Some(active) }).await
    }

    async fn patch_region(&self, region: &str, patch: ShippingRatePatch) -> Result<ShippingRate, ShippingError> {
        let row = self
            .find_region(region)
            .await?
            .ok_or_else(|| ShippingError::NotFound(region.to_string()))?;
        Ok(self.inner.update(row.id, patch).await?)
    }

    /// Regions sorted by name. Checkout passes `active_only = true`.
    #[instrument(skip(self))]
    pub async fn list_regions(&self, active_only: bool) -> Result<Vec<ShippingRate>, ShippingError> {
        let filter: Option<Filter<ShippingRate>> = if active_only {
            Some(Box::new(|r: &ShippingRate| r.active))
        } else {
            None
        };
        let mut rows = self.inner.list(filter).await?;
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(rows)
    }

    /// Loads every region into a staged sheet for bulk edits.
    #[instrument(skip(self))]
    pub async fn rate_sheet(&self) -> Result<RateSheet, ShippingError> {
        Ok(RateSheet::new(self.inner.list(None).await?))
    }

    /// Commits the staged prices of `sheet`. Returns the number of rows written.
    ///
    /// Only prices are written; the active flag stays whatever the table holds.
    #[instrument(skip(self, sheet), fields(rows = sheet.rows.len()))]
    pub async fn save_rate_sheet(&self, sheet: &RateSheet) -> Result<usize, ShippingError> {
        for row in &sheet.rows {
            let patch = ShippingRatePatch { price: Some(row.price), active: None };
            self.inner.update(row.id.clone(), patch).await?;
        }
        info!("Rate sheet saved");
        Ok(sheet.rows.len())
    }
}
