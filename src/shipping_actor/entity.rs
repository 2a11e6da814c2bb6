use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{require_non_negative, require_text, ShippingRate, ShippingRateCreate, ShippingRatePatch};

impl Entity for ShippingRate {
    type Id = String;
    type CreatePayload = ShippingRateCreate;
    type Patch = ShippingRatePatch;
    type Action = ();
    type ActionResult = ();

    fn id(&self) -> &String { &self.id }

    /// New regions start active.
    fn from_create(id: String, payload: ShippingRateCreate) -> Result<Self, FrameworkError> {
        let name = require_text("region", &payload.name).map_err(|e| FrameworkError::Validation(e.0))?;
        let price = require_non_negative("price", payload.price).map_err(|e| FrameworkError::Validation(e.0))?;
        Ok(Self { id, name: name.to_string(), price, active: true })
    }

    fn on_update(&mut self, patch: ShippingRatePatch) -> Result<(), FrameworkError> {
        if let Some(price) = patch.price {
            self.price = require_non_negative("price", price).map_err(|e| FrameworkError::Validation(e.0))?;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        Ok(())
    }

    /// Rows are never deleted, only deactivated.
    fn on_delete(&self) -> Result<(), FrameworkError> {
        Err(FrameworkError::Conflict(format!("region {} can only be deactivated", self.name)))
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), FrameworkError> {
        Ok(())
    }

    fn matches(&self, payload: &ShippingRateCreate) -> bool {
        self.name == payload.name.trim()
    }

    fn on_upsert(&mut self, payload: ShippingRateCreate) -> Result<(), FrameworkError> {
        self.price = require_non_negative("price", payload.price).map_err(|e| FrameworkError::Validation(e.0))?;
        Ok(())
    }
}
