use chrono::Utc;
use tracing::warn;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{require_non_negative, require_text, InvalidInput, Product, ProductCreate, ProductPatch};
use super::actions::ProductAction;

impl Entity for Product {
    type Id = String;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = Product;

    fn id(&self) -> &String { &self.id }

    /// Creates a new, unfeatured product.
    fn from_create(id: String, payload: ProductCreate) -> Result<Self, FrameworkError> {
        let product = Self {
            id,
            name: require_text("name", &payload.name).map_err(invalid)?.to_string(),
            old_price: require_non_negative("old_price", payload.old_price).map_err(invalid)?,
            new_price: require_non_negative("new_price", payload.new_price).map_err(invalid)?,
            image_url: payload.image_url.trim().to_string(),
            is_featured: false,
            created_at: Utc::now(),
        };
        warn_if_not_discounted(&product);
        Ok(product)
    }

    /// Updates name, prices and image.
    ///
    /// # Fields Updated
    /// - `name`: must not be blank
    /// - `old_price` / `new_price`: must not be negative
    /// - `image_url`: stored as given
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), FrameworkError> {
        if let Some(name) = patch.name {
            self.name = require_text("name", &name).map_err(invalid)?.to_string();
        }
        if let Some(price) = patch.old_price {
            self.old_price = require_non_negative("old_price", price).map_err(invalid)?;
        }
        if let Some(price) = patch.new_price {
            self.new_price = require_non_negative("new_price", price).map_err(invalid)?;
        }
        if let Some(url) = patch.image_url {
            self.image_url = url.trim().to_string();
        }
        warn_if_not_discounted(self);
        Ok(())
    }

    fn handle_action(&mut self, action: ProductAction) -> Result<Product, FrameworkError> {
        self.is_featured = matches!(action, ProductAction::Feature);
        Ok(self.clone())
    }
}

fn invalid(e: InvalidInput) -> FrameworkError {
    FrameworkError::Validation(e.0)
}

// Allowed, but the storefront would show a negative discount.
fn warn_if_not_discounted(product: &Product) {
    if product.new_price > product.old_price {
        warn!(product_id = %product.id, old_price = %product.old_price, new_price = %product.new_price,
            "Selling price is above the reference price");
    }
}
