use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductError};

/// Client for the product catalog.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    #[instrument(skip(self))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<String, ProductError> {
        debug!("Sending request");
        let id = self.inner.create(product).await?;
        info!(product_id = %id, "Product created");
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }

    /// Storefront order: the featured product first, then newest first.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        let mut products = self.inner.list(None).await?;
        products.sort_by(|a, b| {
            b.is_featured
                .cmp(&a.is_featured)
                .then_with(|| b.created_at.cmp(&a.created_at))
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn featured_product(&self) -> Result<Option<Product>, ProductError> {
        let mut featured = self.inner.list(Some(Box::new(|p: &Product| p.is_featured))).await?;
        Ok(featured.pop())
    }

    /// Features `id` and unfeatures every other product.
    #[instrument(skip(self))]
    pub async fn set_featured(&self, id: String) -> Result<Product, ProductError> {
        if self.inner.get(id.clone()).await?.is_none() {
            return Err(ProductError::NotFound(id));
        }

        let keep = id.clone();
        let others = self
            .inner
            .list(Some(Box::new(move |p: &Product| p.is_featured && p.id != keep)))
            .await?;
        for other in others {
            debug!(product_id = %other.id, "Clearing previous highlight");
            self.inner.perform_action(other.id, ProductAction::Unfeature).await?;
        }

        let product = self.inner.perform_action(id, ProductAction::Feature).await?;
        info!(product_id = %product.id, "Product featured");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn unfeature(&self, id: String) -> Result<Product, ProductError> {
        Ok(self.inner.perform_action(id, ProductAction::Unfeature).await?)
    }
}
