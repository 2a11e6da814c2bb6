use tracing::{debug, info, instrument, warn};

use crate::actor_framework::{FrameworkError, ResourceClient, Upserted};
use crate::customer_actor::{CustomerAction, CustomerError};
use crate::domain::{
    require_text, Customer, CustomerCreate, CustomerPatch, DeliveryOutcome, PhoneNumber, Reliability,
    ReliabilityPolicy,
};

/// Client for the customer registry.
///
/// Phone numbers are normalized before every lookup and insert, so one human
/// maps to one record whatever format they typed.
#[derive(Clone)]
pub struct CustomerClient {
    inner: ResourceClient<Customer>,
    country_code: String,
    policy: ReliabilityPolicy,
}

impl_client_methods!(CustomerClient, Customer, CustomerError, customer);

impl CustomerClient {
    pub fn new(inner: ResourceClient<Customer>, country_code: impl Into<String>, policy: ReliabilityPolicy) -> Self {
        Self {
            inner,
            country_code: country_code.into(),
            policy,
        }
    }

    pub fn normalize_phone(&self, raw: &str) -> Result<PhoneNumber, CustomerError> {
        Ok(PhoneNumber::parse(raw, &self.country_code)?)
    }

    pub fn policy(&self) -> &ReliabilityPolicy {
        &self.policy
    }

    /// Display label for `customer`, computed the same way everywhere.
    pub fn reliability(&self, customer: &Customer) -> Reliability {
        customer.reliability(&self.policy)
    }

    /// Registers an order for the customer owning `phone`.
    ///
    /// An existing customer gets `total_orders += 1`; otherwise a new record is
    /// created with one order and a clean history. Returns the customer id.
    #[instrument(skip(self, name, address))]
    pub async fn upsert(&self, phone: &str, name: &str, address: &str) -> Result<String, CustomerError> {
        let phone = self.normalize_phone(phone)?;
        self.register(phone, name, address).await
    }

    pub(crate) async fn register(&self, phone: PhoneNumber, name: &str, address: &str) -> Result<String, CustomerError> {
        let payload = CustomerCreate {
            phone,
            name: require_text("name", name)?.to_string(),
            address: require_text("address", address)?.to_string(),
        };
        debug!("Sending request");
        match self.inner.upsert(payload).await? {
            Upserted::Created(id) => {
                info!(customer_id = %id, "New customer registered");
                Ok(id)
            }
            Upserted::Matched(id) => {
                debug!(customer_id = %id, "Returning customer");
                Ok(id)
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn find_by_phone(&self, phone: &str) -> Result<Option<Customer>, CustomerError> {
        let phone = self.normalize_phone(phone)?;
        let mut matches = self.inner.list(Some(Box::new(move |c: &Customer| c.phone == phone))).await?;
        Ok(matches.pop())
    }

    /// Records a delivery outcome for the customer owning `phone`.
    ///
    /// Returns `Ok(None)` without changing anything when no such customer
    /// exists; callers must not assume the update happened.
    #[instrument(skip(self))]
    pub async fn apply_delivery_outcome(
        &self,
        phone: &str,
        outcome: DeliveryOutcome,
    ) -> Result<Option<Customer>, CustomerError> {
        let customer = match self.find_by_phone(phone).await {
            Ok(Some(customer)) => customer,
            Ok(None) | Err(CustomerError::ValidationError(_)) => {
                warn!("No customer for phone, outcome not recorded");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        self.record_outcome(customer.id, outcome).await
    }

    /// Records a delivery outcome against customer `id`. A customer deleted
    /// in the meantime yields `Ok(None)`.
    pub(crate) async fn record_outcome(
        &self,
        id: String,
        outcome: DeliveryOutcome,
    ) -> Result<Option<Customer>, CustomerError> {
        let action = CustomerAction::ApplyOutcome { outcome, policy: self.policy };
        match self.inner.perform_action(id, action).await {
            Ok(updated) => {
                info!(
                    customer_id = %updated.id,
                    delivered_orders = updated.delivered_orders,
                    warnings = updated.warnings,
                    reliability = %self.reliability(&updated),
                    "Delivery outcome recorded"
                );
                Ok(Some(updated))
            }
            Err(FrameworkError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Compensates an upsert whose order could not be stored.
    #[instrument(skip(self))]
    pub async fn retract_order(&self, id: String) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        Ok(self.inner.perform_action(id, CustomerAction::RetractOrder).await?)
    }

    /// All customers, newest first.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, CustomerError> {
        let mut customers = self.inner.list(None).await?;
        customers.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
        Ok(customers)
    }

    #[instrument(skip(self))]
    pub async fn update_customer(&self, id: String, patch: CustomerPatch) -> Result<Customer, CustomerError> {
        debug!("Sending request");
        Ok(self.inner.update(id, patch).await?)
    }
}
