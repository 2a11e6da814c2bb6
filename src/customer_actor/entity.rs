use chrono::Utc;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{Customer, CustomerCreate, CustomerPatch};
use super::actions::CustomerAction;

impl Entity for Customer {
    type Id = String;
    type CreatePayload = CustomerCreate;
    type Patch = CustomerPatch;
    type Action = CustomerAction;
    type ActionResult = Customer;

    fn id(&self) -> &String { &self.id }

    /// A first order registers the customer with a clean record.
    fn from_create(id: String, payload: CustomerCreate) -> Result<Self, FrameworkError> {
        let now = Utc::now();
        Ok(Self {
            id,
            phone: payload.phone,
            name: payload.name,
            address: payload.address,
            total_orders: 1,
            delivered_orders: 0,
            warnings: 0,
            is_reliable: true,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, patch: CustomerPatch) -> Result<(), FrameworkError> {
        if let Some(name) = patch.name {
            self.name = non_blank("name", name)?;
        }
        if let Some(address) = patch.address {
            self.address = non_blank("address", address)?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }

    fn handle_action(&mut self, action: CustomerAction) -> Result<Customer, FrameworkError> {
        match action {
            CustomerAction::ApplyOutcome { outcome, policy } => {
                self.record_outcome(outcome, &policy);
            }
            CustomerAction::RetractOrder => {
                if self.total_orders == 0 {
                    return Err(FrameworkError::Conflict(format!("customer {} has no orders to retract", self.id)));
                }
                self.total_orders -= 1;
                self.updated_at = Utc::now();
            }
        }
        Ok(self.clone())
    }

    fn matches(&self, payload: &CustomerCreate) -> bool {
        self.phone == payload.phone
    }

    /// A returning customer keeps their stored name and address.
    fn on_upsert(&mut self, _payload: CustomerCreate) -> Result<(), FrameworkError> {
        self.total_orders += 1;
        self.updated_at = Utc::now();
        Ok(())
    }
}

fn non_blank(field: &str, value: String) -> Result<String, FrameworkError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FrameworkError::Validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
