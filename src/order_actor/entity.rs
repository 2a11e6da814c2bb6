use chrono::Utc;

use crate::actor_framework::{Entity, FrameworkError};
use crate::domain::{subtotal, Order, OrderCreate, OrderEvent, OrderStatus};
use super::actions::OrderAction;

impl Entity for Order {
    type Id = String;
    type CreatePayload = OrderCreate;
    type Patch = (); // Orders change only through events
    type Action = OrderAction;
    type ActionResult = Order;

    fn id(&self) -> &String { &self.id }

    /// Builds the order with its items in one write and fixes the total.
    ///
    /// # Notes
    /// `total_amount` is computed here once and never recomputed, so later
    /// price or rate changes do not touch existing orders.
    fn from_create(id: String, payload: OrderCreate) -> Result<Self, FrameworkError> {
        if payload.items.is_empty() {
            return Err(FrameworkError::Validation("order has no items".into()));
        }
        if let Some(item) = payload.items.iter().find(|item| item.quantity == 0) {
            return Err(FrameworkError::Validation(format!("quantity for {} must be at least 1", item.product_id)));
        }

        let total_amount = subtotal(&payload.items) + payload.delivery_price;
        let now = Utc::now();
        Ok(Self {
            id,
            customer_id: payload.customer_id,
            customer_name: payload.customer_name,
            phone: payload.phone,
            address: payload.address,
            wilaya: payload.wilaya,
            items: payload.items,
            delivery_price: payload.delivery_price,
            total_amount,
            status: OrderStatus::Pending,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        })
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), FrameworkError> {
        Ok(())
    }

    /// Only finished orders can be removed; the items go with the order.
    fn on_delete(&self) -> Result<(), FrameworkError> {
        if !self.status.is_terminal() {
            return Err(FrameworkError::Conflict(format!(
                "order {} is {}; only delivered or rejected orders can be deleted",
                self.id, self.status
            )));
        }
        Ok(())
    }

    /// Applies one lifecycle event, or restores a status.
    ///
    /// # Errors
    /// `Conflict` when the event is not allowed from the current status or the
    /// status moved on before a restore, `Validation` when a rejection has a
    /// blank reason.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, FrameworkError> {
        let event = match action {
            OrderAction::Apply(event) => event,
            OrderAction::Restore { from, to } => {
                if self.status != from {
                    return Err(FrameworkError::Conflict(format!(
                        "order {} is {}, not {}; restore to {} skipped",
                        self.id, self.status, from, to
                    )));
                }
                self.status = to;
                self.updated_at = Utc::now();
                return Ok(self.clone());
            }
        };

        let next = self.status.next(&event).ok_or_else(|| {
            FrameworkError::Conflict(format!("cannot {} order {} while it is {}", event, self.id, self.status))
        })?;

        if let OrderEvent::Reject { reason } = event {
            if reason.trim().is_empty() {
                return Err(FrameworkError::Validation("rejection reason is required".into()));
            }
            self.rejection_reason = Some(reason);
        }

        self.status = next;
        self.updated_at = Utc::now();
        Ok(self.clone())
    }
}
