use tracing::{error, info, instrument, warn};

use crate::actor_framework::{Filter, ResourceClient};
use crate::clients::{CustomerClient, ProductClient, ShippingClient};
use crate::domain::{
    render_invoice, require_text, CheckoutRequest, DeliveryOutcome, Order, OrderCreate, OrderEvent, OrderItem,
    OrderStats, OrderStatus,
};
use crate::order_actor::{OrderAction, OrderError};

/// Client for the order lifecycle.
///
/// Checkout orchestrates the catalog, the rate table and the customer
/// registry before the order and its items are written in one request.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    customer_client: CustomerClient,
    product_client: ProductClient,
    shipping_client: ShippingClient,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        customer_client: CustomerClient,
        product_client: ProductClient,
        shipping_client: ShippingClient,
    ) -> Self {
        Self {
            inner,
            customer_client,
            product_client,
            shipping_client,
        }
    }

    /// Places a cash-on-delivery order and returns its id.
    ///
    /// Nothing is persisted when validation fails. If the order write fails
    /// after the customer was upserted, the customer's order count is retracted.
    #[instrument(skip(self, request), fields(wilaya = %request.wilaya, lines = request.items.len()))]
    pub async fn create_order(&self, request: CheckoutRequest) -> Result<String, OrderError> {
        info!("Processing create_order request");

        // Step 1: Validate the checkout form
        let customer_name = require_text("customer name", &request.customer_name)?;
        let address = require_text("address", &request.address)?;
        let wilaya = require_text("wilaya", &request.wilaya)?;
        let phone = self.customer_client.normalize_phone(&request.phone)?;
        if request.items.is_empty() {
            return Err(OrderError::ValidationError("cart is empty".into()));
        }
        if let Some(line) = request.items.iter().find(|line| line.quantity == 0) {
            return Err(OrderError::ValidationError(format!(
                "quantity for {} must be at least 1",
                line.product_id
            )));
        }

        // Step 2: Snapshot names and prices from the catalog
        let mut items = Vec::with_capacity(request.items.len());
        for line in &request.items {
            let product = self
                .product_client
                .get_product(line.product_id.clone())
                .await?
                .ok_or_else(|| OrderError::NotFound(format!("product {}", line.product_id)))?;
            items.push(OrderItem {
                product_id: product.id,
                product_name: product.name,
                price: product.new_price,
                quantity: line.quantity,
            });
        }

        // Step 3: Price the delivery
        let delivery_price = self.shipping_client.price_for(wilaya).await?;

        // Step 4: Register the order against the customer
        let customer_id = self.customer_client.register(phone.clone(), customer_name, address).await?;

        // Step 5: Write order and items together
        let payload = OrderCreate {
            customer_id: customer_id.clone(),
            customer_name: customer_name.to_string(),
            phone,
            address: address.to_string(),
            wilaya: wilaya.to_string(),
            items,
            delivery_price,
        };
        match self.inner.create(payload).await {
            Ok(order_id) => {
                info!(order_id = %order_id, customer_id = %customer_id, "Order created");
                Ok(order_id)
            }
            Err(e) => {
                error!(error = %e, customer_id = %customer_id, "Order write failed, retracting customer order count");
                if let Err(retract_err) = self.customer_client.retract_order(customer_id).await {
                    error!(error = %retract_err, "Retraction failed, customer total_orders is off by one");
                }
                Err(e.into())
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn accept(&self, id: String) -> Result<Order, OrderError> {
        self.transition(id, OrderEvent::Accept).await
    }

    /// Rejects a pending order. The reason is stored verbatim and must not be blank.
    #[instrument(skip(self))]
    pub async fn reject(&self, id: String, reason: String) -> Result<Order, OrderError> {
        if reason.trim().is_empty() {
            return Err(OrderError::ValidationError("rejection reason is required".into()));
        }
        self.transition(id, OrderEvent::Reject { reason }).await
    }

    #[instrument(skip(self))]
    pub async fn ship(&self, id: String) -> Result<Order, OrderError> {
        self.transition(id, OrderEvent::Ship).await
    }

    /// Marks a shipped order delivered and credits the customer.
    #[instrument(skip(self))]
    pub async fn confirm_delivery(&self, id: String) -> Result<Order, OrderError> {
        self.settle(id, OrderEvent::ConfirmDelivery, DeliveryOutcome::Delivered).await
    }

    /// Penalizes the customer of a shipped order. The order stays shipped.
    #[instrument(skip(self))]
    pub async fn report_not_delivered(&self, id: String) -> Result<Order, OrderError> {
        self.settle(id, OrderEvent::ReportNotDelivered, DeliveryOutcome::NotDelivered).await
    }

    async fn transition(&self, id: String, event: OrderEvent) -> Result<Order, OrderError> {
        let event_name = event.to_string();
        let order = self.inner.perform_action(id, OrderAction::Apply(event)).await?;
        info!(order_id = %order.id, event = %event_name, status = %order.status, "Order transitioned");
        Ok(order)
    }

    /// Applies a delivery event and its ledger outcome together.
    ///
    /// The customer is resolved before the order changes. If the ledger update
    /// then fails, the order status is restored so the call can be retried.
    async fn settle(&self, id: String, event: OrderEvent, outcome: DeliveryOutcome) -> Result<Order, OrderError> {
        // Step 1: Check the event against the stored order
        let before = self
            .inner
            .get(id.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(id.clone()))?;
        if before.status.next(&event).is_none() {
            return Err(OrderError::InvalidTransition(format!(
                "cannot {} order {} while it is {}",
                event, before.id, before.status
            )));
        }

        // Step 2: Resolve the customer while nothing has changed yet
        let customer = self.customer_client.find_by_phone(before.phone.as_str()).await?;

        // Step 3: Move the order
        let order = self.transition(id, event).await?;

        // Step 4: Update the ledger, restoring the order on failure
        let Some(customer) = customer else {
            warn!(order_id = %order.id, "Customer no longer exists, outcome dropped");
            return Ok(order);
        };
        match self.customer_client.record_outcome(customer.id, outcome).await {
            Ok(Some(_)) => Ok(order),
            Ok(None) => {
                warn!(order_id = %order.id, "Customer deleted during update, outcome dropped");
                Ok(order)
            }
            Err(e) => {
                error!(order_id = %order.id, error = %e, "Customer ledger was not updated, restoring order");
                if order.status != before.status {
                    let restore = OrderAction::Restore { from: order.status, to: before.status };
                    if let Err(restore_err) = self.inner.perform_action(order.id.clone(), restore).await {
                        error!(order_id = %order.id, error = %restore_err, "Order could not be restored");
                    }
                }
                Err(e.into())
            }
        }
    }

    /// Orders newest first, optionally restricted to one status.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, OrderError> {
        let filter = status.map(|wanted| {
            Box::new(move |o: &Order| o.status == wanted) as Filter<Order>
        });
        let mut orders = self.inner.list(filter).await?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn orders_for_customer(&self, customer_id: String) -> Result<Vec<Order>, OrderError> {
        let mut orders = self
            .inner
            .list(Some(Box::new(move |o: &Order| o.customer_id == customer_id)))
            .await?;
        sort_newest_first(&mut orders);
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn stats(&self) -> Result<OrderStats, OrderError> {
        let orders = self.inner.list(None).await?;
        Ok(OrderStats::from_orders(&orders))
    }

    /// Printable HTML invoice for one order.
    #[instrument(skip(self))]
    pub async fn invoice(&self, id: String, shop_name: &str) -> Result<String, OrderError> {
        let order = self
            .inner
            .get(id.clone())
            .await?
            .ok_or(OrderError::NotFound(id))?;
        Ok(render_invoice(&order, shop_name))
    }
}

fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
