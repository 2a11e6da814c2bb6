//! The two entry points the UIs talk to: the public storefront and the
//! session-gated admin console.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::instrument;

use crate::app_system::session::{AdminSession, AuthError, SessionAuthority};
use crate::clients::{CustomerClient, OrderClient, ProductClient, ShippingClient};
use crate::customer_actor::CustomerError;
use crate::domain::{
    CheckoutRequest, Customer, CustomerPatch, Order, OrderStats, OrderStatus, Product, ProductCreate, ProductPatch,
    RateSheet, Reliability, ShippingRate,
};
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::shipping_actor::ShippingError;

/// Public, unauthenticated operations.
#[derive(Clone)]
pub struct Storefront {
    orders: OrderClient,
    products: ProductClient,
    shipping: ShippingClient,
}

impl Storefront {
    pub(crate) fn new(orders: OrderClient, products: ProductClient, shipping: ShippingClient) -> Self {
        Self { orders, products, shipping }
    }

    pub async fn products(&self) -> Result<Vec<Product>, ProductError> {
        self.products.list_products().await
    }

    pub async fn featured_product(&self) -> Result<Option<Product>, ProductError> {
        self.products.featured_product().await
    }

    /// Regions offered at checkout.
    pub async fn regions(&self) -> Result<Vec<ShippingRate>, ShippingError> {
        self.shipping.list_regions(true).await
    }

    pub async fn quote_delivery(&self, wilaya: &str) -> Result<Decimal, ShippingError> {
        self.shipping.price_for(wilaya).await
    }

    #[instrument(skip(self, request))]
    pub async fn place_order(&self, request: CheckoutRequest) -> Result<String, OrderError> {
        self.orders.create_order(request).await
    }
}

/// Admin operations. Every call goes through [`AdminConsole::authorize`].
pub struct AdminConsole {
    authority: SessionAuthority,
    orders: OrderClient,
    customers: CustomerClient,
    products: ProductClient,
    shipping: ShippingClient,
    shop_name: String,
}

impl AdminConsole {
    pub(crate) fn new(
        authority: SessionAuthority,
        orders: OrderClient,
        customers: CustomerClient,
        products: ProductClient,
        shipping: ShippingClient,
        shop_name: impl Into<String>,
    ) -> Self {
        Self {
            authority,
            orders,
            customers,
            products,
            shipping,
            shop_name: shop_name.into(),
        }
    }

    pub fn login(&self, password: &str) -> Result<AdminSession, AuthError> {
        self.authority.login(password)
    }

    pub fn logout(&self, session: &AdminSession) {
        self.authority.logout(session)
    }

    /// Validates `session` and returns the admin operations bound to it.
    pub fn authorize<'a>(&'a self, session: &'a AdminSession) -> Result<AdminScope<'a>, AuthError> {
        self.authority.validate(session)?;
        Ok(AdminScope { console: self, session })
    }
}

/// Failure of an admin operation: the session check or the operation itself.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum AdminError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error(transparent)]
    Customer(#[from] CustomerError),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Shipping(#[from] ShippingError),
}

/// Admin operations for one session. Every call re-validates the session, so
/// a scope stops working as soon as its session is logged out or expires.
pub struct AdminScope<'a> {
    console: &'a AdminConsole,
    session: &'a AdminSession,
}

impl AdminScope<'_> {
    fn check(&self) -> Result<(), AdminError> {
        Ok(self.console.authority.validate(self.session)?)
    }

    // --- Orders ---

    pub async fn order(&self, id: String) -> Result<Option<Order>, AdminError> {
        self.check()?;
        Ok(self.console.orders.get_order(id).await?)
    }

    pub async fn orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AdminError> {
        self.check()?;
        Ok(self.console.orders.list_orders(status).await?)
    }

    pub async fn orders_for_customer(&self, customer_id: String) -> Result<Vec<Order>, AdminError> {
        self.check()?;
        Ok(self.console.orders.orders_for_customer(customer_id).await?)
    }

    #[instrument(skip(self))]
    pub async fn accept(&self, id: String) -> Result<Order, AdminError> {
        self.check()?;
        Ok(self.console.orders.accept(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn reject(&self, id: String, reason: String) -> Result<Order, AdminError> {
        self.check()?;
        Ok(self.console.orders.reject(id, reason).await?)
    }

    #[instrument(skip(self))]
    pub async fn ship(&self, id: String) -> Result<Order, AdminError> {
        self.check()?;
        Ok(self.console.orders.ship(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn confirm_delivery(&self, id: String) -> Result<Order, AdminError> {
        self.check()?;
        Ok(self.console.orders.confirm_delivery(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn report_not_delivered(&self, id: String) -> Result<Order, AdminError> {
        self.check()?;
        Ok(self.console.orders.report_not_delivered(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: String) -> Result<(), AdminError> {
        self.check()?;
        Ok(self.console.orders.delete_order(id).await?)
    }

    pub async fn stats(&self) -> Result<OrderStats, AdminError> {
        self.check()?;
        Ok(self.console.orders.stats().await?)
    }

    pub async fn invoice(&self, order_id: String) -> Result<String, AdminError> {
        self.check()?;
        Ok(self.console.orders.invoice(order_id, &self.console.shop_name).await?)
    }

    // --- Customers ---

    pub async fn customers(&self) -> Result<Vec<Customer>, AdminError> {
        self.check()?;
        Ok(self.console.customers.list_customers().await?)
    }

    pub async fn customer(&self, id: String) -> Result<Option<Customer>, AdminError> {
        self.check()?;
        Ok(self.console.customers.get_customer(id).await?)
    }

    pub async fn find_customer(&self, phone: &str) -> Result<Option<Customer>, AdminError> {
        self.check()?;
        Ok(self.console.customers.find_by_phone(phone).await?)
    }

    /// Display label for `customer`.
    pub fn reliability(&self, customer: &Customer) -> Reliability {
        self.console.customers.reliability(customer)
    }

    #[instrument(skip(self))]
    pub async fn update_customer(&self, id: String, patch: CustomerPatch) -> Result<Customer, AdminError> {
        self.check()?;
        Ok(self.console.customers.update_customer(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: String) -> Result<(), AdminError> {
        self.check()?;
        Ok(self.console.customers.delete_customer(id).await?)
    }

    // --- Products ---

    pub async fn products(&self) -> Result<Vec<Product>, AdminError> {
        self.check()?;
        Ok(self.console.products.list_products().await?)
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, product: ProductCreate) -> Result<String, AdminError> {
        self.check()?;
        Ok(self.console.products.create_product(product).await?)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, AdminError> {
        self.check()?;
        Ok(self.console.products.update_product(id, patch).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: String) -> Result<(), AdminError> {
        self.check()?;
        Ok(self.console.products.delete_product(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_featured(&self, id: String) -> Result<Product, AdminError> {
        self.check()?;
        Ok(self.console.products.set_featured(id).await?)
    }

    #[instrument(skip(self))]
    pub async fn unfeature(&self, id: String) -> Result<Product, AdminError> {
        self.check()?;
        Ok(self.console.products.unfeature(id).await?)
    }

    // --- Shipping ---

    pub async fn regions(&self) -> Result<Vec<ShippingRate>, AdminError> {
        self.check()?;
        Ok(self.console.shipping.list_regions(false).await?)
    }

    #[instrument(skip(self))]
    pub async fn upsert_region(&self, name: &str, price: Decimal) -> Result<String, AdminError> {
        self.check()?;
        Ok(self.console.shipping.upsert_region(name, price).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_rate(&self, region: &str, price: Decimal) -> Result<ShippingRate, AdminError> {
        self.check()?;
        Ok(self.console.shipping.set_rate(region, price).await?)
    }

    #[instrument(skip(self))]
    pub async fn set_active(&self, region: &str, active: bool) -> Result<ShippingRate, AdminError> {
        self.check()?;
        Ok(self.console.shipping.set_active(region, active).await?)
    }

    pub async fn rate_sheet(&self) -> Result<RateSheet, AdminError> {
        self.check()?;
        Ok(self.console.shipping.rate_sheet().await?)
    }

    #[instrument(skip(self, sheet))]
    pub async fn save_rate_sheet(&self, sheet: &RateSheet) -> Result<usize, AdminError> {
        self.check()?;
        Ok(self.console.shipping.save_rate_sheet(sheet).await?)
    }
}
