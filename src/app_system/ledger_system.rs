use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::actor_framework::{Entity, ResourceActor, ResourceClient};
use crate::app_system::config::Config;
use crate::app_system::session::SessionAuthority;
use crate::app_system::surfaces::{AdminConsole, Storefront};
use crate::clients::{CustomerClient, OrderClient, ProductClient, ShippingClient};
use crate::domain::{Customer, Order, Product, ShippingRate};

/// The whole ledger: one store per table, the clients wired on top of them,
/// and the storefront and admin entry points.
///
/// Only the two entry points are public; admin operations need a session.
///
/// Responsible for starting up stores, wiring them together, and handling shutdown.
pub struct LedgerSystem {
    pub(crate) order_client: OrderClient,
    pub(crate) customer_client: CustomerClient,
    pub(crate) product_client: ProductClient,
    pub(crate) shipping_client: ShippingClient,
    pub storefront: Storefront,
    pub admin: AdminConsole,
    handles: Vec<JoinHandle<()>>,
}

impl LedgerSystem {
    /// Starts every store. Must be called inside a tokio runtime.
    pub fn new(config: &Config) -> Self {
        info!("Starting ledger system");
        let mut handles = Vec::with_capacity(4);

        // 1. Customer registry
        let customers = spawn_store::<Customer>("customers", "customer", config.channel_buffer, &mut handles);
        let customer_client = CustomerClient::new(customers, config.country_code.clone(), config.reliability);

        // 2. Product catalog
        let products = spawn_store::<Product>("products", "product", config.channel_buffer, &mut handles);
        let product_client = ProductClient::new(products);

        // 3. Shipping rate table
        let rates = spawn_store::<ShippingRate>("wilayas", "wilaya", config.channel_buffer, &mut handles);
        let shipping_client = ShippingClient::new(rates, config.default_delivery_price);

        // 4. Orders, orchestrating the three above
        let orders = spawn_store::<Order>("orders", "order", config.channel_buffer, &mut handles);
        let order_client = OrderClient::new(
            orders,
            customer_client.clone(),
            product_client.clone(),
            shipping_client.clone(),
        );

        let storefront = Storefront::new(order_client.clone(), product_client.clone(), shipping_client.clone());
        let admin = AdminConsole::new(
            SessionAuthority::new(config.admin_password_hash.clone(), config.session_ttl_minutes),
            order_client.clone(),
            customer_client.clone(),
            product_client.clone(),
            shipping_client.clone(),
            config.shop_name.clone(),
        );

        Self {
            order_client,
            customer_client,
            product_client,
            shipping_client,
            storefront,
            admin,
            handles,
        }
    }

    /// Drops every client, which closes the store channels, then waits for
    /// each store to drain.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down ledger system...");
        let LedgerSystem {
            order_client,
            customer_client,
            product_client,
            shipping_client,
            storefront,
            admin,
            handles,
        } = self;
        drop((order_client, customer_client, product_client, shipping_client, storefront, admin));

        for handle in handles {
            if let Err(e) = handle.await {
                error!("Store task failed: {:?}", e);
                return Err(format!("Store task failed: {:?}", e));
            }
        }

        info!("Ledger system shutdown complete.");
        Ok(())
    }
}

fn spawn_store<T>(
    table: &'static str,
    id_prefix: &'static str,
    buffer_size: usize,
    handles: &mut Vec<JoinHandle<()>>,
) -> ResourceClient<T>
where
    T: Entity<Id = String>,
{
    let counter = Arc::new(AtomicU64::new(1));
    let next_id = move || format!("{}_{}", id_prefix, counter.fetch_add(1, Ordering::SeqCst));
    let (actor, client) = ResourceActor::<T>::new(table, buffer_size, next_id);
    handles.push(tokio::spawn(actor.run()));
    client
}
