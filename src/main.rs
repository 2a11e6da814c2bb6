use std::env;

use rust_decimal::Decimal;
use tracing::{error, info, warn, Instrument};
use uuid::Uuid;

use storefront_ledger::app_system::{setup_tracing, Config, LedgerSystem};
use storefront_ledger::domain::{CartLine, CheckoutRequest, ProductCreate};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup tracing once for the entire application
    setup_tracing();

    let mut config = Config::load()?;
    info!(shop = %config.shop_name, "Starting storefront ledger");

    // The demo drives the admin console, so it needs the plaintext password.
    let password = match config.admin_password_hash {
        Some(_) => env::var("LEDGER_ADMIN_PASSWORD")
            .map_err(|_| "LEDGER_ADMIN_PASSWORD is required to run the demo against a configured hash")?,
        None => {
            warn!("Admin password hash not configured, using a one-off demo credential");
            let password = Uuid::new_v4().to_string();
            config.admin_password_hash = Some(bcrypt::hash(&password, bcrypt::DEFAULT_COST)?);
            password
        }
    };

    let system = LedgerSystem::new(&config);
    let session = system.admin.login(&password)?;
    let admin = system.admin.authorize(&session)?;

    // Seed catalog and delivery regions
    let span = tracing::info_span!("seed");
    let (pan, knives) = async {
        for (name, price) in [("Algiers", 400), ("Oran", 600), ("Constantine", 650)] {
            admin.upsert_region(name, Decimal::from(price)).await?;
        }
        let pan = admin
            .create_product(ProductCreate {
                name: "Cast iron pan 28cm".into(),
                old_price: Decimal::from(5200),
                new_price: Decimal::from(4300),
                image_url: "https://cdn.example/pan.jpg".into(),
            })
            .await?;
        let knives = admin
            .create_product(ProductCreate {
                name: "Chef knife set".into(),
                old_price: Decimal::from(3900),
                new_price: Decimal::from(3500),
                image_url: "https://cdn.example/knives.jpg".into(),
            })
            .await?;
        admin.set_featured(pan.clone()).await?;
        Ok::<_, Box<dyn std::error::Error>>((pan, knives))
    }
    .instrument(span)
    .await?;

    // Storefront checkout
    let span = tracing::info_span!("checkout");
    let order_id = async {
        let request = CheckoutRequest {
            customer_name: "Amina Benali".into(),
            phone: "0550 11 12 22".into(),
            address: "12 Rue Didouche Mourad".into(),
            wilaya: "Algiers".into(),
            items: vec![CartLine::new(pan, 1), CartLine::new(knives, 2)],
        };
        system.storefront.place_order(request).await
    }
    .instrument(span)
    .await?;

    // Admin walks the order through its lifecycle
    let span = tracing::info_span!("admin");
    let result = async {
        admin.accept(order_id.clone()).await?;
        admin.ship(order_id.clone()).await?;
        let order = admin.confirm_delivery(order_id.clone()).await?;
        println!("{}", admin.invoice(order_id.clone()).await?);
        Ok::<_, Box<dyn std::error::Error>>(order)
    }
    .instrument(span)
    .await;

    match result {
        Ok(order) => {
            info!(order_id = %order.id, status = %order.status, total = %order.total_amount, "Order delivered");
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
        Err(e) => error!(error = %e, "Order processing failed"),
    }

    for customer in admin.customers().await? {
        let label = admin.reliability(&customer);
        info!(customer_id = %customer.id, phone = %customer.phone, reliability = %label, "Customer");
    }
    println!("{}", serde_json::to_string_pretty(&admin.stats().await?)?);

    drop(admin);
    system.admin.logout(&session);

    // Shutdown system gracefully
    system.shutdown().await?;

    info!("Storefront ledger completed successfully");
    Ok(())
}
