//! # Storefront Ledger
//!
//! Order lifecycle and customer-reliability ledger for a cash-on-delivery
//! kitchenware storefront and its admin dashboard.
//!
//! - **Stores** - one [`actor_framework::ResourceActor`] per table (customers, products, wilayas, orders)
//! - **Clients** - typed handles that validate input and orchestrate stores → [`clients::OrderClient`]
//! - **Surfaces** - [`app_system::Storefront`] for checkout, [`app_system::AdminConsole`] behind admin sessions
//! - **System** - [`app_system::LedgerSystem`] wires everything together and shuts it down
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use storefront_ledger::app_system::{Config, LedgerSystem};
//!
//! let system = LedgerSystem::new(&Config::load()?);
//! let regions = system.storefront.regions().await?;
//! println!("{} regions open for delivery", regions.len());
//! system.shutdown().await?;
//! # Ok(()) }
//! ```

pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod customer_actor;
pub mod domain;
pub mod order_actor;
pub mod product_actor;
pub mod shipping_actor;

#[cfg(test)]
mod mock_framework;
#[cfg(test)]
mod integration_tests;
