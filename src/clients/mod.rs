//! Typed handles over the stores. Each client validates input, talks to its
//! store and converts store failures into its component error.

#[macro_use]
mod macros;

pub mod customer_client;
pub mod order_client;
pub mod product_client;
pub mod shipping_client;

pub use customer_client::CustomerClient;
pub use order_client::OrderClient;
pub use product_client::ProductClient;
pub use shipping_client::ShippingClient;
