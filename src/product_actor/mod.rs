//! Product catalog store, including the featured-product flag.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
