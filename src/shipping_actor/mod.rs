//! Shipping rate store, one row per wilaya.

pub mod entity;
pub mod error;

pub use error::*;
