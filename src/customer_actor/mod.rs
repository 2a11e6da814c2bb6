//! Customer registry store: phone-keyed upsert and the reliability ledger.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
