//! Order store: the aggregate write of an order and its items, and the
//! status state machine.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
