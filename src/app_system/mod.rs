//! System orchestration, configuration, sessions, startup, and shutdown logic.

pub mod config;
pub mod ledger_system;
pub mod session;
pub mod surfaces;
pub mod tracing;

pub use config::*;
pub use ledger_system::*;
pub use session::*;
pub use surfaces::*;
pub use self::tracing::*;
