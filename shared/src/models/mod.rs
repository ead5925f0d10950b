//! Data models
//!
//! Shared between the lifecycle engine and frontend (via API).

pub mod credit;
pub mod driver;
pub mod transaction;
pub mod transfer_batch;

// Re-exports
pub use credit::*;
pub use driver::*;
pub use transaction::*;
pub use transfer_batch::*;
