//! Order lifecycle engine
//!
//! Layout:
//! - `traits`: command handler contract and domain errors
//! - `actions`: one handler per command
//! - `manager`: the pipeline (idempotency, load, handler, CAS, broadcast)
//! - `store`: versioned in-memory document store
//! - `money`: decimal-backed monetary arithmetic

pub mod actions;
pub mod manager;
pub mod money;
pub mod store;
pub mod traits;

pub use manager::{ManagerError, OrderLifecycleManager};
pub use store::{OrderStore, StoreError};
pub use traits::{CommandHandler, CommandMetadata, OrderError};
