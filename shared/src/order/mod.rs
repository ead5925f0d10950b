//! Order lifecycle types
//!
//! This module provides the types for the order lifecycle engine:
//! - Status registry: the valid-transition table and display metadata
//! - Commands: requests from POS/API callers to mutate an order
//! - Events: immutable facts broadcast on the change feed
//! - Document: the order aggregate persisted in the versioned store

pub mod command;
pub mod document;
pub mod event;
pub mod status;
pub mod types;

// Re-exports
pub use command::{OrderCommand, OrderCommandPayload};
pub use document::{Order, PaymentStatus};
pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use status::{OrderStatus, StatusMeta, WorkstationStage};
pub use types::*;
