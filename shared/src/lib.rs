//! Shared types for the laundry ops platform
//!
//! Domain types used by the lifecycle engine and its consumers (POS
//! screens, branch dashboards): the order document, the status registry,
//! commands, events, and the transfer/payment/driver models.

pub mod models;
pub mod order;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use order::{
    CommandError, CommandErrorCode, CommandResponse, EventPayload, Order, OrderCommand,
    OrderCommandPayload, OrderEvent, OrderEventType, OrderStatus, WorkstationStage,
};
