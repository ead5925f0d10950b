//! Command handler traits and errors

use async_trait::async_trait;
use shared::order::{Order, OrderEvent, OrderStatus};
use thiserror::Error;

/// Metadata extracted from the triggering command
#[derive(Debug, Clone)]
pub struct CommandMetadata {
    pub command_id: String,
    pub actor_id: String,
    pub actor_name: String,
    /// Client timestamp (audit only)
    pub timestamp: i64,
}

/// A command handler mutates a working copy of the order document and
/// returns the events to broadcast once the write commits.
///
/// Handlers never see the store: the manager loads the document, runs the
/// handler, and compare-and-swaps the result. On any error the working
/// copy is discarded, so a failed handler mutates nothing.
#[async_trait]
pub trait CommandHandler {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError>;
}

/// Domain errors raised by command handlers
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Invalid transition: {from} -> {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    #[error("Invalid amount")]
    InvalidAmount,

    #[error("Payment amount ({amount:.2}) exceeds outstanding balance ({outstanding:.2})")]
    AmountExceedsBalance { amount: f64, outstanding: f64 },

    #[error("Not assigned: {0}")]
    NotAssigned(String),

    #[error("Already completed: {0}")]
    AlreadyCompleted(String),

    #[error("Missing contact: {0}")]
    MissingContact(String),

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}
