//! Payment gateway abstraction
//!
//! Mobile-money and card payments hand off to an external provider and
//! settle asynchronously: initiation returns a redirect reference, then the
//! poller asks for status until the provider confirms or the window closes.

use async_trait::async_trait;
use thiserror::Error;

use shared::models::PaymentMethod;

/// Gateway call failures
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Gateway rejected the request: {0}")]
    Rejected(String),

    #[error("Gateway unreachable: {0}")]
    Unreachable(String),

    #[error("Unknown gateway transaction: {0}")]
    UnknownTransaction(String),
}

/// Handoff returned by a successful initiation
#[derive(Debug, Clone)]
pub struct GatewayHandoff {
    /// Gateway-side transaction reference
    pub transaction_id: String,
    /// Reference the customer is redirected with (USSD prompt id, card
    /// checkout URL, ...)
    pub redirect_reference: String,
}

/// Provider-side transaction status
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayPaymentStatus {
    Pending,
    Completed,
    Failed { reason: Option<String> },
}

/// A payment provider integration
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Start a payment; the customer confirms out-of-band
    async fn initiate(
        &self,
        method: PaymentMethod,
        amount: f64,
        phone: Option<&str>,
    ) -> Result<GatewayHandoff, GatewayError>;

    /// Ask the provider for the current status of a transaction
    async fn check_status(
        &self,
        transaction_id: &str,
    ) -> Result<GatewayPaymentStatus, GatewayError>;
}
