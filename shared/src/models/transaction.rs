//! Payment transaction model

use serde::{Deserialize, Serialize};

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    /// Customer store-credit balance
    Credit,
}

impl PaymentMethod {
    /// Gateway methods settle asynchronously via status confirmation
    pub fn is_gateway(self) -> bool {
        matches!(self, PaymentMethod::MobileMoney | PaymentMethod::Card)
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "CASH"),
            PaymentMethod::MobileMoney => write!(f, "MOBILE_MONEY"),
            PaymentMethod::Card => write!(f, "CARD"),
            PaymentMethod::Credit => write!(f, "CREDIT"),
        }
    }
}

/// Transaction status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

/// A payment transaction, owned by the order it settles.
///
/// Many transactions may exist per order (partial payments). Only
/// completed transactions count toward `paid_amount`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub transaction_id: String,
    pub order_id: String,
    pub customer_id: String,
    pub amount: f64,
    pub method: PaymentMethod,
    pub status: TransactionStatus,
    pub timestamp: i64,
    /// Cash tendered (cash payments only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tendered: Option<f64>,
    /// Change returned (cash payments only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<f64>,
    /// Gateway redirect/handoff reference (async payments only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
