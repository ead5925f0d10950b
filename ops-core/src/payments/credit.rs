//! Customer credit ledger
//!
//! Store credit is debited BEFORE the order write and refunded if the write
//! fails, so the ledger can briefly under-report but never over-report a
//! balance.

use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::lifecycle::money;
use shared::models::CustomerCreditBalance;

/// Credit ledger errors
#[derive(Debug, Error)]
pub enum CreditError {
    #[error("Insufficient credit for customer {customer_id}: requested {requested:.2}, available {available:.2}")]
    Insufficient {
        customer_id: String,
        requested: f64,
        available: f64,
    },

    #[error("Invalid credit amount: {0}")]
    InvalidAmount(f64),
}

/// Customer store-credit balances
#[async_trait]
pub trait CreditLedger: Send + Sync {
    async fn balance(&self, customer_id: &str) -> f64;

    /// Withdraw credit; fails without mutation when the balance is short
    async fn debit(&self, customer_id: &str, amount: f64) -> Result<(), CreditError>;

    /// Top up (or refund) credit
    async fn credit(&self, customer_id: &str, amount: f64) -> Result<(), CreditError>;
}

/// In-memory ledger
#[derive(Debug, Default)]
pub struct InMemoryCreditLedger {
    balances: DashMap<String, CustomerCreditBalance>,
}

impl InMemoryCreditLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

fn validate(amount: f64) -> Result<(), CreditError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(CreditError::InvalidAmount(amount));
    }
    Ok(())
}

#[async_trait]
impl CreditLedger for InMemoryCreditLedger {
    async fn balance(&self, customer_id: &str) -> f64 {
        self.balances
            .get(customer_id)
            .map(|b| b.balance)
            .unwrap_or(0.0)
    }

    async fn debit(&self, customer_id: &str, amount: f64) -> Result<(), CreditError> {
        validate(amount)?;
        let mut entry = self
            .balances
            .get_mut(customer_id)
            .ok_or_else(|| CreditError::Insufficient {
                customer_id: customer_id.to_string(),
                requested: amount,
                available: 0.0,
            })?;
        if entry.balance < amount {
            return Err(CreditError::Insufficient {
                customer_id: customer_id.to_string(),
                requested: amount,
                available: entry.balance,
            });
        }
        entry.balance = money::to_f64(money::to_decimal(entry.balance) - money::to_decimal(amount));
        entry.updated_at = shared::util::now_millis();
        Ok(())
    }

    async fn credit(&self, customer_id: &str, amount: f64) -> Result<(), CreditError> {
        validate(amount)?;
        let mut entry = self
            .balances
            .entry(customer_id.to_string())
            .or_insert_with(|| CustomerCreditBalance {
                customer_id: customer_id.to_string(),
                balance: 0.0,
                updated_at: shared::util::now_millis(),
            });
        entry.balance = money::add_paid(entry.balance, amount);
        entry.updated_at = shared::util::now_millis();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_debit_requires_sufficient_balance() {
        let ledger = InMemoryCreditLedger::new();
        ledger.credit("cust-1", 500.0).await.unwrap();

        ledger.debit("cust-1", 300.0).await.unwrap();
        assert_eq!(ledger.balance("cust-1").await, 200.0);

        let result = ledger.debit("cust-1", 300.0).await;
        assert!(matches!(result, Err(CreditError::Insufficient { .. })));
        // Failed debit leaves the balance alone
        assert_eq!(ledger.balance("cust-1").await, 200.0);
    }

    #[tokio::test]
    async fn test_unknown_customer_has_zero_balance() {
        let ledger = InMemoryCreditLedger::new();
        assert_eq!(ledger.balance("nobody").await, 0.0);
        assert!(ledger.debit("nobody", 1.0).await.is_err());
    }

    #[tokio::test]
    async fn test_refund_restores_balance() {
        let ledger = InMemoryCreditLedger::new();
        ledger.credit("cust-1", 100.0).await.unwrap();
        ledger.debit("cust-1", 100.0).await.unwrap();
        ledger.credit("cust-1", 100.0).await.unwrap();
        assert_eq!(ledger.balance("cust-1").await, 100.0);
    }

    #[tokio::test]
    async fn test_non_positive_amounts_rejected() {
        let ledger = InMemoryCreditLedger::new();
        assert!(ledger.credit("cust-1", 0.0).await.is_err());
        assert!(ledger.credit("cust-1", -10.0).await.is_err());
    }
}
