//! SettleGatewayPayment command handler
//!
//! Second half of the asynchronous gateway flow: flips a pending
//! transaction to COMPLETED and credits `paid_amount`. Settling an
//! already-completed transaction is a no-op so gateway confirmation
//! retries are safe.

use async_trait::async_trait;

use crate::lifecycle::money;
use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::models::TransactionStatus;
use shared::order::{EventPayload, Order, OrderEvent, OrderEventType};

/// SettleGatewayPayment action
#[derive(Debug, Clone)]
pub struct SettleGatewayPaymentAction {
    pub order_id: String,
    pub transaction_id: String,
}

#[async_trait]
impl CommandHandler for SettleGatewayPaymentAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let txn = order
            .transaction(&self.transaction_id)
            .ok_or_else(|| OrderError::TransactionNotFound(self.transaction_id.clone()))?;

        match txn.status {
            TransactionStatus::Completed => {
                tracing::debug!(
                    order_id = %order.order_id,
                    transaction_id = %self.transaction_id,
                    "Transaction already settled, no-op"
                );
                return Ok(vec![]);
            }
            TransactionStatus::Failed => {
                return Err(OrderError::InvalidOperation(format!(
                    "transaction {} already failed, cannot settle",
                    self.transaction_id
                )));
            }
            TransactionStatus::Pending => {}
        }

        let mut amount = txn.amount;
        let outstanding = order.remaining_amount();
        // The balance may have shrunk while the gateway was confirming
        // (e.g. a cash top-up at the counter). Cap the credited amount so
        // paid_amount never exceeds the total.
        if amount > outstanding {
            tracing::warn!(
                order_id = %order.order_id,
                transaction_id = %self.transaction_id,
                amount,
                outstanding,
                "Settlement exceeds outstanding balance, capping"
            );
            amount = outstanding;
        }

        let now = shared::util::now_millis();
        if let Some(txn) = order.transaction_mut(&self.transaction_id) {
            txn.status = TransactionStatus::Completed;
            txn.timestamp = now;
        }
        order.paid_amount = money::add_paid(order.paid_amount, amount);
        order.updated_at = now;

        tracing::info!(
            order_id = %order.order_id,
            transaction_id = %self.transaction_id,
            amount,
            paid_amount = order.paid_amount,
            "Gateway payment settled"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::PaymentSettled,
            EventPayload::PaymentSettled {
                transaction_id: self.transaction_id.clone(),
                amount,
                paid_amount_after: order.paid_amount,
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{PaymentMethod, Transaction};
    use shared::order::PaymentStatus;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".into(),
            actor_id: "system".into(),
            actor_name: "Payment Poller".into(),
            timestamp: 1234567890,
        }
    }

    fn order_with_pending(total: f64, amount: f64) -> Order {
        let mut o = Order::new(
            "MAIN-20260828-10001".into(),
            "cust-1".into(),
            "MAIN".into(),
            "pos-1".into(),
        );
        o.total_amount = total;
        o.transactions.push(Transaction {
            transaction_id: "txn-1".into(),
            order_id: o.order_id.clone(),
            customer_id: o.customer_id.clone(),
            amount,
            method: PaymentMethod::MobileMoney,
            status: TransactionStatus::Pending,
            timestamp: shared::util::now_millis(),
            tendered: None,
            change: None,
            gateway_reference: Some("gw-ref".into()),
            failure_reason: None,
            note: None,
        });
        o
    }

    fn action(order_id: &str) -> SettleGatewayPaymentAction {
        SettleGatewayPaymentAction {
            order_id: order_id.into(),
            transaction_id: "txn-1".into(),
        }
    }

    #[tokio::test]
    async fn test_settle_credits_paid_amount() {
        let mut o = order_with_pending(2000.0, 2000.0);
        let events = action(&o.order_id.clone())
            .execute(&mut o, &metadata())
            .await
            .unwrap();

        assert_eq!(o.paid_amount, 2000.0);
        assert_eq!(o.payment_status(), PaymentStatus::Paid);
        assert_eq!(
            o.transaction("txn-1").unwrap().status,
            TransactionStatus::Completed
        );
        assert_eq!(events[0].event_type, OrderEventType::PaymentSettled);
    }

    #[tokio::test]
    async fn test_settle_is_idempotent() {
        let mut o = order_with_pending(2000.0, 2000.0);
        let id = o.order_id.clone();
        action(&id).execute(&mut o, &metadata()).await.unwrap();

        let events = action(&id).execute(&mut o, &metadata()).await.unwrap();
        assert!(events.is_empty());
        assert_eq!(o.paid_amount, 2000.0);
    }

    #[tokio::test]
    async fn test_settle_caps_at_outstanding_balance() {
        let mut o = order_with_pending(2000.0, 1500.0);
        // Counter cash arrived while the gateway was confirming
        o.paid_amount = 1000.0;

        action(&o.order_id.clone())
            .execute(&mut o, &metadata())
            .await
            .unwrap();

        assert_eq!(o.paid_amount, 2000.0);
    }

    #[tokio::test]
    async fn test_settle_unknown_transaction_fails() {
        let mut o = Order::new(
            "MAIN-20260828-10001".into(),
            "cust-1".into(),
            "MAIN".into(),
            "pos-1".into(),
        );
        let result = action(&o.order_id.clone()).execute(&mut o, &metadata()).await;
        assert!(matches!(result, Err(OrderError::TransactionNotFound(_))));
    }

    #[tokio::test]
    async fn test_settle_failed_transaction_rejected() {
        let mut o = order_with_pending(2000.0, 1000.0);
        o.transaction_mut("txn-1").unwrap().status = TransactionStatus::Failed;

        let result = action(&o.order_id.clone()).execute(&mut o, &metadata()).await;
        assert!(matches!(result, Err(OrderError::InvalidOperation(_))));
        assert_eq!(o.paid_amount, 0.0);
    }
}
