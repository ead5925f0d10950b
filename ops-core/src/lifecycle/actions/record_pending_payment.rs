//! RecordPendingPayment command handler
//!
//! First half of the asynchronous gateway flow: records the transaction in
//! PENDING with the gateway's redirect reference. `paid_amount` is untouched
//! until settlement confirms.

use async_trait::async_trait;

use crate::lifecycle::money;
use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::models::{PaymentMethod, Transaction, TransactionStatus};
use shared::order::{EventPayload, Order, OrderEvent, OrderEventType};

/// RecordPendingPayment action
#[derive(Debug, Clone)]
pub struct RecordPendingPaymentAction {
    pub order_id: String,
    pub transaction_id: String,
    pub method: PaymentMethod,
    pub amount: f64,
    pub redirect_reference: String,
}

#[async_trait]
impl CommandHandler for RecordPendingPaymentAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if !self.method.is_gateway() {
            return Err(OrderError::InvalidOperation(format!(
                "{} is not a gateway method",
                self.method
            )));
        }

        money::validate_amount(self.amount)?;
        money::check_outstanding(self.amount, order.remaining_amount())?;

        if order.transaction(&self.transaction_id).is_some() {
            return Err(OrderError::InvalidOperation(format!(
                "transaction {} already recorded",
                self.transaction_id
            )));
        }

        order.transactions.push(Transaction {
            transaction_id: self.transaction_id.clone(),
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            amount: self.amount,
            method: self.method,
            status: TransactionStatus::Pending,
            timestamp: shared::util::now_millis(),
            tendered: None,
            change: None,
            gateway_reference: Some(self.redirect_reference.clone()),
            failure_reason: None,
            note: None,
        });
        order.updated_at = shared::util::now_millis();

        tracing::info!(
            order_id = %order.order_id,
            transaction_id = %self.transaction_id,
            method = %self.method,
            amount = self.amount,
            "Gateway payment initiated"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::PaymentInitiated,
            EventPayload::PaymentInitiated {
                transaction_id: self.transaction_id.clone(),
                method: self.method,
                amount: self.amount,
                redirect_reference: self.redirect_reference.clone(),
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::PaymentStatus;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".into(),
            actor_id: "pos-1".into(),
            actor_name: "Front Desk".into(),
            timestamp: 1234567890,
        }
    }

    fn order(total: f64) -> Order {
        let mut o = Order::new(
            "MAIN-20260828-10001".into(),
            "cust-1".into(),
            "MAIN".into(),
            "pos-1".into(),
        );
        o.total_amount = total;
        o
    }

    fn action(order_id: &str, amount: f64) -> RecordPendingPaymentAction {
        RecordPendingPaymentAction {
            order_id: order_id.into(),
            transaction_id: "txn-1".into(),
            method: PaymentMethod::MobileMoney,
            amount,
            redirect_reference: "gw-ref-123".into(),
        }
    }

    #[tokio::test]
    async fn test_pending_payment_does_not_touch_paid_amount() {
        let mut o = order(2000.0);
        let events = action(&o.order_id.clone(), 2000.0)
            .execute(&mut o, &metadata())
            .await
            .unwrap();

        assert_eq!(o.paid_amount, 0.0);
        assert_eq!(o.payment_status(), PaymentStatus::Pending);
        let txn = o.transaction("txn-1").unwrap();
        assert_eq!(txn.status, TransactionStatus::Pending);
        assert_eq!(txn.gateway_reference.as_deref(), Some("gw-ref-123"));
        assert_eq!(events[0].event_type, OrderEventType::PaymentInitiated);
    }

    #[tokio::test]
    async fn test_duplicate_transaction_id_rejected() {
        let mut o = order(2000.0);
        let id = o.order_id.clone();
        action(&id, 1000.0).execute(&mut o, &metadata()).await.unwrap();

        let result = action(&id, 1000.0).execute(&mut o, &metadata()).await;
        assert!(matches!(result, Err(OrderError::InvalidOperation(_))));
        assert_eq!(o.transactions.len(), 1);
    }

    #[tokio::test]
    async fn test_non_gateway_method_rejected() {
        let mut o = order(2000.0);
        let mut a = action(&o.order_id.clone(), 500.0);
        a.method = PaymentMethod::Cash;
        assert!(matches!(
            a.execute(&mut o, &metadata()).await,
            Err(OrderError::InvalidOperation(_))
        ));
    }

    #[tokio::test]
    async fn test_amount_above_outstanding_rejected() {
        let mut o = order(1000.0);
        let result = action(&o.order_id.clone(), 1500.0)
            .execute(&mut o, &metadata())
            .await;
        assert!(matches!(
            result,
            Err(OrderError::AmountExceedsBalance { .. })
        ));
    }
}
