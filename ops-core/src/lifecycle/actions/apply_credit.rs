//! ApplyCredit command handler
//!
//! Records a settled credit transaction on the order. The payment service
//! debits the customer's ledger BEFORE issuing this command and issues a
//! compensating refund if the order write fails, so by the time this
//! handler runs the funds are already held.

use async_trait::async_trait;

use crate::lifecycle::money;
use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::models::{PaymentMethod, Transaction, TransactionStatus};
use shared::order::{EventPayload, Order, OrderEvent, OrderEventType};

/// ApplyCredit action
#[derive(Debug, Clone)]
pub struct ApplyCreditAction {
    pub order_id: String,
    pub amount: f64,
}

#[async_trait]
impl CommandHandler for ApplyCreditAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        money::validate_amount(self.amount)?;
        money::check_outstanding(self.amount, order.remaining_amount())?;

        let now = shared::util::now_millis();
        let transaction_id = uuid::Uuid::new_v4().to_string();
        order.transactions.push(Transaction {
            transaction_id: transaction_id.clone(),
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            amount: self.amount,
            method: PaymentMethod::Credit,
            status: TransactionStatus::Completed,
            timestamp: now,
            tendered: None,
            change: None,
            gateway_reference: None,
            failure_reason: None,
            note: None,
        });
        order.paid_amount = money::add_paid(order.paid_amount, self.amount);
        order.updated_at = now;

        tracing::info!(
            order_id = %order.order_id,
            transaction_id = %transaction_id,
            amount = self.amount,
            paid_amount = order.paid_amount,
            "Customer credit applied"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::CreditApplied,
            EventPayload::CreditApplied {
                transaction_id,
                amount: self.amount,
                paid_amount_after: order.paid_amount,
            },
        )])
    }
}
