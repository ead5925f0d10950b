//! FailGatewayPayment command handler

use async_trait::async_trait;

use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::models::TransactionStatus;
use shared::order::{EventPayload, Order, OrderEvent, OrderEventType};

/// FailGatewayPayment action - marks a pending transaction failed.
///
/// The order's balance is untouched: a failed gateway attempt never counted
/// toward `paid_amount` in the first place. The customer can simply retry.
#[derive(Debug, Clone)]
pub struct FailGatewayPaymentAction {
    pub order_id: String,
    pub transaction_id: String,
    pub reason: Option<String>,
}

#[async_trait]
impl CommandHandler for FailGatewayPaymentAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let txn = order
            .transaction(&self.transaction_id)
            .ok_or_else(|| OrderError::TransactionNotFound(self.transaction_id.clone()))?;

        match txn.status {
            TransactionStatus::Failed => {
                tracing::debug!(
                    order_id = %order.order_id,
                    transaction_id = %self.transaction_id,
                    "Transaction already failed, no-op"
                );
                return Ok(vec![]);
            }
            TransactionStatus::Completed => {
                return Err(OrderError::AlreadyCompleted(format!(
                    "transaction {} already settled, cannot fail it",
                    self.transaction_id
                )));
            }
            TransactionStatus::Pending => {}
        }

        let now = shared::util::now_millis();
        if let Some(txn) = order.transaction_mut(&self.transaction_id) {
            txn.status = TransactionStatus::Failed;
            txn.failure_reason = self.reason.clone();
            txn.timestamp = now;
        }
        order.updated_at = now;

        tracing::warn!(
            order_id = %order.order_id,
            transaction_id = %self.transaction_id,
            reason = ?self.reason,
            "Gateway payment failed"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::PaymentFailed,
            EventPayload::PaymentFailed {
                transaction_id: self.transaction_id.clone(),
                reason: self.reason.clone(),
            },
        )])
    }
}
