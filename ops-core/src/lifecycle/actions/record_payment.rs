//! RecordPayment command handler
//!
//! Synchronous settlement at the counter. Gateway methods (mobile money,
//! card) settle asynchronously and must go through the pending-payment
//! flow; customer credit goes through the credit ledger.

use async_trait::async_trait;

use crate::lifecycle::money;
use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::models::{Transaction, TransactionStatus};
use shared::order::{EventPayload, Order, OrderEvent, OrderEventType, PaymentInput};

/// RecordPayment action
#[derive(Debug, Clone)]
pub struct RecordPaymentAction {
    pub order_id: String,
    pub payment: PaymentInput,
}

#[async_trait]
impl CommandHandler for RecordPaymentAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let payment = &self.payment;

        if payment.method.is_gateway() {
            return Err(OrderError::InvalidOperation(format!(
                "{} settles asynchronously, initiate a pending payment instead",
                payment.method
            )));
        }
        if payment.method == shared::models::PaymentMethod::Credit {
            return Err(OrderError::InvalidOperation(
                "customer credit is applied through the credit ledger".to_string(),
            ));
        }

        money::validate_amount(payment.amount)?;
        money::check_outstanding(payment.amount, order.remaining_amount())?;

        let change = match payment.tendered {
            Some(tendered) => {
                if !tendered.is_finite()
                    || money::to_decimal(tendered) + money::MONEY_TOLERANCE
                        < money::to_decimal(payment.amount)
                {
                    return Err(OrderError::InvalidOperation(format!(
                        "tendered ({}) is less than payment amount ({})",
                        tendered, payment.amount
                    )));
                }
                Some(money::cash_change(tendered, payment.amount))
            }
            None => None,
        };

        let transaction = Transaction {
            transaction_id: uuid::Uuid::new_v4().to_string(),
            order_id: order.order_id.clone(),
            customer_id: order.customer_id.clone(),
            amount: payment.amount,
            method: payment.method,
            status: TransactionStatus::Completed,
            timestamp: shared::util::now_millis(),
            tendered: payment.tendered,
            change,
            gateway_reference: None,
            failure_reason: None,
            note: payment.note.clone(),
        };
        let transaction_id = transaction.transaction_id.clone();

        order.paid_amount = money::add_paid(order.paid_amount, payment.amount);
        order.transactions.push(transaction);
        order.updated_at = shared::util::now_millis();

        tracing::info!(
            order_id = %order.order_id,
            transaction_id = %transaction_id,
            method = %payment.method,
            amount = payment.amount,
            paid_amount = order.paid_amount,
            "Payment recorded"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::PaymentRecorded,
            EventPayload::PaymentRecorded {
                transaction_id,
                method: payment.method,
                amount: payment.amount,
                tendered: payment.tendered,
                change,
                paid_amount_after: order.paid_amount,
            },
        )])
    }
}
