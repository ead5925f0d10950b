//! Payment service
//!
//! Front door for everything money: synchronous counter payments, the
//! asynchronous gateway flow (initiate, record pending, poll, settle or
//! fail), and customer store credit. All order mutations still go through
//! the lifecycle manager; this service only orchestrates around it.

pub mod backoff;
pub mod credit;
pub mod gateway;

pub use backoff::PollSchedule;
pub use credit::{CreditError, CreditLedger, InMemoryCreditLedger};
pub use gateway::{GatewayError, GatewayHandoff, GatewayPaymentStatus, PaymentGateway};

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::OrderLifecycleManager;
use shared::models::PaymentMethod;
use shared::order::{ContactInfo, OrderCommand, OrderCommandPayload, PaymentInput};

/// Actor recorded on poller-driven settlement commands
const POLLER_ACTOR_ID: &str = "system:payment-poller";
const POLLER_ACTOR_NAME: &str = "Payment Poller";

/// Payment service errors
#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("Command rejected: {0}")]
    CommandRejected(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Missing contact: {0}")]
    MissingContact(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Credit(#[from] CreditError),
}

/// Terminal outcome of a gateway polling run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettlementOutcome {
    Settled,
    Failed { reason: Option<String> },
    /// The confirmation window elapsed; the transaction stays pending and
    /// must be reconciled out-of-band
    ConfirmationTimeout,
    /// Shutdown requested; the transaction is left pending
    Cancelled,
}

/// Payment orchestration around the lifecycle manager
pub struct PaymentService {
    lifecycle: Arc<OrderLifecycleManager>,
    gateway: Arc<dyn PaymentGateway>,
    ledger: Arc<dyn CreditLedger>,
    schedule: PollSchedule,
}

impl PaymentService {
    pub fn new(
        lifecycle: Arc<OrderLifecycleManager>,
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn CreditLedger>,
        schedule: PollSchedule,
    ) -> Self {
        Self {
            lifecycle,
            gateway,
            ledger,
            schedule,
        }
    }

    pub fn ledger(&self) -> &dyn CreditLedger {
        self.ledger.as_ref()
    }

    async fn run_command(
        &self,
        actor_id: &str,
        actor_name: &str,
        payload: OrderCommandPayload,
    ) -> Result<(), PaymentError> {
        let response = self
            .lifecycle
            .execute_command(OrderCommand::new(actor_id, actor_name, payload))
            .await;
        if response.success {
            Ok(())
        } else {
            let message = response
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown error".to_string());
            Err(PaymentError::CommandRejected(message))
        }
    }

    /// Record a synchronous counter payment (cash)
    pub async fn record_payment(
        &self,
        order_id: &str,
        payment: PaymentInput,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<(), PaymentError> {
        self.run_command(
            actor_id,
            actor_name,
            OrderCommandPayload::RecordPayment {
                order_id: order_id.to_string(),
                payment,
            },
        )
        .await
    }

    /// Start an asynchronous gateway payment. On success the order carries a
    /// pending transaction and the returned handoff identifies it.
    pub async fn initiate_gateway_payment(
        &self,
        order_id: &str,
        method: PaymentMethod,
        amount: f64,
        contact: &ContactInfo,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<GatewayHandoff, PaymentError> {
        if !method.is_gateway() {
            return Err(PaymentError::CommandRejected(format!(
                "{} is not a gateway method",
                method
            )));
        }
        if method == PaymentMethod::MobileMoney && contact.phone.is_none() {
            return Err(PaymentError::MissingContact(
                "mobile money requires a phone number".to_string(),
            ));
        }

        let handoff = self
            .gateway
            .initiate(method, amount, contact.phone.as_deref())
            .await?;

        self.run_command(
            actor_id,
            actor_name,
            OrderCommandPayload::RecordPendingPayment {
                order_id: order_id.to_string(),
                transaction_id: handoff.transaction_id.clone(),
                method,
                amount,
                redirect_reference: handoff.redirect_reference.clone(),
            },
        )
        .await?;

        tracing::info!(
            order_id = %order_id,
            transaction_id = %handoff.transaction_id,
            method = %method,
            amount,
            "Gateway payment initiated"
        );
        Ok(handoff)
    }

    /// Poll the gateway until the transaction settles, fails, the
    /// confirmation window closes, or shutdown is requested.
    pub async fn poll_until_settled(
        &self,
        order_id: &str,
        transaction_id: &str,
        cancel: CancellationToken,
    ) -> Result<SettlementOutcome, PaymentError> {
        for delay in self.schedule.delays() {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!(
                        order_id = %order_id,
                        transaction_id = %transaction_id,
                        "Polling cancelled, transaction left pending"
                    );
                    return Ok(SettlementOutcome::Cancelled);
                }
                _ = tokio::time::sleep(delay) => {}
            }

            match self.gateway.check_status(transaction_id).await {
                Ok(GatewayPaymentStatus::Completed) => {
                    self.run_command(
                        POLLER_ACTOR_ID,
                        POLLER_ACTOR_NAME,
                        OrderCommandPayload::SettleGatewayPayment {
                            order_id: order_id.to_string(),
                            transaction_id: transaction_id.to_string(),
                        },
                    )
                    .await?;
                    return Ok(SettlementOutcome::Settled);
                }
                Ok(GatewayPaymentStatus::Failed { reason }) => {
                    self.run_command(
                        POLLER_ACTOR_ID,
                        POLLER_ACTOR_NAME,
                        OrderCommandPayload::FailGatewayPayment {
                            order_id: order_id.to_string(),
                            transaction_id: transaction_id.to_string(),
                            reason: reason.clone(),
                        },
                    )
                    .await?;
                    return Ok(SettlementOutcome::Failed { reason });
                }
                Ok(GatewayPaymentStatus::Pending) => {}
                Err(err) => {
                    // Transient gateway trouble; keep polling inside the window
                    tracing::warn!(
                        transaction_id = %transaction_id,
                        error = %err,
                        "Gateway status check failed, will retry"
                    );
                }
            }
        }

        // The money may still land later; the transaction stays pending for
        // out-of-band reconciliation rather than being assumed failed.
        tracing::warn!(
            order_id = %order_id,
            transaction_id = %transaction_id,
            "Confirmation window elapsed, manual reconciliation required"
        );
        Ok(SettlementOutcome::ConfirmationTimeout)
    }

    /// Apply customer store credit to the order's outstanding balance.
    ///
    /// Ledger debit first, order write second; if the write is rejected the
    /// debit is refunded.
    pub async fn apply_credit(
        &self,
        order_id: &str,
        amount: f64,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<(), PaymentError> {
        let order = self
            .lifecycle
            .get_order(order_id)
            .map_err(|_| PaymentError::OrderNotFound(order_id.to_string()))?;

        self.ledger.debit(&order.customer_id, amount).await?;

        let result = self
            .run_command(
                actor_id,
                actor_name,
                OrderCommandPayload::ApplyCredit {
                    order_id: order_id.to_string(),
                    amount,
                },
            )
            .await;

        if let Err(err) = result {
            tracing::warn!(
                order_id = %order_id,
                customer_id = %order.customer_id,
                amount,
                error = %err,
                "Credit application rejected, refunding ledger"
            );
            if let Err(refund_err) = self.ledger.credit(&order.customer_id, amount).await {
                tracing::error!(
                    customer_id = %order.customer_id,
                    amount,
                    error = %refund_err,
                    "Compensating refund failed, ledger out of sync"
                );
            }
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::gateway::testing::ScriptedGateway;
    use shared::models::TransactionStatus;
    use shared::order::{GarmentInput, NewOrderInput, PaymentStatus};

    async fn create_order(mgr: &OrderLifecycleManager, total: f64) -> String {
        let cmd = OrderCommand::new(
            "pos-1",
            "Front Desk",
            OrderCommandPayload::CreateOrder {
                input: NewOrderInput {
                    customer_id: "cust-1".into(),
                    branch_id: "MAIN".into(),
                    garments: vec![GarmentInput {
                        garment_type: "duvet".into(),
                        color: None,
                        services: vec!["wash".into()],
                        price: total,
                        note: None,
                    }],
                    estimated_completion: None,
                    pickup: None,
                    delivery: None,
                },
            },
        );
        mgr.execute_command(cmd).await.order_id.unwrap()
    }

    fn service(gateway: ScriptedGateway) -> (Arc<OrderLifecycleManager>, PaymentService) {
        let lifecycle = Arc::new(OrderLifecycleManager::new(chrono_tz::Africa::Nairobi));
        let svc = PaymentService::new(
            lifecycle.clone(),
            Arc::new(gateway),
            Arc::new(InMemoryCreditLedger::new()),
            PollSchedule::default(),
        );
        (lifecycle, svc)
    }

    fn contact() -> ContactInfo {
        ContactInfo {
            phone: Some("+254700000000".into()),
            email: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_payment_settles_after_confirmation() {
        let gateway = ScriptedGateway::new([
            GatewayPaymentStatus::Pending,
            GatewayPaymentStatus::Pending,
            GatewayPaymentStatus::Completed,
        ]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 2000.0).await;

        let handoff = svc
            .initiate_gateway_payment(
                &order_id,
                PaymentMethod::MobileMoney,
                2000.0,
                &contact(),
                "pos-1",
                "Front Desk",
            )
            .await
            .unwrap();

        let outcome = svc
            .poll_until_settled(&order_id, &handoff.transaction_id, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, SettlementOutcome::Settled);
        let order = lifecycle.get_order(&order_id).unwrap();
        assert_eq!(order.paid_amount, 2000.0);
        assert_eq!(order.payment_status(), PaymentStatus::Paid);
        assert_eq!(
            order.transaction(&handoff.transaction_id).unwrap().status,
            TransactionStatus::Completed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_gateway_failure_marks_transaction_failed() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Failed {
            reason: Some("customer declined".into()),
        }]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 1000.0).await;

        let handoff = svc
            .initiate_gateway_payment(
                &order_id,
                PaymentMethod::Card,
                1000.0,
                &ContactInfo::default(),
                "pos-1",
                "Front Desk",
            )
            .await
            .unwrap();

        let outcome = svc
            .poll_until_settled(&order_id, &handoff.transaction_id, CancellationToken::new())
            .await
            .unwrap();

        assert!(matches!(outcome, SettlementOutcome::Failed { .. }));
        let order = lifecycle.get_order(&order_id).unwrap();
        assert_eq!(order.paid_amount, 0.0);
        assert_eq!(
            order.transaction(&handoff.transaction_id).unwrap().status,
            TransactionStatus::Failed
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_confirmation_window_timeout() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Pending]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 1000.0).await;

        let handoff = svc
            .initiate_gateway_payment(
                &order_id,
                PaymentMethod::MobileMoney,
                1000.0,
                &contact(),
                "pos-1",
                "Front Desk",
            )
            .await
            .unwrap();

        let outcome = svc
            .poll_until_settled(&order_id, &handoff.transaction_id, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome, SettlementOutcome::ConfirmationTimeout);
        // The amount may still land later: transaction stays pending
        let order = lifecycle.get_order(&order_id).unwrap();
        assert_eq!(order.paid_amount, 0.0);
        assert_eq!(
            order.transaction(&handoff.transaction_id).unwrap().status,
            TransactionStatus::Pending
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_leaves_transaction_pending() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Pending]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 1000.0).await;

        let handoff = svc
            .initiate_gateway_payment(
                &order_id,
                PaymentMethod::MobileMoney,
                1000.0,
                &contact(),
                "pos-1",
                "Front Desk",
            )
            .await
            .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = svc
            .poll_until_settled(&order_id, &handoff.transaction_id, cancel)
            .await
            .unwrap();

        assert_eq!(outcome, SettlementOutcome::Cancelled);
        let order = lifecycle.get_order(&order_id).unwrap();
        assert_eq!(
            order.transaction(&handoff.transaction_id).unwrap().status,
            TransactionStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_mobile_money_requires_phone() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Pending]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 1000.0).await;

        let result = svc
            .initiate_gateway_payment(
                &order_id,
                PaymentMethod::MobileMoney,
                1000.0,
                &ContactInfo::default(),
                "pos-1",
                "Front Desk",
            )
            .await;
        assert!(matches!(result, Err(PaymentError::MissingContact(_))));
    }

    #[tokio::test]
    async fn test_apply_credit_debits_ledger() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Pending]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 1000.0).await;
        svc.ledger().credit("cust-1", 600.0).await.unwrap();

        svc.apply_credit(&order_id, 400.0, "pos-1", "Front Desk")
            .await
            .unwrap();

        assert_eq!(svc.ledger().balance("cust-1").await, 200.0);
        assert_eq!(lifecycle.get_order(&order_id).unwrap().paid_amount, 400.0);
    }

    #[tokio::test]
    async fn test_partial_credit_reduces_balance_due() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Pending]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 800.0).await;
        svc.ledger().credit("cust-1", 500.0).await.unwrap();

        svc.apply_credit(&order_id, 500.0, "pos-1", "Front Desk")
            .await
            .unwrap();

        assert_eq!(svc.ledger().balance("cust-1").await, 0.0);
        let order = lifecycle.get_order(&order_id).unwrap();
        assert_eq!(order.paid_amount, 500.0);
        assert_eq!(order.remaining_amount(), 300.0);
        assert_eq!(order.payment_status(), PaymentStatus::Partial);
    }

    #[tokio::test]
    async fn test_apply_credit_insufficient_balance() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Pending]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 1000.0).await;
        svc.ledger().credit("cust-1", 100.0).await.unwrap();

        let result = svc
            .apply_credit(&order_id, 400.0, "pos-1", "Front Desk")
            .await;

        assert!(matches!(
            result,
            Err(PaymentError::Credit(CreditError::Insufficient { .. }))
        ));
        assert_eq!(svc.ledger().balance("cust-1").await, 100.0);
        assert_eq!(lifecycle.get_order(&order_id).unwrap().paid_amount, 0.0);
    }

    #[tokio::test]
    async fn test_rejected_credit_command_refunds_ledger() {
        let gateway = ScriptedGateway::new([GatewayPaymentStatus::Pending]);
        let (lifecycle, svc) = service(gateway);
        let order_id = create_order(&lifecycle, 1000.0).await;
        svc.ledger().credit("cust-1", 5000.0).await.unwrap();

        // More than the outstanding balance: the order command rejects it
        let result = svc
            .apply_credit(&order_id, 2000.0, "pos-1", "Front Desk")
            .await;

        assert!(matches!(result, Err(PaymentError::CommandRejected(_))));
        // Compensating refund restored the ledger
        assert_eq!(svc.ledger().balance("cust-1").await, 5000.0);
        assert_eq!(lifecycle.get_order(&order_id).unwrap().paid_amount, 0.0);
    }

    #[test]
    fn test_default_schedule_delays() {
        let delays: Vec<u64> = PollSchedule::default()
            .delays()
            .take(5)
            .map(|d| d.as_secs())
            .collect();
        assert_eq!(delays, vec![5, 10, 20, 30, 30]);
    }
}
