use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use ops_core::payments::gateway::{GatewayError, GatewayHandoff, GatewayPaymentStatus};
use ops_core::payments::{InMemoryCreditLedger, PaymentGateway, PaymentService};
use ops_core::{Config, OrderLifecycleManager, PipelineMonitor};
use shared::order::EventPayload;

/// Gateway placeholder until a provider integration is configured; cash and
/// store-credit flows are unaffected.
struct DisconnectedGateway;

#[async_trait::async_trait]
impl PaymentGateway for DisconnectedGateway {
    async fn initiate(
        &self,
        _method: shared::models::PaymentMethod,
        _amount: f64,
        _phone: Option<&str>,
    ) -> Result<GatewayHandoff, GatewayError> {
        Err(GatewayError::Unreachable(
            "no payment gateway configured".to_string(),
        ))
    }

    async fn check_status(
        &self,
        transaction_id: &str,
    ) -> Result<GatewayPaymentStatus, GatewayError> {
        Err(GatewayError::UnknownTransaction(transaction_id.to_string()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = Config::from_env();
    ops_core::init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(
        branch_id = %config.branch_id,
        main_store = %config.main_store_branch_id,
        is_main_store = config.is_main_store(),
        "Laundry operations engine starting"
    );

    let lifecycle = Arc::new(OrderLifecycleManager::new(config.business_tz));
    let payments = Arc::new(PaymentService::new(
        lifecycle.clone(),
        Arc::new(DisconnectedGateway),
        Arc::new(InMemoryCreditLedger::new()),
        config.poll_schedule,
    ));

    let shutdown = CancellationToken::new();

    // Confirmation poller: every initiated gateway payment on the change
    // feed gets its own polling task until it settles, fails, or the
    // confirmation window closes.
    let poller_shutdown = shutdown.clone();
    let mut payment_events = lifecycle.subscribe();
    let poller_handle = tokio::spawn(async move {
        use tokio::sync::broadcast::error::RecvError;
        loop {
            tokio::select! {
                _ = poller_shutdown.cancelled() => break,
                event = payment_events.recv() => match event {
                    Ok(event) => {
                        let EventPayload::PaymentInitiated { transaction_id, .. } = &event.payload
                        else {
                            continue;
                        };
                        let payments = payments.clone();
                        let order_id = event.order_id.clone();
                        let transaction_id = transaction_id.clone();
                        let cancel = poller_shutdown.child_token();
                        tokio::spawn(async move {
                            match payments
                                .poll_until_settled(&order_id, &transaction_id, cancel)
                                .await
                            {
                                Ok(outcome) => tracing::info!(
                                    order_id = %order_id,
                                    transaction_id = %transaction_id,
                                    outcome = ?outcome,
                                    "Gateway polling finished"
                                ),
                                Err(err) => tracing::error!(
                                    order_id = %order_id,
                                    transaction_id = %transaction_id,
                                    error = %err,
                                    "Gateway polling failed"
                                ),
                            }
                        });
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Payment poller lagged on the change feed");
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });
    let (monitor, mut stats_rx) = PipelineMonitor::new(
        lifecycle.store(),
        lifecycle.subscribe(),
        config.bottleneck_threshold_minutes,
        shutdown.clone(),
    );
    let monitor_handle = tokio::spawn(monitor.run());

    // Surface bottleneck alerts as they appear
    let alert_shutdown = shutdown.clone();
    let alert_handle = tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = alert_shutdown.cancelled() => break,
                changed = stats_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let stats = stats_rx.borrow().clone();
                    if let Some(b) = &stats.bottleneck
                        && b.exceeds_threshold
                    {
                        tracing::warn!(
                            status = %b.status,
                            avg_dwell_minutes = b.avg_dwell_minutes,
                            "Pipeline bottleneck over threshold"
                        );
                    }
                }
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();
    monitor_handle.await?;
    alert_handle.await?;
    poller_handle.await?;

    tracing::info!("Engine stopped");
    Ok(())
}
