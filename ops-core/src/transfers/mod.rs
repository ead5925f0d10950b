//! Inter-branch transfer workflow
//!
//! Satellite branches take orders in and ship them to the main store for
//! processing in grouped batches. The batch moves PENDING -> IN_TRANSIT ->
//! RECEIVED, forward only. Receiving fans out per-order commands through
//! the lifecycle manager; a batch is only RECEIVED once every order in it
//! has been checked in, so a partially failed receive can be retried.

use std::sync::Arc;

use dashmap::DashMap;
use thiserror::Error;

use crate::lifecycle::OrderLifecycleManager;
use shared::models::{TransferBatch, TransferBatchStatus};
use shared::order::{OrderCommand, OrderCommandPayload};

/// Transfer workflow errors
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("Batch not found: {0}")]
    BatchNotFound(String),

    #[error("Batch must contain at least one order")]
    EmptyBatch,

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order {order_id} does not originate at branch {expected}")]
    WrongOriginBranch { order_id: String, expected: String },

    #[error("Order {0} is already closed and cannot be transferred")]
    OrderClosed(String),

    #[error("Batch {0} has no assigned driver")]
    DriverNotAssigned(String),

    #[error("Batch {batch_id} is {status}, expected {expected}")]
    InvalidBatchState {
        batch_id: String,
        status: TransferBatchStatus,
        expected: TransferBatchStatus,
    },

    #[error("Batch {0} already received")]
    AlreadyReceived(String),
}

/// One failed order check-in during a batch receive
#[derive(Debug, Clone)]
pub struct ReceiveFailure {
    pub order_id: String,
    pub message: String,
}

/// Outcome of a batch receive. `failed` being non-empty means the batch is
/// still IN_TRANSIT and receive should be retried after fixing the orders.
#[derive(Debug, Clone)]
pub struct ReceiveReport {
    pub batch_id: String,
    pub received: Vec<String>,
    pub failed: Vec<ReceiveFailure>,
}

impl ReceiveReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Transfer batch manager
pub struct TransferManager {
    lifecycle: Arc<OrderLifecycleManager>,
    batches: DashMap<String, TransferBatch>,
}

impl TransferManager {
    pub fn new(lifecycle: Arc<OrderLifecycleManager>) -> Self {
        Self {
            lifecycle,
            batches: DashMap::new(),
        }
    }

    pub fn get_batch(&self, batch_id: &str) -> Result<TransferBatch, TransferError> {
        self.batches
            .get(batch_id)
            .map(|b| b.clone())
            .ok_or_else(|| TransferError::BatchNotFound(batch_id.to_string()))
    }

    /// Create a batch after validating every order exists, originates at the
    /// satellite branch, and is still open.
    pub fn create_batch(
        &self,
        satellite_branch_id: &str,
        main_store_branch_id: &str,
        order_ids: Vec<String>,
    ) -> Result<TransferBatch, TransferError> {
        if order_ids.is_empty() {
            return Err(TransferError::EmptyBatch);
        }

        for order_id in &order_ids {
            let order = self
                .lifecycle
                .get_order(order_id)
                .map_err(|_| TransferError::OrderNotFound(order_id.clone()))?;
            if order.origin_branch_id.as_deref() != Some(satellite_branch_id) {
                return Err(TransferError::WrongOriginBranch {
                    order_id: order_id.clone(),
                    expected: satellite_branch_id.to_string(),
                });
            }
            if order.is_terminal() {
                return Err(TransferError::OrderClosed(order_id.clone()));
            }
        }

        let batch = TransferBatch::new(
            satellite_branch_id.to_string(),
            main_store_branch_id.to_string(),
            order_ids,
        );
        tracing::info!(
            batch_id = %batch.batch_id,
            satellite = %satellite_branch_id,
            orders = batch.total_orders,
            "Transfer batch created"
        );
        self.batches.insert(batch.batch_id.clone(), batch.clone());
        Ok(batch)
    }

    /// Assign (or reassign) the courier driver. Only before dispatch.
    pub fn assign_driver(&self, batch_id: &str, driver_id: &str) -> Result<(), TransferError> {
        let mut batch = self
            .batches
            .get_mut(batch_id)
            .ok_or_else(|| TransferError::BatchNotFound(batch_id.to_string()))?;
        if batch.status != TransferBatchStatus::Pending {
            return Err(TransferError::InvalidBatchState {
                batch_id: batch_id.to_string(),
                status: batch.status,
                expected: TransferBatchStatus::Pending,
            });
        }
        batch.assigned_driver_id = Some(driver_id.to_string());
        Ok(())
    }

    /// Dispatch the batch. Requires a driver and PENDING status.
    pub fn dispatch(&self, batch_id: &str) -> Result<TransferBatch, TransferError> {
        let mut batch = self
            .batches
            .get_mut(batch_id)
            .ok_or_else(|| TransferError::BatchNotFound(batch_id.to_string()))?;
        if batch.status != TransferBatchStatus::Pending {
            return Err(TransferError::InvalidBatchState {
                batch_id: batch_id.to_string(),
                status: batch.status,
                expected: TransferBatchStatus::Pending,
            });
        }
        if batch.assigned_driver_id.is_none() {
            return Err(TransferError::DriverNotAssigned(batch_id.to_string()));
        }

        batch.status = TransferBatchStatus::InTransit;
        batch.dispatched_at = Some(shared::util::now_millis());
        tracing::info!(batch_id = %batch_id, "Transfer batch dispatched");
        Ok(batch.clone())
    }

    /// Check the batch in at the main store, fanning out one
    /// ReceiveAtMainStore command per order.
    ///
    /// Orders that check in successfully stay checked in even when others
    /// fail; the batch flips to RECEIVED only once the failed list is empty.
    pub async fn receive(
        &self,
        batch_id: &str,
        actor_id: &str,
        actor_name: &str,
    ) -> Result<ReceiveReport, TransferError> {
        let batch = self.get_batch(batch_id)?;
        match batch.status {
            TransferBatchStatus::Received => {
                return Err(TransferError::AlreadyReceived(batch_id.to_string()));
            }
            TransferBatchStatus::Pending => {
                return Err(TransferError::InvalidBatchState {
                    batch_id: batch_id.to_string(),
                    status: batch.status,
                    expected: TransferBatchStatus::InTransit,
                });
            }
            TransferBatchStatus::InTransit => {}
        }

        let mut report = ReceiveReport {
            batch_id: batch_id.to_string(),
            received: Vec::new(),
            failed: Vec::new(),
        };

        for order_id in &batch.order_ids {
            let command = OrderCommand::new(
                actor_id,
                actor_name,
                OrderCommandPayload::ReceiveAtMainStore {
                    order_id: order_id.clone(),
                    batch_id: batch_id.to_string(),
                    main_store_branch_id: batch.main_store_branch_id.clone(),
                },
            );
            let response = self.lifecycle.execute_command(command).await;
            if response.success {
                report.received.push(order_id.clone());
            } else {
                let message = response
                    .error
                    .map(|e| e.message)
                    .unwrap_or_else(|| "unknown error".to_string());
                tracing::warn!(
                    batch_id = %batch_id,
                    order_id = %order_id,
                    error = %message,
                    "Order failed to check in"
                );
                report.failed.push(ReceiveFailure {
                    order_id: order_id.clone(),
                    message,
                });
            }
        }

        if report.is_complete()
            && let Some(mut batch) = self.batches.get_mut(batch_id)
        {
            batch.status = TransferBatchStatus::Received;
            batch.received_at = Some(shared::util::now_millis());
            tracing::info!(batch_id = %batch_id, "Transfer batch fully received");
        }

        Ok(report)
    }
}
