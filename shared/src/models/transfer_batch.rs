//! Transfer batch model - a grouped shipment of orders from a satellite
//! branch to the main processing branch

use serde::{Deserialize, Serialize};

/// Batch status - moves forward only
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransferBatchStatus {
    #[default]
    Pending,
    InTransit,
    Received,
}

impl std::fmt::Display for TransferBatchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransferBatchStatus::Pending => write!(f, "PENDING"),
            TransferBatchStatus::InTransit => write!(f, "IN_TRANSIT"),
            TransferBatchStatus::Received => write!(f, "RECEIVED"),
        }
    }
}

/// A shipment of orders between branches.
///
/// Every order id must reference an order originating at the satellite
/// branch at batch creation time; the batch holds weak back-references
/// only, never ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferBatch {
    pub batch_id: String,
    pub satellite_branch_id: String,
    pub main_store_branch_id: String,
    pub order_ids: Vec<String>,
    pub total_orders: usize,
    pub status: TransferBatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<String>,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dispatched_at: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub received_at: Option<i64>,
}

impl TransferBatch {
    pub fn new(
        satellite_branch_id: String,
        main_store_branch_id: String,
        order_ids: Vec<String>,
    ) -> Self {
        let total_orders = order_ids.len();
        Self {
            batch_id: uuid::Uuid::new_v4().to_string(),
            satellite_branch_id,
            main_store_branch_id,
            order_ids,
            total_orders,
            status: TransferBatchStatus::Pending,
            assigned_driver_id: None,
            created_at: crate::util::now_millis(),
            dispatched_at: None,
            received_at: None,
        }
    }
}
