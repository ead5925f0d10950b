//! Order commands - requests from POS/API callers to mutate an order

use super::status::{OrderStatus, WorkstationStage};
use super::types::{DeliveryClassification, LegKind, NewOrderInput, PaymentInput};
use crate::models::PaymentMethod;
use serde::{Deserialize, Serialize};

/// An order command, identified for idempotent re-submission.
///
/// Duplicate `command_id`s are answered with a duplicate-success response
/// instead of being applied twice - the UI is expected to re-submit under
/// optimistic concurrency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCommand {
    pub command_id: String,
    pub actor_id: String,
    pub actor_name: String,
    /// Client timestamp (Unix milliseconds); audit only, server time is
    /// authoritative for state evolution
    pub timestamp: i64,
    pub payload: OrderCommandPayload,
}

impl OrderCommand {
    pub fn new(actor_id: impl Into<String>, actor_name: impl Into<String>, payload: OrderCommandPayload) -> Self {
        Self {
            command_id: uuid::Uuid::new_v4().to_string(),
            actor_id: actor_id.into(),
            actor_name: actor_name.into(),
            timestamp: crate::util::now_millis(),
            payload,
        }
    }
}

/// Command payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderCommandPayload {
    /// POS order entry - origin of the lifecycle
    CreateOrder { input: NewOrderInput },

    /// Move the order's top-level status through the registry
    TransitionStatus {
        order_id: String,
        target: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    /// Assign a driver to the pickup or delivery leg
    AssignDriver {
        order_id: String,
        leg: LegKind,
        driver_id: String,
    },

    /// Mark the pickup or delivery leg completed
    CompleteLeg { order_id: String, leg: LegKind },

    /// Record a synchronous payment (cash)
    RecordPayment {
        order_id: String,
        payment: PaymentInput,
    },

    /// Record a pending gateway transaction after initiation
    RecordPendingPayment {
        order_id: String,
        transaction_id: String,
        method: PaymentMethod,
        amount: f64,
        redirect_reference: String,
    },

    /// Settle a pending gateway transaction (confirmation arrived)
    SettleGatewayPayment {
        order_id: String,
        transaction_id: String,
    },

    /// Mark a pending gateway transaction failed
    FailGatewayPayment {
        order_id: String,
        transaction_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    /// Apply customer store credit to the outstanding balance.
    /// The ledger debit happens before this command; the amount here is
    /// already reserved.
    ApplyCredit { order_id: String, amount: f64 },

    /// Route the order to a workstation sub-stage
    AssignWorkstation {
        order_id: String,
        stage: WorkstationStage,
        #[serde(skip_serializing_if = "Option::is_none")]
        handler_id: Option<String>,
    },

    /// Bulk-receive step of the transfer workflow: the order arrives at
    /// the main store and enters inspection
    ReceiveAtMainStore {
        order_id: String,
        batch_id: String,
        main_store_branch_id: String,
    },

    /// Manual Small/Bulk delivery override
    ClassifyDelivery {
        order_id: String,
        classification: DeliveryClassification,
    },
}

impl OrderCommandPayload {
    /// Order id the command targets, if it targets an existing order
    pub fn order_id(&self) -> Option<&str> {
        match self {
            OrderCommandPayload::CreateOrder { .. } => None,
            OrderCommandPayload::TransitionStatus { order_id, .. }
            | OrderCommandPayload::AssignDriver { order_id, .. }
            | OrderCommandPayload::CompleteLeg { order_id, .. }
            | OrderCommandPayload::RecordPayment { order_id, .. }
            | OrderCommandPayload::RecordPendingPayment { order_id, .. }
            | OrderCommandPayload::SettleGatewayPayment { order_id, .. }
            | OrderCommandPayload::FailGatewayPayment { order_id, .. }
            | OrderCommandPayload::ApplyCredit { order_id, .. }
            | OrderCommandPayload::AssignWorkstation { order_id, .. }
            | OrderCommandPayload::ReceiveAtMainStore { order_id, .. }
            | OrderCommandPayload::ClassifyDelivery { order_id, .. } => Some(order_id),
        }
    }
}
