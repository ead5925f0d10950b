//! Order document - the aggregate root of the lifecycle engine
//!
//! The order is the unit of optimistic concurrency: the engine's store
//! versions each document and every write is a compare-and-swap.

use super::status::{OrderStatus, WorkstationStage};
use super::types::{
    ClassificationBasis, DeliveryClassification, Garment, RoutingStatus, ServiceLeg,
    StatusHistoryEntry,
};
use crate::models::{Transaction, TransactionStatus};
use serde::{Deserialize, Serialize};

/// Derived payment state - recomputed, never stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Partial,
    Paid,
}

/// The order document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Branch-scoped, human-readable id, e.g. "WESTLANDS-20260828-10012"
    pub order_id: String,
    pub customer_id: String,
    /// Branch the order was taken at
    pub branch_id: String,
    pub status: OrderStatus,
    /// Append-only audit trail; last entry's status equals `status`
    pub status_history: Vec<StatusHistoryEntry>,
    pub garments: Vec<Garment>,
    pub total_amount: f64,
    /// Sum of completed transaction amounts; never exceeds `total_amount`
    #[serde(default)]
    pub paid_amount: f64,
    /// Transactions settling this order (partial payments allowed)
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_completion: Option<i64>,

    // === Inter-branch routing ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_status: Option<RoutingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin_branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_branch_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_workstation_stage: Option<WorkstationStage>,

    // === Door-to-door service ===
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<ServiceLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<ServiceLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_classification: Option<DeliveryClassification>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_basis: Option<ClassificationBasis>,

    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a new order in `received` with its first history entry
    pub fn new(order_id: String, customer_id: String, branch_id: String, actor: String) -> Self {
        let now = crate::util::now_millis();
        Self {
            order_id,
            customer_id,
            branch_id: branch_id.clone(),
            status: OrderStatus::Received,
            status_history: vec![StatusHistoryEntry {
                status: OrderStatus::Received,
                timestamp: now,
                updated_by: actor,
                note: None,
            }],
            garments: Vec::new(),
            total_amount: 0.0,
            paid_amount: 0.0,
            transactions: Vec::new(),
            estimated_completion: None,
            actual_completion: None,
            routing_status: None,
            origin_branch_id: Some(branch_id),
            processing_branch_id: None,
            assigned_workstation_stage: None,
            pickup: None,
            delivery: None,
            delivery_classification: None,
            classification_basis: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a history entry, clamping the timestamp so the trail stays
    /// non-decreasing even across clock steps.
    pub fn push_history(&mut self, mut entry: StatusHistoryEntry) {
        if let Some(last) = self.status_history.last()
            && entry.timestamp < last.timestamp
        {
            entry.timestamp = last.timestamp;
        }
        self.status = entry.status;
        self.updated_at = entry.timestamp;
        self.status_history.push(entry);
    }

    /// Timestamp of the last status change (dwell-time anchor)
    pub fn last_status_change(&self) -> i64 {
        self.status_history
            .last()
            .map(|e| e.timestamp)
            .unwrap_or(self.created_at)
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Remaining amount to pay
    pub fn remaining_amount(&self) -> f64 {
        (self.total_amount - self.paid_amount).max(0.0)
    }

    pub fn is_fully_paid(&self) -> bool {
        self.paid_amount >= self.total_amount
    }

    /// Derived payment status: paid / partial / pending
    pub fn payment_status(&self) -> PaymentStatus {
        if self.paid_amount >= self.total_amount {
            PaymentStatus::Paid
        } else if self.paid_amount > 0.0 {
            PaymentStatus::Partial
        } else {
            PaymentStatus::Pending
        }
    }

    /// Overdue: estimated completion is past and nothing actually completed
    pub fn is_overdue(&self, now_millis: i64) -> bool {
        self.actual_completion.is_none()
            && self
                .estimated_completion
                .is_some_and(|eta| eta < now_millis)
    }

    /// Find a transaction by id
    pub fn transaction(&self, transaction_id: &str) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|t| t.transaction_id == transaction_id)
    }

    pub fn transaction_mut(&mut self, transaction_id: &str) -> Option<&mut Transaction> {
        self.transactions
            .iter_mut()
            .find(|t| t.transaction_id == transaction_id)
    }

    /// Sum of completed transaction amounts
    pub fn completed_transaction_total(&self) -> f64 {
        self.transactions
            .iter()
            .filter(|t| t.status == TransactionStatus::Completed)
            .map(|t| t.amount)
            .sum()
    }
}
