//! Status registry - the valid-transition table for the order lifecycle
//!
//! The registry is a pure function table: each status knows its display
//! label, its badge color (styling metadata only, never consulted by
//! logic), and the set of statuses an order may move to next. The state
//! machine in ops-core validates every transition against this table.

use serde::{Deserialize, Serialize};

/// Top-level order status
///
/// Processing path:
/// `received → queued → washing → drying → ironing → quality_check →
/// packaging → ready`, then either the delivery path
/// (`queued_for_delivery → out_for_delivery → delivered`) or in-store
/// collection (`collected`). `delivered` and `collected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Received,
    Queued,
    Washing,
    Drying,
    Ironing,
    QualityCheck,
    Packaging,
    Ready,
    QueuedForDelivery,
    OutForDelivery,
    Delivered,
    Collected,
}

/// Display metadata for a status
#[derive(Debug, Clone, Copy, Serialize)]
pub struct StatusMeta {
    pub label: &'static str,
    /// Badge color for dashboards (hex). Not consulted by any logic.
    pub color: &'static str,
}

impl OrderStatus {
    /// All statuses in pipeline order
    pub const ALL: &'static [OrderStatus] = &[
        OrderStatus::Received,
        OrderStatus::Queued,
        OrderStatus::Washing,
        OrderStatus::Drying,
        OrderStatus::Ironing,
        OrderStatus::QualityCheck,
        OrderStatus::Packaging,
        OrderStatus::Ready,
        OrderStatus::QueuedForDelivery,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
        OrderStatus::Collected,
    ];

    /// Valid next statuses from this one
    pub fn valid_next(self) -> &'static [OrderStatus] {
        match self {
            OrderStatus::Received => &[OrderStatus::Queued],
            OrderStatus::Queued => &[OrderStatus::Washing],
            OrderStatus::Washing => &[OrderStatus::Drying],
            OrderStatus::Drying => &[OrderStatus::Ironing],
            OrderStatus::Ironing => &[OrderStatus::QualityCheck],
            OrderStatus::QualityCheck => &[OrderStatus::Packaging],
            OrderStatus::Packaging => &[OrderStatus::Ready],
            OrderStatus::Ready => &[
                OrderStatus::QueuedForDelivery,
                OrderStatus::OutForDelivery,
                OrderStatus::Collected,
            ],
            OrderStatus::QueuedForDelivery => &[OrderStatus::OutForDelivery],
            OrderStatus::OutForDelivery => &[OrderStatus::Delivered],
            OrderStatus::Delivered | OrderStatus::Collected => &[],
        }
    }

    /// Whether `target` is a valid transition from this status
    pub fn can_transition_to(self, target: OrderStatus) -> bool {
        self.valid_next().contains(&target)
    }

    /// Terminal statuses end the lifecycle
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Collected)
    }

    /// Display metadata (label + badge color)
    pub fn meta(self) -> StatusMeta {
        match self {
            OrderStatus::Received => StatusMeta { label: "Received", color: "#64748b" },
            OrderStatus::Queued => StatusMeta { label: "Queued", color: "#94a3b8" },
            OrderStatus::Washing => StatusMeta { label: "Washing", color: "#3b82f6" },
            OrderStatus::Drying => StatusMeta { label: "Drying", color: "#f59e0b" },
            OrderStatus::Ironing => StatusMeta { label: "Ironing", color: "#f97316" },
            OrderStatus::QualityCheck => StatusMeta { label: "Quality Check", color: "#a855f7" },
            OrderStatus::Packaging => StatusMeta { label: "Packaging", color: "#14b8a6" },
            OrderStatus::Ready => StatusMeta { label: "Ready", color: "#22c55e" },
            OrderStatus::QueuedForDelivery => StatusMeta { label: "Queued for Delivery", color: "#0ea5e9" },
            OrderStatus::OutForDelivery => StatusMeta { label: "Out for Delivery", color: "#6366f1" },
            OrderStatus::Delivered => StatusMeta { label: "Delivered", color: "#16a34a" },
            OrderStatus::Collected => StatusMeta { label: "Collected", color: "#15803d" },
        }
    }

    /// Display label
    pub fn label(self) -> &'static str {
        self.meta().label
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Workstation processing sub-stage
///
/// Tracked per order alongside the top-level status. Every stage except
/// `inspection` has a top-level counterpart; assigning such a stage must
/// also move the top-level status through the registry so the two fields
/// cannot drift.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkstationStage {
    Inspection,
    Washing,
    Drying,
    Ironing,
    QualityCheck,
    Packaging,
}

impl WorkstationStage {
    /// Top-level status this stage corresponds to, if any.
    ///
    /// `inspection` happens while the order is still `received`/`queued`
    /// and has no counterpart.
    pub fn top_level_status(self) -> Option<OrderStatus> {
        match self {
            WorkstationStage::Inspection => None,
            WorkstationStage::Washing => Some(OrderStatus::Washing),
            WorkstationStage::Drying => Some(OrderStatus::Drying),
            WorkstationStage::Ironing => Some(OrderStatus::Ironing),
            WorkstationStage::QualityCheck => Some(OrderStatus::QualityCheck),
            WorkstationStage::Packaging => Some(OrderStatus::Packaging),
        }
    }
}

impl std::fmt::Display for WorkstationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkstationStage::Inspection => "inspection",
            WorkstationStage::Washing => "washing",
            WorkstationStage::Drying => "drying",
            WorkstationStage::Ironing => "ironing",
            WorkstationStage::QualityCheck => "quality_check",
            WorkstationStage::Packaging => "packaging",
        };
        write!(f, "{}", s)
    }
}
