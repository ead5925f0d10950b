//! Shared types for the order lifecycle

use super::status::{OrderStatus, WorkstationStage};
use serde::{Deserialize, Serialize};

// ============================================================================
// Status History
// ============================================================================

/// One entry in an order's append-only status audit trail.
///
/// The trail is monotonically appended, never rewritten; the last entry's
/// status always equals the order's current status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub status: OrderStatus,
    /// Server timestamp (Unix milliseconds), non-decreasing across entries
    pub timestamp: i64,
    pub updated_by: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// Garments
// ============================================================================

/// Garment input - for order creation (without instance id)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GarmentInput {
    /// Garment type, e.g. "shirt", "duvet"
    pub garment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Services requested, e.g. ["wash", "iron"]
    pub services: Vec<String>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Staff member who handled a garment at a workstation stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageHandler {
    pub stage: WorkstationStage,
    pub staff_id: String,
    pub timestamp: i64,
}

/// Garment line item - owned exclusively by its order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Garment {
    pub garment_id: String,
    pub garment_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub services: Vec<String>,
    pub price: f64,
    /// Per-garment status mirror (optional; top-level status is authoritative)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    /// Staff who touched this garment, per workstation stage
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage_handlers: Vec<StageHandler>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inspection_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

// ============================================================================
// Pickup / Delivery Legs
// ============================================================================

/// Which leg of the door-to-door service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegKind {
    Pickup,
    Delivery,
}

impl std::fmt::Display for LegKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LegKind::Pickup => write!(f, "pickup"),
            LegKind::Delivery => write!(f, "delivery"),
        }
    }
}

/// Computed leg status - never stored
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LegStatus {
    Pending,
    Scheduled,
    Completed,
}

/// One pickup or delivery leg of an order
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceLeg {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_driver_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<i64>,
}

impl ServiceLeg {
    /// Leg status is derived from the three optional fields
    pub fn status(&self) -> LegStatus {
        if self.completed_time.is_some() {
            LegStatus::Completed
        } else if self.scheduled_time.is_some() {
            LegStatus::Scheduled
        } else {
            LegStatus::Pending
        }
    }
}

// ============================================================================
// Delivery Classification
// ============================================================================

/// Small vs bulk delivery
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliveryClassification {
    Small,
    Bulk,
}

/// How the classification was set
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationBasis {
    Auto,
    Manual,
}

// ============================================================================
// Routing
// ============================================================================

/// Inter-branch routing status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingStatus {
    AwaitingTransfer,
    InTransit,
    AtMainStore,
}

// ============================================================================
// Payments
// ============================================================================

/// Payment input for recording a synchronous payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentInput {
    pub method: crate::models::PaymentMethod,
    pub amount: f64,
    /// Cash tendered (cash payments only); change is computed server-side
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tendered: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Contact channel for asynchronous gateway payments
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactInfo {
    /// Required for mobile-money push prompts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ============================================================================
// Order Creation
// ============================================================================

/// Input for creating a new order at POS entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrderInput {
    pub customer_id: String,
    pub branch_id: String,
    pub garments: Vec<GarmentInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pickup: Option<ServiceLeg>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery: Option<ServiceLeg>,
}

// ============================================================================
// Command Response
// ============================================================================

/// Command response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    /// The command ID this responds to
    pub command_id: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Order ID the command acted on (set for CreateOrder)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Error details if failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<CommandError>,
}

impl CommandResponse {
    pub fn success(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            error: None,
        }
    }

    pub fn error(command_id: String, error: CommandError) -> Self {
        Self {
            command_id,
            success: false,
            order_id: None,
            error: Some(error),
        }
    }

    /// Success response for a command that was already applied, echoing the
    /// order id cached from the first application when known
    pub fn duplicate(command_id: String, order_id: Option<String>) -> Self {
        Self {
            command_id,
            success: true,
            order_id,
            error: None,
        }
    }
}

/// Command error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandError {
    pub code: CommandErrorCode,
    pub message: String,
}

impl CommandError {
    pub fn new(code: CommandErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Command error codes (frontend handles localization)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandErrorCode {
    OrderNotFound,
    InvalidTransition,
    InvalidAmount,
    AmountExceedsBalance,
    NotAssigned,
    AlreadyCompleted,
    AlreadyReceived,
    MissingContact,
    InsufficientCredit,
    TransactionNotFound,
    ConcurrentModification,
    GatewayError,
    InvalidOperation,
    DuplicateCommand,
    InternalError,
}
