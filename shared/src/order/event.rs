//! Order events - immutable facts broadcast on the change feed
//!
//! Events are emitted after a command commits and are consumed by the
//! pipeline monitor and any subscribed view. They are notifications over
//! the versioned document store, not a replay log.

use super::status::{OrderStatus, WorkstationStage};
use super::types::{DeliveryClassification, ClassificationBasis, LegKind};
use crate::models::PaymentMethod;
use serde::{Deserialize, Serialize};

/// Order event - immutable audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event unique ID
    pub event_id: String,
    /// Order this event belongs to
    pub order_id: String,
    /// Server timestamp (Unix milliseconds), set when the event is created
    pub timestamp: i64,
    /// Actor who triggered this event
    pub actor_id: String,
    /// Actor name (snapshot for audit)
    pub actor_name: String,
    /// Command that triggered this event (for audit tracing)
    pub command_id: String,
    /// Event type
    pub event_type: OrderEventType,
    /// Event payload
    pub payload: EventPayload,
}

/// Event type enumeration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEventType {
    // Lifecycle
    OrderCreated,
    StatusChanged,

    // Door-to-door legs
    DriverAssigned,
    LegCompleted,

    // Payments
    PaymentRecorded,
    PaymentInitiated,
    PaymentSettled,
    PaymentFailed,
    CreditApplied,

    // Routing
    WorkstationAssigned,
    ReceivedAtMainStore,
    DeliveryClassified,
}

impl std::fmt::Display for OrderEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderEventType::OrderCreated => "ORDER_CREATED",
            OrderEventType::StatusChanged => "STATUS_CHANGED",
            OrderEventType::DriverAssigned => "DRIVER_ASSIGNED",
            OrderEventType::LegCompleted => "LEG_COMPLETED",
            OrderEventType::PaymentRecorded => "PAYMENT_RECORDED",
            OrderEventType::PaymentInitiated => "PAYMENT_INITIATED",
            OrderEventType::PaymentSettled => "PAYMENT_SETTLED",
            OrderEventType::PaymentFailed => "PAYMENT_FAILED",
            OrderEventType::CreditApplied => "CREDIT_APPLIED",
            OrderEventType::WorkstationAssigned => "WORKSTATION_ASSIGNED",
            OrderEventType::ReceivedAtMainStore => "RECEIVED_AT_MAIN_STORE",
            OrderEventType::DeliveryClassified => "DELIVERY_CLASSIFIED",
        };
        write!(f, "{}", s)
    }
}

/// Event payload variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    // ========== Lifecycle ==========
    OrderCreated {
        branch_id: String,
        customer_id: String,
        garment_count: usize,
        total_amount: f64,
    },

    StatusChanged {
        from: OrderStatus,
        to: OrderStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
        /// Set when `to` is terminal
        terminal: bool,
    },

    // ========== Door-to-door legs ==========
    DriverAssigned {
        leg: LegKind,
        driver_id: String,
    },

    LegCompleted {
        leg: LegKind,
        completed_at: i64,
    },

    // ========== Payments ==========
    PaymentRecorded {
        transaction_id: String,
        method: PaymentMethod,
        amount: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        tendered: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        change: Option<f64>,
        paid_amount_after: f64,
    },

    PaymentInitiated {
        transaction_id: String,
        method: PaymentMethod,
        amount: f64,
        redirect_reference: String,
    },

    PaymentSettled {
        transaction_id: String,
        amount: f64,
        paid_amount_after: f64,
    },

    PaymentFailed {
        transaction_id: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },

    CreditApplied {
        transaction_id: String,
        amount: f64,
        paid_amount_after: f64,
    },

    // ========== Routing ==========
    WorkstationAssigned {
        stage: WorkstationStage,
        #[serde(skip_serializing_if = "Option::is_none")]
        handler_id: Option<String>,
    },

    ReceivedAtMainStore {
        batch_id: String,
        main_store_branch_id: String,
    },

    DeliveryClassified {
        classification: DeliveryClassification,
        basis: ClassificationBasis,
    },
}

impl OrderEvent {
    /// Build an event with a fresh id and server timestamp
    pub fn new(
        order_id: String,
        actor_id: String,
        actor_name: String,
        command_id: String,
        event_type: OrderEventType,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            order_id,
            // Server timestamp is always set here - this is authoritative
            timestamp: crate::util::now_millis(),
            actor_id,
            actor_name,
            command_id,
            event_type,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_wire_format_is_screaming_snake_case() {
        let payload = EventPayload::StatusChanged {
            from: OrderStatus::Received,
            to: OrderStatus::Queued,
            note: None,
            terminal: false,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "STATUS_CHANGED");
        assert_eq!(json["from"], "RECEIVED");
        assert_eq!(json["to"], "QUEUED");
        // Absent note must not appear on the wire
        assert!(json.get("note").is_none());
    }

    #[test]
    fn test_event_carries_server_timestamp_and_ids() {
        let event = OrderEvent::new(
            "MAIN-20260828-10001".into(),
            "pos-1".into(),
            "Front Desk".into(),
            "cmd-1".into(),
            OrderEventType::DriverAssigned,
            EventPayload::DriverAssigned {
                leg: LegKind::Delivery,
                driver_id: "drv-1".into(),
            },
        );
        assert!(!event.event_id.is_empty());
        assert!(event.timestamp > 0);
        assert_eq!(event.command_id, "cmd-1");
    }
}
