//! TransitionStatus command handler
//!
//! Moves an order's top-level status through the registry, appending a
//! history entry. Transitioning to the current status is a no-op success:
//! duplicate UI submissions are expected under optimistic concurrency.

use async_trait::async_trait;

use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, Order, OrderEvent, OrderEventType, OrderStatus, StatusHistoryEntry,
};

/// TransitionStatus action
#[derive(Debug, Clone)]
pub struct TransitionStatusAction {
    pub order_id: String,
    pub target: OrderStatus,
    pub note: Option<String>,
}

/// Validate and apply one registry transition, returning the event.
///
/// Shared with workstation routing, which funnels its top-level status
/// change through the same primitive.
pub(crate) fn apply_transition(
    order: &mut Order,
    target: OrderStatus,
    metadata: &CommandMetadata,
    note: Option<String>,
) -> Result<OrderEvent, OrderError> {
    let from = order.status;
    if !from.can_transition_to(target) {
        return Err(OrderError::InvalidTransition { from, to: target });
    }

    let now = shared::util::now_millis();
    order.push_history(StatusHistoryEntry {
        status: target,
        timestamp: now,
        updated_by: metadata.actor_id.clone(),
        note: note.clone(),
    });

    if target.is_terminal() {
        order.actual_completion = Some(now);
    }

    Ok(OrderEvent::new(
        order.order_id.clone(),
        metadata.actor_id.clone(),
        metadata.actor_name.clone(),
        metadata.command_id.clone(),
        OrderEventType::StatusChanged,
        EventPayload::StatusChanged {
            from,
            to: target,
            note,
            terminal: target.is_terminal(),
        },
    ))
}

#[async_trait]
impl CommandHandler for TransitionStatusAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        // Idempotent-safe: re-submitting the current status succeeds
        // without appending history.
        if order.status == self.target {
            tracing::debug!(
                order_id = %order.order_id,
                status = %self.target,
                "Transition to current status, no-op"
            );
            return Ok(vec![]);
        }

        let event = apply_transition(order, self.target, metadata, self.note.clone())?;
        Ok(vec![event])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".into(),
            actor_id: "staff-1".into(),
            actor_name: "Test Staff".into(),
            timestamp: 1234567890,
        }
    }

    fn order() -> Order {
        Order::new(
            "MAIN-20260828-10001".into(),
            "cust-1".into(),
            "MAIN".into(),
            "staff-1".into(),
        )
    }

    #[tokio::test]
    async fn test_valid_transition_appends_history() {
        let mut o = order();
        let action = TransitionStatusAction {
            order_id: o.order_id.clone(),
            target: OrderStatus::Queued,
            note: Some("intake done".into()),
        };

        let events = action.execute(&mut o, &metadata()).await.unwrap();

        assert_eq!(o.status, OrderStatus::Queued);
        assert_eq!(o.status_history.len(), 2);
        let last = o.status_history.last().unwrap();
        assert_eq!(last.status, OrderStatus::Queued);
        assert_eq!(last.updated_by, "staff-1");
        assert_eq!(last.note.as_deref(), Some("intake done"));

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0].payload,
            EventPayload::StatusChanged {
                from: OrderStatus::Received,
                to: OrderStatus::Queued,
                terminal: false,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_invalid_transition_mutates_nothing() {
        let mut o = order();
        let before = o.clone();
        let action = TransitionStatusAction {
            order_id: o.order_id.clone(),
            target: OrderStatus::Ironing,
            note: None,
        };

        let result = action.execute(&mut o, &metadata()).await;

        assert!(matches!(
            result,
            Err(OrderError::InvalidTransition {
                from: OrderStatus::Received,
                to: OrderStatus::Ironing,
            })
        ));
        assert_eq!(o, before);
    }

    #[tokio::test]
    async fn test_transition_to_current_status_is_noop_success() {
        let mut o = order();
        let action = TransitionStatusAction {
            order_id: o.order_id.clone(),
            target: OrderStatus::Received,
            note: None,
        };

        let events = action.execute(&mut o, &metadata()).await.unwrap();

        assert!(events.is_empty());
        assert_eq!(o.status_history.len(), 1);
    }

    #[tokio::test]
    async fn test_terminal_transition_sets_actual_completion() {
        let mut o = order();
        let chain = [
            OrderStatus::Queued,
            OrderStatus::Washing,
            OrderStatus::Drying,
            OrderStatus::Ironing,
            OrderStatus::QualityCheck,
            OrderStatus::Packaging,
            OrderStatus::Ready,
            OrderStatus::Collected,
        ];
        for target in chain {
            let action = TransitionStatusAction {
                order_id: o.order_id.clone(),
                target,
                note: None,
            };
            action.execute(&mut o, &metadata()).await.unwrap();
        }

        assert_eq!(o.status, OrderStatus::Collected);
        assert!(o.actual_completion.is_some());
        // History timestamps are non-decreasing
        for pair in o.status_history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }
}
