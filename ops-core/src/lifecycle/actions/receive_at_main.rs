//! ReceiveAtMainStore command handler
//!
//! Applied per order when a transfer batch is checked in at the main store.
//! The order is re-homed to the main store branch and parked at the
//! inspection stage awaiting workstation routing.

use async_trait::async_trait;

use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, Order, OrderEvent, OrderEventType, RoutingStatus, StatusHistoryEntry,
    WorkstationStage,
};

/// ReceiveAtMainStore action
#[derive(Debug, Clone)]
pub struct ReceiveAtMainAction {
    pub order_id: String,
    pub batch_id: String,
    pub main_store_branch_id: String,
}

#[async_trait]
impl CommandHandler for ReceiveAtMainAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if order.is_terminal() {
            return Err(OrderError::InvalidOperation(format!(
                "order {} is already {}, cannot receive at main store",
                order.order_id, order.status
            )));
        }
        if order.routing_status == Some(RoutingStatus::AtMainStore) {
            tracing::debug!(
                order_id = %order.order_id,
                batch_id = %self.batch_id,
                "Order already at main store, no-op"
            );
            return Ok(vec![]);
        }

        order.routing_status = Some(RoutingStatus::AtMainStore);
        order.processing_branch_id = Some(self.main_store_branch_id.clone());
        order.assigned_workstation_stage = Some(WorkstationStage::Inspection);
        // Audit entry at the current status; routing does not advance the
        // lifecycle by itself.
        order.push_history(StatusHistoryEntry {
            status: order.status,
            timestamp: shared::util::now_millis(),
            updated_by: metadata.actor_id.clone(),
            note: Some(format!("received at main store (batch {})", self.batch_id)),
        });

        tracing::info!(
            order_id = %order.order_id,
            batch_id = %self.batch_id,
            main_store = %self.main_store_branch_id,
            "Order received at main store"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::ReceivedAtMainStore,
            EventPayload::ReceivedAtMainStore {
                batch_id: self.batch_id.clone(),
                main_store_branch_id: self.main_store_branch_id.clone(),
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::OrderStatus;

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".into(),
            actor_id: "main-1".into(),
            actor_name: "Main Store".into(),
            timestamp: 1234567890,
        }
    }

    fn in_transit_order() -> Order {
        let mut o = Order::new(
            "WESTLANDS-20260828-10001".into(),
            "cust-1".into(),
            "WESTLANDS".into(),
            "pos-1".into(),
        );
        o.routing_status = Some(RoutingStatus::InTransit);
        o
    }

    fn action(order_id: &str) -> ReceiveAtMainAction {
        ReceiveAtMainAction {
            order_id: order_id.into(),
            batch_id: "batch-1".into(),
            main_store_branch_id: "MAIN".into(),
        }
    }

    #[tokio::test]
    async fn test_receive_rehomes_order_to_main_store() {
        let mut o = in_transit_order();
        let events = action(&o.order_id.clone())
            .execute(&mut o, &metadata())
            .await
            .unwrap();

        assert_eq!(o.routing_status, Some(RoutingStatus::AtMainStore));
        assert_eq!(o.processing_branch_id.as_deref(), Some("MAIN"));
        assert_eq!(o.origin_branch_id.as_deref(), Some("WESTLANDS"));
        assert_eq!(
            o.assigned_workstation_stage,
            Some(WorkstationStage::Inspection)
        );
        // Status unchanged, but the trail records the arrival
        assert_eq!(o.status, OrderStatus::Received);
        let last = o.status_history.last().unwrap();
        assert!(last.note.as_deref().unwrap().contains("batch-1"));
        assert_eq!(events[0].event_type, OrderEventType::ReceivedAtMainStore);
    }

    #[tokio::test]
    async fn test_receive_is_idempotent() {
        let mut o = in_transit_order();
        let id = o.order_id.clone();
        action(&id).execute(&mut o, &metadata()).await.unwrap();
        let history_len = o.status_history.len();

        let events = action(&id).execute(&mut o, &metadata()).await.unwrap();
        assert!(events.is_empty());
        assert_eq!(o.status_history.len(), history_len);
    }

    #[tokio::test]
    async fn test_receive_terminal_order_fails() {
        let mut o = in_transit_order();
        o.push_history(StatusHistoryEntry {
            status: OrderStatus::Collected,
            timestamp: shared::util::now_millis(),
            updated_by: "pos-1".into(),
            note: None,
        });

        let result = action(&o.order_id.clone()).execute(&mut o, &metadata()).await;
        assert!(matches!(result, Err(OrderError::InvalidOperation(_))));
    }
}
