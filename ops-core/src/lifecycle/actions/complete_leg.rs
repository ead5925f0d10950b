//! CompleteLeg command handler

use async_trait::async_trait;

use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, LegKind, Order, OrderEvent, OrderEventType};

/// CompleteLeg action - marks a pickup or delivery leg done.
///
/// Completing a leg records the fact only; moving the top-level status
/// (e.g. to OUT_FOR_DELIVERY or DELIVERED) is a separate transition so the
/// audit trail shows who confirmed what.
#[derive(Debug, Clone)]
pub struct CompleteLegAction {
    pub order_id: String,
    pub leg: LegKind,
}

#[async_trait]
impl CommandHandler for CompleteLegAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let leg = match self.leg {
            LegKind::Pickup => order.pickup.as_mut(),
            LegKind::Delivery => order.delivery.as_mut(),
        }
        .ok_or_else(|| OrderError::NotAssigned(format!("no {} leg on this order", self.leg)))?;

        if leg.assigned_driver_id.is_none() {
            return Err(OrderError::NotAssigned(format!(
                "{} leg has no assigned driver",
                self.leg
            )));
        }
        if leg.completed_time.is_some() {
            return Err(OrderError::AlreadyCompleted(format!(
                "{} leg already completed",
                self.leg
            )));
        }

        let now = shared::util::now_millis();
        leg.completed_time = Some(now);
        order.updated_at = now;

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::LegCompleted,
            EventPayload::LegCompleted {
                leg: self.leg,
                completed_at: now,
            },
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{LegStatus, ServiceLeg};

    fn metadata() -> CommandMetadata {
        CommandMetadata {
            command_id: "cmd-1".into(),
            actor_id: "drv-1".into(),
            actor_name: "Driver One".into(),
            timestamp: 1234567890,
        }
    }

    fn order_with_leg(leg: LegKind, driver: Option<&str>) -> Order {
        let mut o = Order::new(
            "MAIN-20260828-10001".into(),
            "cust-1".into(),
            "MAIN".into(),
            "pos-1".into(),
        );
        let service_leg = ServiceLeg {
            assigned_driver_id: driver.map(String::from),
            ..Default::default()
        };
        match leg {
            LegKind::Pickup => o.pickup = Some(service_leg),
            LegKind::Delivery => o.delivery = Some(service_leg),
        }
        o
    }

    #[tokio::test]
    async fn test_complete_leg_sets_completed_time() {
        let mut o = order_with_leg(LegKind::Pickup, Some("drv-1"));
        let action = CompleteLegAction {
            order_id: o.order_id.clone(),
            leg: LegKind::Pickup,
        };

        let events = action.execute(&mut o, &metadata()).await.unwrap();

        assert_eq!(o.pickup.as_ref().unwrap().status(), LegStatus::Completed);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, OrderEventType::LegCompleted);
    }

    #[tokio::test]
    async fn test_complete_without_driver_fails() {
        let mut o = order_with_leg(LegKind::Delivery, None);
        let action = CompleteLegAction {
            order_id: o.order_id.clone(),
            leg: LegKind::Delivery,
        };
        let result = action.execute(&mut o, &metadata()).await;
        assert!(matches!(result, Err(OrderError::NotAssigned(_))));
    }

    #[tokio::test]
    async fn test_complete_without_leg_fails() {
        let mut o = Order::new(
            "MAIN-20260828-10001".into(),
            "cust-1".into(),
            "MAIN".into(),
            "pos-1".into(),
        );
        let action = CompleteLegAction {
            order_id: o.order_id.clone(),
            leg: LegKind::Delivery,
        };
        assert!(matches!(
            action.execute(&mut o, &metadata()).await,
            Err(OrderError::NotAssigned(_))
        ));
    }

    #[tokio::test]
    async fn test_double_completion_fails() {
        let mut o = order_with_leg(LegKind::Pickup, Some("drv-1"));
        let action = CompleteLegAction {
            order_id: o.order_id.clone(),
            leg: LegKind::Pickup,
        };
        action.execute(&mut o, &metadata()).await.unwrap();

        let result = action.execute(&mut o, &metadata()).await;
        assert!(matches!(result, Err(OrderError::AlreadyCompleted(_))));
    }
}
