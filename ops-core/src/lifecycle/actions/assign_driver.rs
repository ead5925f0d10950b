//! AssignDriver command handler

use async_trait::async_trait;

use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::order::{EventPayload, LegKind, Order, OrderEvent, OrderEventType};

/// AssignDriver action - attaches a driver to a pickup or delivery leg.
///
/// Assignment carries no precondition: dispatch may line up a driver well
/// before the order is ready, and reassignment always overwrites the field,
/// even on a completed leg, where it corrects the audit record.
#[derive(Debug, Clone)]
pub struct AssignDriverAction {
    pub order_id: String,
    pub leg: LegKind,
    pub driver_id: String,
}

#[async_trait]
impl CommandHandler for AssignDriverAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let leg = match self.leg {
            LegKind::Pickup => order.pickup.get_or_insert_default(),
            LegKind::Delivery => order.delivery.get_or_insert_default(),
        };

        leg.assigned_driver_id = Some(self.driver_id.clone());
        order.updated_at = shared::util::now_millis();

        tracing::info!(
            order_id = %order.order_id,
            leg = %self.leg,
            driver_id = %self.driver_id,
            "Driver assigned"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::DriverAssigned,
            EventPayload::DriverAssigned {
                leg: self.leg,
                driver_id: self.driver_id.clone(),
            },
        )])
    }
}
