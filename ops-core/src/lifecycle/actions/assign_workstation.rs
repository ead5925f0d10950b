//! AssignWorkstation command handler
//!
//! Routes an order to a processing stage at the main store. Stages that map
//! to a top-level status (washing, drying, ...) drive the status through the
//! same transition primitive as everything else, so the stage and status can
//! never disagree. Inspection has no status counterpart and only sets the
//! stage.

use async_trait::async_trait;

use crate::lifecycle::actions::transition_status::apply_transition;
use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    EventPayload, Order, OrderEvent, OrderEventType, StageHandler, WorkstationStage,
};

/// AssignWorkstation action
#[derive(Debug, Clone)]
pub struct AssignWorkstationAction {
    pub order_id: String,
    pub stage: WorkstationStage,
    pub handler_id: Option<String>,
}

#[async_trait]
impl CommandHandler for AssignWorkstationAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        let mut events = Vec::new();

        // Status first: an invalid transition must leave the stage alone.
        if let Some(target) = self.stage.top_level_status()
            && order.status != target
        {
            events.push(apply_transition(order, target, metadata, None)?);
        }

        order.assigned_workstation_stage = Some(self.stage);

        if let Some(handler_id) = &self.handler_id {
            let now = shared::util::now_millis();
            for garment in &mut order.garments {
                garment.stage_handlers.push(StageHandler {
                    stage: self.stage,
                    staff_id: handler_id.clone(),
                    timestamp: now,
                });
            }
        }
        order.updated_at = shared::util::now_millis();

        tracing::info!(
            order_id = %order.order_id,
            stage = ?self.stage,
            handler_id = ?self.handler_id,
            "Workstation assigned"
        );

        events.push(OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::WorkstationAssigned,
            EventPayload::WorkstationAssigned {
                stage: self.stage,
                handler_id: self.handler_id.clone(),
            },
        ));
        Ok(events)
    }
}
