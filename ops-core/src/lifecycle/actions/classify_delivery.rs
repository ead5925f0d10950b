//! ClassifyDelivery command handler
//!
//! Manual override of the automatic small/bulk classification. Once set
//! manually, the classification is never auto-recomputed.

use async_trait::async_trait;

use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    ClassificationBasis, DeliveryClassification, EventPayload, Order, OrderEvent, OrderEventType,
};

/// ClassifyDelivery action
#[derive(Debug, Clone)]
pub struct ClassifyDeliveryAction {
    pub order_id: String,
    pub classification: DeliveryClassification,
}

#[async_trait]
impl CommandHandler for ClassifyDeliveryAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if order.delivery_classification == Some(self.classification)
            && order.classification_basis == Some(ClassificationBasis::Manual)
        {
            return Ok(vec![]);
        }

        order.delivery_classification = Some(self.classification);
        order.classification_basis = Some(ClassificationBasis::Manual);
        order.updated_at = shared::util::now_millis();

        tracing::info!(
            order_id = %order.order_id,
            classification = ?self.classification,
            "Delivery classification overridden"
        );

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::DeliveryClassified,
            EventPayload::DeliveryClassified {
                classification: self.classification,
                basis: ClassificationBasis::Manual,
            },
        )])
    }
}
