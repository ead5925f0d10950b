//! CreateOrder command handler
//!
//! Fills a fresh order document from POS input: garments, computed total,
//! service legs, and an automatic Small/Bulk delivery classification.

use async_trait::async_trait;

use crate::lifecycle::money;
use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use shared::order::{
    ClassificationBasis, DeliveryClassification, EventPayload, Garment, NewOrderInput, Order,
    OrderEvent, OrderEventType,
};

/// Garment count above which a delivery is auto-classified Bulk
pub const BULK_GARMENT_THRESHOLD: usize = 10;

/// Auto classification by garment count
pub fn classify_by_count(garment_count: usize) -> DeliveryClassification {
    if garment_count > BULK_GARMENT_THRESHOLD {
        DeliveryClassification::Bulk
    } else {
        DeliveryClassification::Small
    }
}

/// CreateOrder action. The manager creates the empty document (with the
/// pre-generated order number) and inserts it after this handler runs.
#[derive(Debug, Clone)]
pub struct CreateOrderAction {
    pub input: NewOrderInput,
}

#[async_trait]
impl CommandHandler for CreateOrderAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.input.garments.is_empty() {
            return Err(OrderError::InvalidOperation(
                "order must contain at least one garment".to_string(),
            ));
        }
        for garment in &self.input.garments {
            money::validate_garment(garment)?;
        }

        order.garments = self
            .input
            .garments
            .iter()
            .map(|g| Garment {
                garment_id: uuid::Uuid::new_v4().to_string(),
                garment_type: g.garment_type.clone(),
                color: g.color.clone(),
                services: g.services.clone(),
                price: g.price,
                status: None,
                stage_handlers: Vec::new(),
                inspection_note: None,
                note: g.note.clone(),
            })
            .collect();
        order.total_amount = money::order_total(&self.input.garments);
        order.estimated_completion = self.input.estimated_completion;
        order.pickup = self.input.pickup.clone();
        order.delivery = self.input.delivery.clone();

        // Auto classification at entry; a later manual override sets
        // basis = Manual and is never recomputed.
        order.delivery_classification = Some(classify_by_count(order.garments.len()));
        order.classification_basis = Some(ClassificationBasis::Auto);

        Ok(vec![OrderEvent::new(
            order.order_id.clone(),
            metadata.actor_id.clone(),
            metadata.actor_name.clone(),
            metadata.command_id.clone(),
            OrderEventType::OrderCreated,
            EventPayload::OrderCreated {
                branch_id: order.branch_id.clone(),
                customer_id: order.customer_id.clone(),
                garment_count: order.garments.len(),
                total_amount: order.total_amount,
            },
        )])
    }
}
