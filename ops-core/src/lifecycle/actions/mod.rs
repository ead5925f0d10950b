//! Command actions - one handler per lifecycle operation
//!
//! Each action validates against the loaded order document, mutates a
//! working copy, and returns the events to broadcast. The manager owns
//! loading, compare-and-swap persistence, and broadcasting.

pub mod apply_credit;
pub mod assign_driver;
pub mod assign_workstation;
pub mod classify_delivery;
pub mod complete_leg;
pub mod create_order;
pub mod fail_gateway_payment;
pub mod receive_at_main;
pub mod record_payment;
pub mod record_pending_payment;
pub mod settle_gateway_payment;
pub mod transition_status;

pub use apply_credit::ApplyCreditAction;
pub use assign_driver::AssignDriverAction;
pub use assign_workstation::AssignWorkstationAction;
pub use classify_delivery::ClassifyDeliveryAction;
pub use complete_leg::CompleteLegAction;
pub use create_order::CreateOrderAction;
pub use fail_gateway_payment::FailGatewayPaymentAction;
pub use receive_at_main::ReceiveAtMainAction;
pub use record_payment::RecordPaymentAction;
pub use record_pending_payment::RecordPendingPaymentAction;
pub use settle_gateway_payment::SettleGatewayPaymentAction;
pub use transition_status::TransitionStatusAction;

use crate::lifecycle::traits::{CommandHandler, CommandMetadata, OrderError};
use async_trait::async_trait;
use shared::order::{Order, OrderCommand, OrderCommandPayload, OrderEvent};

/// Dispatch enum over all actions targeting an existing order.
///
/// `CreateOrder` is not convertible here: the manager pre-generates the
/// order number and inserts the fresh document itself.
pub enum CommandAction {
    TransitionStatus(TransitionStatusAction),
    AssignDriver(AssignDriverAction),
    CompleteLeg(CompleteLegAction),
    RecordPayment(RecordPaymentAction),
    RecordPendingPayment(RecordPendingPaymentAction),
    SettleGatewayPayment(SettleGatewayPaymentAction),
    FailGatewayPayment(FailGatewayPaymentAction),
    ApplyCredit(ApplyCreditAction),
    AssignWorkstation(AssignWorkstationAction),
    ReceiveAtMain(ReceiveAtMainAction),
    ClassifyDelivery(ClassifyDeliveryAction),
}

impl TryFrom<&OrderCommand> for CommandAction {
    type Error = OrderError;

    fn try_from(cmd: &OrderCommand) -> Result<Self, Self::Error> {
        let action = match &cmd.payload {
            OrderCommandPayload::CreateOrder { .. } => {
                return Err(OrderError::InvalidOperation(
                    "CreateOrder is handled by the manager, not dispatched".to_string(),
                ));
            }
            OrderCommandPayload::TransitionStatus {
                order_id,
                target,
                note,
            } => CommandAction::TransitionStatus(TransitionStatusAction {
                order_id: order_id.clone(),
                target: *target,
                note: note.clone(),
            }),
            OrderCommandPayload::AssignDriver {
                order_id,
                leg,
                driver_id,
            } => CommandAction::AssignDriver(AssignDriverAction {
                order_id: order_id.clone(),
                leg: *leg,
                driver_id: driver_id.clone(),
            }),
            OrderCommandPayload::CompleteLeg { order_id, leg } => {
                CommandAction::CompleteLeg(CompleteLegAction {
                    order_id: order_id.clone(),
                    leg: *leg,
                })
            }
            OrderCommandPayload::RecordPayment { order_id, payment } => {
                CommandAction::RecordPayment(RecordPaymentAction {
                    order_id: order_id.clone(),
                    payment: payment.clone(),
                })
            }
            OrderCommandPayload::RecordPendingPayment {
                order_id,
                transaction_id,
                method,
                amount,
                redirect_reference,
            } => CommandAction::RecordPendingPayment(RecordPendingPaymentAction {
                order_id: order_id.clone(),
                transaction_id: transaction_id.clone(),
                method: *method,
                amount: *amount,
                redirect_reference: redirect_reference.clone(),
            }),
            OrderCommandPayload::SettleGatewayPayment {
                order_id,
                transaction_id,
            } => CommandAction::SettleGatewayPayment(SettleGatewayPaymentAction {
                order_id: order_id.clone(),
                transaction_id: transaction_id.clone(),
            }),
            OrderCommandPayload::FailGatewayPayment {
                order_id,
                transaction_id,
                reason,
            } => CommandAction::FailGatewayPayment(FailGatewayPaymentAction {
                order_id: order_id.clone(),
                transaction_id: transaction_id.clone(),
                reason: reason.clone(),
            }),
            OrderCommandPayload::ApplyCredit { order_id, amount } => {
                CommandAction::ApplyCredit(ApplyCreditAction {
                    order_id: order_id.clone(),
                    amount: *amount,
                })
            }
            OrderCommandPayload::AssignWorkstation {
                order_id,
                stage,
                handler_id,
            } => CommandAction::AssignWorkstation(AssignWorkstationAction {
                order_id: order_id.clone(),
                stage: *stage,
                handler_id: handler_id.clone(),
            }),
            OrderCommandPayload::ReceiveAtMainStore {
                order_id,
                batch_id,
                main_store_branch_id,
            } => CommandAction::ReceiveAtMain(ReceiveAtMainAction {
                order_id: order_id.clone(),
                batch_id: batch_id.clone(),
                main_store_branch_id: main_store_branch_id.clone(),
            }),
            OrderCommandPayload::ClassifyDelivery {
                order_id,
                classification,
            } => CommandAction::ClassifyDelivery(ClassifyDeliveryAction {
                order_id: order_id.clone(),
                classification: *classification,
            }),
        };
        Ok(action)
    }
}

#[async_trait]
impl CommandHandler for CommandAction {
    async fn execute(
        &self,
        order: &mut Order,
        metadata: &CommandMetadata,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        match self {
            CommandAction::TransitionStatus(a) => a.execute(order, metadata).await,
            CommandAction::AssignDriver(a) => a.execute(order, metadata).await,
            CommandAction::CompleteLeg(a) => a.execute(order, metadata).await,
            CommandAction::RecordPayment(a) => a.execute(order, metadata).await,
            CommandAction::RecordPendingPayment(a) => a.execute(order, metadata).await,
            CommandAction::SettleGatewayPayment(a) => a.execute(order, metadata).await,
            CommandAction::FailGatewayPayment(a) => a.execute(order, metadata).await,
            CommandAction::ApplyCredit(a) => a.execute(order, metadata).await,
            CommandAction::AssignWorkstation(a) => a.execute(order, metadata).await,
            CommandAction::ReceiveAtMain(a) => a.execute(order, metadata).await,
            CommandAction::ClassifyDelivery(a) => a.execute(order, metadata).await,
        }
    }
}
