//! Manager error types and wire mapping

use crate::lifecycle::store::StoreError;
use crate::lifecycle::traits::OrderError;
use shared::order::{CommandError, CommandErrorCode};
use thiserror::Error;

/// Errors surfaced by the lifecycle manager
#[derive(Debug, Error)]
pub enum ManagerError {
    #[error("Order error: {0}")]
    Order(#[from] OrderError),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order already exists: {0}")]
    OrderAlreadyExists(String),

    #[error("Concurrent modification on order {0}, retry the command")]
    ConcurrentModification(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ManagerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => ManagerError::OrderNotFound(id),
            StoreError::AlreadyExists(id) => ManagerError::OrderAlreadyExists(id),
            StoreError::VersionConflict { order_id, .. } => {
                ManagerError::ConcurrentModification(order_id)
            }
        }
    }
}

fn order_error_code(err: &OrderError) -> CommandErrorCode {
    match err {
        OrderError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
        OrderError::InvalidTransition { .. } => CommandErrorCode::InvalidTransition,
        OrderError::InvalidAmount => CommandErrorCode::InvalidAmount,
        OrderError::AmountExceedsBalance { .. } => CommandErrorCode::AmountExceedsBalance,
        OrderError::NotAssigned(_) => CommandErrorCode::NotAssigned,
        OrderError::AlreadyCompleted(_) => CommandErrorCode::AlreadyCompleted,
        OrderError::MissingContact(_) => CommandErrorCode::MissingContact,
        OrderError::TransactionNotFound(_) => CommandErrorCode::TransactionNotFound,
        OrderError::InvalidOperation(_) => CommandErrorCode::InvalidOperation,
    }
}

impl From<&ManagerError> for CommandError {
    fn from(err: &ManagerError) -> Self {
        let code = match err {
            ManagerError::Order(e) => order_error_code(e),
            ManagerError::OrderNotFound(_) => CommandErrorCode::OrderNotFound,
            ManagerError::OrderAlreadyExists(_) => CommandErrorCode::InvalidOperation,
            ManagerError::ConcurrentModification(_) => CommandErrorCode::ConcurrentModification,
            ManagerError::Internal(_) => CommandErrorCode::InternalError,
        };
        CommandError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_not_found_maps_to_order_not_found() {
        let err: ManagerError = StoreError::NotFound("o-1".into()).into();
        let wire: CommandError = (&err).into();
        assert_eq!(wire.code, CommandErrorCode::OrderNotFound);
    }

    #[test]
    fn test_version_conflict_maps_to_concurrent_modification() {
        let err: ManagerError = StoreError::VersionConflict {
            order_id: "o-1".into(),
            expected: 1,
            found: 2,
        }
        .into();
        let wire: CommandError = (&err).into();
        assert_eq!(wire.code, CommandErrorCode::ConcurrentModification);
    }

    #[test]
    fn test_domain_errors_keep_their_codes() {
        let err = ManagerError::Order(OrderError::InvalidAmount);
        let wire: CommandError = (&err).into();
        assert_eq!(wire.code, CommandErrorCode::InvalidAmount);
    }
}
