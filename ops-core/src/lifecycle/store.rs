//! Versioned order store
//!
//! An in-memory document map standing in for the document database: each
//! order carries a version, and every write is a compare-and-swap against
//! the version the writer last read. The persistence engine behind this
//! interface is deliberately unspecified; anything with per-document
//! optimistic concurrency can back it.

use dashmap::DashMap;
use shared::order::Order;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Order not found: {0}")]
    NotFound(String),

    #[error("Order already exists: {0}")]
    AlreadyExists(String),

    #[error("Version conflict on {order_id}: expected {expected}, found {found}")]
    VersionConflict {
        order_id: String,
        expected: u64,
        found: u64,
    },
}

#[derive(Debug, Clone)]
struct VersionedOrder {
    order: Order,
    version: u64,
}

/// In-memory versioned document store for orders
#[derive(Debug, Default)]
pub struct OrderStore {
    orders: DashMap<String, VersionedOrder>,
}

impl OrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly created order at version 1
    pub fn insert_new(&self, order: Order) -> Result<u64, StoreError> {
        let order_id = order.order_id.clone();
        match self.orders.entry(order_id.clone()) {
            dashmap::Entry::Occupied(_) => Err(StoreError::AlreadyExists(order_id)),
            dashmap::Entry::Vacant(slot) => {
                slot.insert(VersionedOrder { order, version: 1 });
                Ok(1)
            }
        }
    }

    /// Read an order together with the version the caller must CAS against
    pub fn get(&self, order_id: &str) -> Result<(Order, u64), StoreError> {
        self.orders
            .get(order_id)
            .map(|v| (v.order.clone(), v.version))
            .ok_or_else(|| StoreError::NotFound(order_id.to_string()))
    }

    /// Compare-and-swap write. Succeeds only when the stored version still
    /// equals `expected_version`; returns the new version.
    pub fn compare_and_put(
        &self,
        order: Order,
        expected_version: u64,
    ) -> Result<u64, StoreError> {
        let order_id = order.order_id.clone();
        let mut entry = self
            .orders
            .get_mut(&order_id)
            .ok_or_else(|| StoreError::NotFound(order_id.clone()))?;
        if entry.version != expected_version {
            return Err(StoreError::VersionConflict {
                order_id,
                expected: expected_version,
                found: entry.version,
            });
        }
        entry.order = order;
        entry.version += 1;
        Ok(entry.version)
    }

    /// All non-terminal orders (the pipeline aggregator's working set)
    pub fn active_orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|v| !v.order.is_terminal())
            .map(|v| v.order.clone())
            .collect()
    }

    /// All orders, regardless of status
    pub fn all_orders(&self) -> Vec<Order> {
        self.orders.iter().map(|v| v.order.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}
