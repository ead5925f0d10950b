//! Order lifecycle manager
//!
//! Single entry point for all order mutations. Every command goes through
//! the same pipeline: idempotency check, load, handler, compare-and-swap,
//! broadcast. Handlers work on a clone of the stored document, so a failed
//! command never leaves a half-applied order behind.

mod error;

pub use error::ManagerError;

use std::sync::Arc;

use chrono::Utc;
use dashmap::{DashMap, Entry};
use parking_lot::Mutex;
use tokio::sync::broadcast;

use crate::lifecycle::actions::{CommandAction, CreateOrderAction};
use crate::lifecycle::store::{OrderStore, StoreError};
use crate::lifecycle::traits::{CommandHandler, CommandMetadata};
use shared::order::{
    CommandResponse, NewOrderInput, Order, OrderCommand, OrderCommandPayload, OrderEvent,
};

/// Broadcast buffer; slow subscribers observe `Lagged` and resync from the
/// store rather than stalling writers.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Daily order-number sequence starts here, so ids sort naturally and never
/// leak how few orders a branch took.
const ORDER_SEQ_BASE: u64 = 10_000;

#[derive(Debug)]
struct DailySequence {
    date: String,
    seq: u64,
}

/// The lifecycle manager
pub struct OrderLifecycleManager {
    store: Arc<OrderStore>,
    event_tx: broadcast::Sender<OrderEvent>,
    /// Command ids reserved or applied (idempotent re-submission); the
    /// value is the order id once the command has committed
    processed: DashMap<String, Option<String>>,
    sequence: Mutex<DailySequence>,
    business_tz: chrono_tz::Tz,
    /// Fired before each store write attempt (tests inject contention here)
    #[cfg(test)]
    pre_commit: Mutex<Option<Box<dyn FnMut() + Send>>>,
}

impl OrderLifecycleManager {
    pub fn new(business_tz: chrono_tz::Tz) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store: Arc::new(OrderStore::new()),
            event_tx,
            processed: DashMap::new(),
            sequence: Mutex::new(DailySequence {
                date: String::new(),
                seq: ORDER_SEQ_BASE,
            }),
            business_tz,
            #[cfg(test)]
            pre_commit: Mutex::new(None),
        }
    }

    /// Subscribe to the change feed
    pub fn subscribe(&self) -> broadcast::Receiver<OrderEvent> {
        self.event_tx.subscribe()
    }

    pub fn store(&self) -> Arc<OrderStore> {
        self.store.clone()
    }

    pub fn get_order(&self, order_id: &str) -> Result<Order, ManagerError> {
        Ok(self.store.get(order_id)?.0)
    }

    pub fn active_orders(&self) -> Vec<Order> {
        self.store.active_orders()
    }

    /// Execute a command and answer with a wire response. Never panics and
    /// never returns Err - failures become error responses.
    pub async fn execute_command(&self, command: OrderCommand) -> CommandResponse {
        // Reserve the command id before the first await: concurrent
        // submissions of the same id must not both reach a handler. A
        // failed command releases its reservation.
        match self.processed.entry(command.command_id.clone()) {
            Entry::Occupied(reserved) => {
                let order_id = reserved.get().clone();
                tracing::debug!(
                    command_id = %command.command_id,
                    "Duplicate command, answering cached success"
                );
                return CommandResponse::duplicate(command.command_id, order_id);
            }
            Entry::Vacant(slot) => {
                slot.insert(None);
            }
        }

        match self.process_command(&command).await {
            Ok((order_id, events)) => {
                self.processed
                    .insert(command.command_id.clone(), Some(order_id.clone()));
                for event in events {
                    // Send fails only when nobody is subscribed
                    let _ = self.event_tx.send(event);
                }
                CommandResponse::success(command.command_id, Some(order_id))
            }
            Err(err) => {
                self.processed.remove(&command.command_id);
                tracing::warn!(
                    command_id = %command.command_id,
                    error = %err,
                    "Command failed"
                );
                CommandResponse::error(command.command_id, (&err).into())
            }
        }
    }

    async fn process_command(
        &self,
        command: &OrderCommand,
    ) -> Result<(String, Vec<OrderEvent>), ManagerError> {
        let metadata = CommandMetadata {
            command_id: command.command_id.clone(),
            actor_id: command.actor_id.clone(),
            actor_name: command.actor_name.clone(),
            timestamp: command.timestamp,
        };

        if let OrderCommandPayload::CreateOrder { input } = &command.payload {
            return self.create_order(input, &metadata).await;
        }

        let action = CommandAction::try_from(command)?;
        let order_id = command
            .payload
            .order_id()
            .ok_or_else(|| ManagerError::Internal("command has no order id".to_string()))?
            .to_string();

        // One retry on a version conflict: the handler is deterministic, so
        // re-running it against the fresh document is safe.
        for attempt in 0..2 {
            let (mut order, version) = self.store.get(&order_id)?;
            let events = action.execute(&mut order, &metadata).await?;

            #[cfg(test)]
            if let Some(hook) = self.pre_commit.lock().as_mut() {
                hook();
            }

            match self.store.compare_and_put(order, version) {
                Ok(_) => return Ok((order_id, events)),
                Err(StoreError::VersionConflict { .. }) if attempt == 0 => {
                    tracing::debug!(order_id = %order_id, "Version conflict, retrying");
                    continue;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Err(ManagerError::ConcurrentModification(order_id))
    }

    async fn create_order(
        &self,
        input: &NewOrderInput,
        metadata: &CommandMetadata,
    ) -> Result<(String, Vec<OrderEvent>), ManagerError> {
        let order_id = self.next_order_id(&input.branch_id);
        let mut order = Order::new(
            order_id.clone(),
            input.customer_id.clone(),
            input.branch_id.clone(),
            metadata.actor_id.clone(),
        );

        let action = CreateOrderAction {
            input: input.clone(),
        };
        let events = action.execute(&mut order, metadata).await?;

        self.store.insert_new(order)?;
        tracing::info!(order_id = %order_id, branch_id = %input.branch_id, "Order created");
        Ok((order_id, events))
    }

    /// Branch-scoped order number: `{BRANCH}-{yyyymmdd}-{seq}`, sequence
    /// resetting at the business-timezone midnight.
    fn next_order_id(&self, branch_id: &str) -> String {
        let today = Utc::now()
            .with_timezone(&self.business_tz)
            .format("%Y%m%d")
            .to_string();

        let mut seq = self.sequence.lock();
        if seq.date != today {
            seq.date = today.clone();
            seq.seq = ORDER_SEQ_BASE;
        }
        seq.seq += 1;
        format!("{}-{}-{}", branch_id, today, seq.seq)
    }
}
