//! Pipeline aggregator
//!
//! Turns the active order set into dashboard numbers: a lane per
//! non-terminal status with count and average dwell time, the slowest lane
//! flagged as the bottleneck, and the overdue count. The monitor task
//! recomputes on every change-feed event and publishes through a watch
//! channel so dashboards always read the latest snapshot without queueing.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;

use crate::lifecycle::OrderStore;
use shared::order::{Order, OrderEvent, OrderStatus};

const MILLIS_PER_MINUTE: f64 = 60_000.0;

/// One status lane on the dashboard
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LaneStats {
    pub status: OrderStatus,
    pub count: usize,
    /// Average time orders have sat in this lane, minutes
    pub avg_dwell_minutes: f64,
}

/// The slowest non-empty lane
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bottleneck {
    pub status: OrderStatus,
    pub avg_dwell_minutes: f64,
    /// Whether the lane is past the alerting threshold
    pub exceeds_threshold: bool,
}

/// Full pipeline snapshot
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PipelineStats {
    pub lanes: Vec<LaneStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bottleneck: Option<Bottleneck>,
    pub overdue_count: usize,
    pub active_orders: usize,
    pub computed_at: i64,
}

/// Pure aggregation over the active order set.
///
/// Lanes cover every non-terminal status in registry order, zero counts
/// included, so dashboard columns never jump around.
pub fn compute_pipeline_stats(
    orders: &[Order],
    now_millis: i64,
    bottleneck_threshold_minutes: f64,
) -> PipelineStats {
    let mut lanes: Vec<LaneStats> = OrderStatus::ALL
        .iter()
        .filter(|s| !s.is_terminal())
        .map(|s| LaneStats {
            status: *s,
            count: 0,
            avg_dwell_minutes: 0.0,
        })
        .collect();

    let mut overdue_count = 0;
    for order in orders {
        if order.is_terminal() {
            continue;
        }
        if order.is_overdue(now_millis) {
            overdue_count += 1;
        }
        let dwell = (now_millis - order.last_status_change()).max(0) as f64 / MILLIS_PER_MINUTE;
        if let Some(lane) = lanes.iter_mut().find(|l| l.status == order.status) {
            // Running average
            lane.avg_dwell_minutes =
                (lane.avg_dwell_minutes * lane.count as f64 + dwell) / (lane.count + 1) as f64;
            lane.count += 1;
        }
    }

    let bottleneck = lanes
        .iter()
        .filter(|l| l.count > 0)
        .max_by(|a, b| a.avg_dwell_minutes.total_cmp(&b.avg_dwell_minutes))
        .map(|l| Bottleneck {
            status: l.status,
            avg_dwell_minutes: l.avg_dwell_minutes,
            exceeds_threshold: l.avg_dwell_minutes > bottleneck_threshold_minutes,
        });

    PipelineStats {
        active_orders: lanes.iter().map(|l| l.count).sum(),
        lanes,
        bottleneck,
        overdue_count,
        computed_at: now_millis,
    }
}

/// Background task keeping a live pipeline snapshot
pub struct PipelineMonitor {
    store: Arc<OrderStore>,
    events: broadcast::Receiver<OrderEvent>,
    stats_tx: watch::Sender<PipelineStats>,
    bottleneck_threshold_minutes: f64,
    cancel: CancellationToken,
}

impl PipelineMonitor {
    pub fn new(
        store: Arc<OrderStore>,
        events: broadcast::Receiver<OrderEvent>,
        bottleneck_threshold_minutes: f64,
        cancel: CancellationToken,
    ) -> (Self, watch::Receiver<PipelineStats>) {
        let (stats_tx, stats_rx) = watch::channel(PipelineStats::default());
        (
            Self {
                store,
                events,
                stats_tx,
                bottleneck_threshold_minutes,
                cancel,
            },
            stats_rx,
        )
    }

    fn recompute(&self) {
        let orders = self.store.active_orders();
        let stats = compute_pipeline_stats(
            &orders,
            shared::util::now_millis(),
            self.bottleneck_threshold_minutes,
        );
        // Receivers may all be gone; keep computing for late subscribers
        let _ = self.stats_tx.send(stats);
    }

    pub async fn run(mut self) {
        self.recompute();
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Pipeline monitor shutting down");
                    break;
                }
                event = self.events.recv() => match event {
                    Ok(_) => self.recompute(),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Pipeline monitor lagged, resyncing from store");
                        self.recompute();
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::OrderLifecycleManager;
    use shared::order::{
        GarmentInput, NewOrderInput, OrderCommand, OrderCommandPayload, StatusHistoryEntry,
    };

    fn order_in(status: OrderStatus, dwell_minutes: i64, now: i64) -> Order {
        let mut o = Order::new(
            format!("MAIN-20260828-{}", shared::util::now_millis()),
            "cust-1".into(),
            "MAIN".into(),
            "pos-1".into(),
        );
        if status != OrderStatus::Received {
            o.status = status;
        }
        // Pin the dwell anchor
        o.status_history = vec![StatusHistoryEntry {
            status,
            timestamp: now - dwell_minutes * 60_000,
            updated_by: "pos-1".into(),
            note: None,
        }];
        o.status = status;
        o
    }

    #[test]
    fn test_lanes_cover_all_non_terminal_statuses() {
        let stats = compute_pipeline_stats(&[], shared::util::now_millis(), 120.0);
        assert!(stats.lanes.iter().all(|l| !l.status.is_terminal()));
        assert!(stats.lanes.iter().any(|l| l.status == OrderStatus::Washing));
        assert_eq!(stats.active_orders, 0);
        assert!(stats.bottleneck.is_none());
    }

    #[test]
    fn test_counts_and_average_dwell() {
        let now = shared::util::now_millis();
        let orders = vec![
            order_in(OrderStatus::Washing, 30, now),
            order_in(OrderStatus::Washing, 90, now),
            order_in(OrderStatus::Ready, 10, now),
        ];

        let stats = compute_pipeline_stats(&orders, now, 120.0);

        let washing = stats
            .lanes
            .iter()
            .find(|l| l.status == OrderStatus::Washing)
            .unwrap();
        assert_eq!(washing.count, 2);
        assert!((washing.avg_dwell_minutes - 60.0).abs() < 0.1);
        assert_eq!(stats.active_orders, 3);
    }

    #[test]
    fn test_bottleneck_is_slowest_lane() {
        let now = shared::util::now_millis();
        let orders = vec![
            order_in(OrderStatus::Washing, 30, now),
            order_in(OrderStatus::Ironing, 150, now),
        ];

        let stats = compute_pipeline_stats(&orders, now, 120.0);

        let bottleneck = stats.bottleneck.unwrap();
        assert_eq!(bottleneck.status, OrderStatus::Ironing);
        assert!(bottleneck.exceeds_threshold);
    }

    #[test]
    fn test_bottleneck_under_threshold_not_flagged() {
        let now = shared::util::now_millis();
        let orders = vec![order_in(OrderStatus::Drying, 45, now)];

        let stats = compute_pipeline_stats(&orders, now, 120.0);
        assert!(!stats.bottleneck.unwrap().exceeds_threshold);
    }

    #[test]
    fn test_overdue_orders_counted() {
        let now = shared::util::now_millis();
        let mut overdue = order_in(OrderStatus::Washing, 30, now);
        overdue.estimated_completion = Some(now - 3_600_000);
        let on_time = order_in(OrderStatus::Washing, 30, now);

        let stats = compute_pipeline_stats(&[overdue, on_time], now, 120.0);
        assert_eq!(stats.overdue_count, 1);
    }

    #[test]
    fn test_terminal_orders_ignored() {
        let now = shared::util::now_millis();
        let orders = vec![order_in(OrderStatus::Collected, 10, now)];
        let stats = compute_pipeline_stats(&orders, now, 120.0);
        assert_eq!(stats.active_orders, 0);
        assert_eq!(stats.overdue_count, 0);
    }

    #[tokio::test]
    async fn test_monitor_recomputes_on_events() {
        let lifecycle = Arc::new(OrderLifecycleManager::new(chrono_tz::Africa::Nairobi));
        let cancel = CancellationToken::new();
        let (monitor, mut stats_rx) = PipelineMonitor::new(
            lifecycle.store(),
            lifecycle.subscribe(),
            120.0,
            cancel.clone(),
        );
        let handle = tokio::spawn(monitor.run());

        let cmd = OrderCommand::new(
            "pos-1",
            "Front Desk",
            OrderCommandPayload::CreateOrder {
                input: NewOrderInput {
                    customer_id: "cust-1".into(),
                    branch_id: "MAIN".into(),
                    garments: vec![GarmentInput {
                        garment_type: "shirt".into(),
                        color: None,
                        services: vec!["wash".into()],
                        price: 100.0,
                        note: None,
                    }],
                    estimated_completion: None,
                    pickup: None,
                    delivery: None,
                },
            },
        );
        lifecycle.execute_command(cmd).await;

        // Wait for a snapshot that includes the new order
        loop {
            stats_rx.changed().await.unwrap();
            let stats = stats_rx.borrow().clone();
            if stats.active_orders == 1 {
                let received = stats
                    .lanes
                    .iter()
                    .find(|l| l.status == OrderStatus::Received)
                    .unwrap();
                assert_eq!(received.count, 1);
                break;
            }
        }

        cancel.cancel();
        handle.await.unwrap();
    }
}
