use std::time::Duration;

use crate::payments::PollSchedule;

/// Engine configuration
///
/// # Environment variables
///
/// Every setting can be overridden from the environment:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | BRANCH_ID | MAIN | Branch this node runs at |
/// | MAIN_STORE_BRANCH_ID | MAIN | Central processing branch |
/// | BUSINESS_TIMEZONE | Africa/Nairobi | Timezone for order numbering |
/// | BOTTLENECK_THRESHOLD_MINUTES | 120 | Lane dwell alert threshold |
/// | GATEWAY_POLL_INITIAL_MS | 5000 | First gateway poll delay |
/// | GATEWAY_POLL_MAX_MS | 30000 | Poll interval cap |
/// | GATEWAY_POLL_CEILING_MS | 300000 | Confirmation window |
/// | LOG_LEVEL | info | Log verbosity |
/// | LOG_DIR | (unset) | Daily-rolling log file directory |
///
/// # Example
///
/// ```ignore
/// BRANCH_ID=WESTLANDS BUSINESS_TIMEZONE=Africa/Nairobi cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Branch this node runs at
    pub branch_id: String,
    /// Central branch all satellite work is shipped to
    pub main_store_branch_id: String,
    /// Timezone the daily order-number sequence resets in
    pub business_tz: chrono_tz::Tz,
    /// Lane dwell time above which the bottleneck is flagged
    pub bottleneck_threshold_minutes: f64,
    /// Gateway confirmation polling schedule
    pub poll_schedule: PollSchedule,
    /// Log verbosity: trace | debug | info | warn | error
    pub log_level: String,
    /// Directory for daily-rolling log files; stdout only when unset
    pub log_dir: Option<String>,
}

fn env_ms(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = PollSchedule::default();
        Self {
            branch_id: std::env::var("BRANCH_ID").unwrap_or_else(|_| "MAIN".into()),
            main_store_branch_id: std::env::var("MAIN_STORE_BRANCH_ID")
                .unwrap_or_else(|_| "MAIN".into()),
            business_tz: std::env::var("BUSINESS_TIMEZONE")
                .ok()
                .and_then(|tz| tz.parse().ok())
                .unwrap_or(chrono_tz::Africa::Nairobi),
            bottleneck_threshold_minutes: std::env::var("BOTTLENECK_THRESHOLD_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(120.0),
            poll_schedule: PollSchedule {
                initial: env_ms("GATEWAY_POLL_INITIAL_MS", defaults.initial),
                max_interval: env_ms("GATEWAY_POLL_MAX_MS", defaults.max_interval),
                ceiling: env_ms("GATEWAY_POLL_CEILING_MS", defaults.ceiling),
            },
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Whether this node is the main processing store
    pub fn is_main_store(&self) -> bool {
        self.branch_id == self.main_store_branch_id
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
