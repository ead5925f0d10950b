//! Polling backoff schedule for gateway confirmation
//!
//! First check after 5s, doubling up to a 30s cap, abandoned after a 5
//! minute ceiling: 5, 10, 20, 30, 30, ... until the total wall time would
//! exceed the ceiling.

use std::time::Duration;

/// Backoff schedule for gateway status polling
#[derive(Debug, Clone, Copy)]
pub struct PollSchedule {
    pub initial: Duration,
    pub max_interval: Duration,
    /// Total wall-time ceiling; polling stops once the next wait would
    /// push past it
    pub ceiling: Duration,
}

impl Default for PollSchedule {
    fn default() -> Self {
        Self {
            initial: Duration::from_secs(5),
            max_interval: Duration::from_secs(30),
            ceiling: Duration::from_secs(300),
        }
    }
}

impl PollSchedule {
    /// Iterator over the delays before each poll attempt
    pub fn delays(&self) -> PollDelays {
        PollDelays {
            schedule: *self,
            next: self.initial,
            elapsed: Duration::ZERO,
        }
    }
}

/// Iterator produced by [`PollSchedule::delays`]
#[derive(Debug, Clone)]
pub struct PollDelays {
    schedule: PollSchedule,
    next: Duration,
    elapsed: Duration,
}

impl Iterator for PollDelays {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let delay = self.next;
        if self.elapsed + delay > self.schedule.ceiling {
            return None;
        }
        self.elapsed += delay;
        self.next = (delay * 2).min(self.schedule.max_interval);
        Some(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delays_double_then_cap() {
        let delays: Vec<u64> = PollSchedule::default()
            .delays()
            .take(5)
            .map(|d| d.as_secs())
            .collect();
        assert_eq!(delays, vec![5, 10, 20, 30, 30]);
    }

    #[test]
    fn test_total_wall_time_stays_under_ceiling() {
        let schedule = PollSchedule::default();
        let total: Duration = schedule.delays().sum();
        assert!(total <= schedule.ceiling);
        // The schedule should actually use most of the window
        assert!(total >= schedule.ceiling - schedule.max_interval);
    }

    #[test]
    fn test_custom_schedule() {
        let schedule = PollSchedule {
            initial: Duration::from_secs(1),
            max_interval: Duration::from_secs(4),
            ceiling: Duration::from_secs(10),
        };
        let delays: Vec<u64> = schedule.delays().map(|d| d.as_secs()).collect();
        // 1 + 2 + 4 = 7; another 4 would exceed 10
        assert_eq!(delays, vec![1, 2, 4]);
    }
}
