//! Driver roster
//!
//! Lookup layer for pickup/delivery and transfer-courier assignment.
//! Assignment commands accept any driver id; the roster is what dispatch
//! screens query to offer only active drivers.

use dashmap::DashMap;

use shared::models::Driver;

/// In-memory driver roster
#[derive(Debug, Default)]
pub struct DriverRoster {
    drivers: DashMap<String, Driver>,
}

impl DriverRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a driver record
    pub fn upsert(&self, driver: Driver) {
        self.drivers.insert(driver.id.clone(), driver);
    }

    pub fn get(&self, driver_id: &str) -> Option<Driver> {
        self.drivers.get(driver_id).map(|d| d.clone())
    }

    pub fn deactivate(&self, driver_id: &str) {
        if let Some(mut driver) = self.drivers.get_mut(driver_id) {
            driver.is_active = false;
        }
    }

    /// Active drivers, optionally narrowed to one branch. Fleet-wide
    /// drivers (no home branch) match every branch filter.
    pub fn active_drivers(&self, branch_id: Option<&str>) -> Vec<Driver> {
        self.drivers
            .iter()
            .filter(|d| d.is_active)
            .filter(|d| match (branch_id, &d.branch_id) {
                (Some(wanted), Some(home)) => wanted == home,
                _ => true,
            })
            .map(|d| d.clone())
            .collect()
    }
}
