//! Driver model

use serde::{Deserialize, Serialize};

/// A delivery/pickup driver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Home branch; None means fleet-wide
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
    pub is_active: bool,
}
