//! Customer credit balance model

use serde::{Deserialize, Serialize};

/// A customer's prepaid/store-credit balance.
///
/// Mutated by credit-payment recording and by credit application to a
/// new order; never negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreditBalance {
    pub customer_id: String,
    pub balance: f64,
    pub updated_at: i64,
}
