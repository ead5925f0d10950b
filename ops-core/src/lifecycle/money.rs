//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored as `f64` in documents; all arithmetic goes through
//! `Decimal` and is rounded to 2 decimal places before being written back.

use crate::lifecycle::traits::OrderError;
use rust_decimal::prelude::*;
use shared::order::GarmentInput;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum allowed payment amount
const MAX_PAYMENT_AMOUNT: f64 = 1_000_000.0;
/// Maximum allowed price per garment
const MAX_PRICE: f64 = 1_000_000.0;

/// Convert f64 to Decimal (zero on non-finite input)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Convert Decimal back to f64, rounded to 2 decimal places
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp(DECIMAL_PLACES)
        .to_f64()
        .unwrap_or(0.0)
}

#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), OrderError> {
    if !value.is_finite() {
        return Err(OrderError::InvalidOperation(format!(
            "{} must be a finite number, got {}",
            field_name, value
        )));
    }
    Ok(())
}

/// Validate a payment amount: finite, positive, within bounds
pub fn validate_amount(amount: f64) -> Result<(), OrderError> {
    require_finite(amount, "payment amount")?;
    if amount <= 0.0 {
        return Err(OrderError::InvalidAmount);
    }
    if amount > MAX_PAYMENT_AMOUNT {
        return Err(OrderError::InvalidOperation(format!(
            "payment amount exceeds maximum allowed ({}), got {}",
            MAX_PAYMENT_AMOUNT, amount
        )));
    }
    Ok(())
}

/// Reject amounts above the outstanding balance (with tolerance)
pub fn check_outstanding(amount: f64, outstanding: f64) -> Result<(), OrderError> {
    if to_decimal(amount) > to_decimal(outstanding) + MONEY_TOLERANCE {
        return Err(OrderError::AmountExceedsBalance {
            amount,
            outstanding,
        });
    }
    Ok(())
}

/// Validate a garment line before order creation
pub fn validate_garment(garment: &GarmentInput) -> Result<(), OrderError> {
    require_finite(garment.price, "price")?;
    if garment.price < 0.0 {
        return Err(OrderError::InvalidOperation(format!(
            "price must be non-negative, got {}",
            garment.price
        )));
    }
    if garment.price > MAX_PRICE {
        return Err(OrderError::InvalidOperation(format!(
            "price exceeds maximum allowed ({}), got {}",
            MAX_PRICE, garment.price
        )));
    }
    if garment.services.is_empty() {
        return Err(OrderError::InvalidOperation(
            "garment must request at least one service".to_string(),
        ));
    }
    Ok(())
}

/// Order total from garment prices
pub fn order_total(garments: &[GarmentInput]) -> f64 {
    to_f64(garments.iter().map(|g| to_decimal(g.price)).sum())
}

/// Change for a cash payment: max(tendered - amount, 0)
pub fn cash_change(tendered: f64, amount: f64) -> f64 {
    to_f64((to_decimal(tendered) - to_decimal(amount)).max(Decimal::ZERO))
}

/// Add a settled amount to paid_amount with decimal precision
pub fn add_paid(paid_amount: f64, amount: f64) -> f64 {
    to_f64(to_decimal(paid_amount) + to_decimal(amount))
}
