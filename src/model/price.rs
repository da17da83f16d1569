//! Amount and price row types flowing through the normalization pipeline.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

/// One historical price observation for a token symbol.
///
/// `at` keeps whatever sub-day resolution the source reported; the price
/// join truncates to calendar days. At most one price per (symbol, day)
/// survives into a [`crate::transform::PriceTable`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub symbol: String,
    pub at: DateTime<Utc>,
    /// USD per display unit, non-negative.
    pub price: f64,
}

/// A dated on-chain amount in raw (smallest-unit) form.
///
/// `raw_amount` stays a string: raw amounts routinely exceed u128 once the
/// upstream feed's extra 10^18 fixed-point scale is included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmountRow {
    pub token_id: String,
    pub symbol: String,
    pub date: NaiveDate,
    pub raw_amount: String,
}

/// An amount row after decimal normalization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedAmountRow {
    pub token_id: String,
    pub symbol: String,
    pub date: NaiveDate,
    /// Display units: `raw_amount / conversion_factor`.
    pub amount: f64,
}

/// A normalized amount row after the as-of-date price join.
///
/// `price` and `amount_usd` stay empty when no price exists for the row's
/// (symbol, day); the row itself is never dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedAmountRow {
    pub token_id: String,
    pub symbol: String,
    pub date: NaiveDate,
    pub amount: f64,
    pub price: Option<f64>,
    pub amount_usd: Option<f64>,
}
