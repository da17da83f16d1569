//! Token decimal normalization.
//!
//! Raw on-chain amounts are integers in a token's smallest unit. Dividing
//! by `10 ^ effective_decimals` yields display units, where
//! `effective_decimals = raw_decimals - precorrection`. The upstream
//! amount feed bakes an extra 10^18 fixed-point scale into raw values, so
//! the precorrection defaults to 18 (see [`crate::config::NormalizerSettings`]);
//! a precorrection of 0 uses the on-chain decimals unchanged.
//!
//! BigDecimal carries the arithmetic: raw amounts routinely exceed u128,
//! and a negative effective exponent (conversion factor below 1) must
//! scale up without overflow or infinities.

use std::str::FromStr;

use bigdecimal::BigDecimal;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::model::{AmountRow, NormalizedAmountRow, TokenMetadata};

/// Decimals of the chain's native token (yoctoNEAR per NEAR).
pub const NEAR_DECIMALS: i32 = 24;

/// A token's resolved conversion exponent.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenConversion {
    pub token_id: String,
    pub symbol: String,
    pub effective_decimals: i32,
}

impl TokenConversion {
    /// `10 ^ effective_decimals`. Always finite and strictly positive; a
    /// negative exponent gives a factor below 1, never an error.
    pub fn conversion_factor(&self) -> f64 {
        10f64.powi(self.effective_decimals)
    }

    /// Raw smallest-unit amount to display units.
    pub fn normalize(&self, raw_amount: &str) -> Option<f64> {
        scale_raw_amount(raw_amount, self.effective_decimals)
    }
}

/// Resolve conversion exponents for the requested token ids.
///
/// Duplicate ids collapse to one entry. Ids absent from the metadata table
/// are silently dropped from the result; that is the upstream convention
/// ("join, drop unmatched"), not an error.
pub fn conversion_factors(
    token_ids: &[String],
    metadata: &[TokenMetadata],
    precorrection: i32,
) -> FxHashMap<String, TokenConversion> {
    let requested: FxHashSet<&str> = token_ids.iter().map(String::as_str).collect();

    let mut conversions = FxHashMap::default();
    for meta in metadata {
        if !requested.contains(meta.token_id.as_str()) {
            continue;
        }
        let effective_decimals = if precorrection != 0 {
            meta.raw_decimals - precorrection
        } else {
            meta.raw_decimals
        };
        conversions.insert(
            meta.token_id.clone(),
            TokenConversion {
                token_id: meta.token_id.clone(),
                symbol: meta.symbol.clone(),
                effective_decimals,
            },
        );
    }

    conversions
}

/// Normalize a batch of amount rows.
///
/// Rows whose token has no resolved conversion are dropped (LookupMiss
/// policy). An unparsable raw amount is a [`Error::Schema`]: a hole in a
/// USD series would silently understate the total, so the batch fails
/// instead.
pub fn normalize_amounts(
    rows: &[AmountRow],
    conversions: &FxHashMap<String, TokenConversion>,
) -> Result<Vec<NormalizedAmountRow>> {
    let mut normalized = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(conversion) = conversions.get(&row.token_id) else {
            continue;
        };
        let amount = conversion.normalize(&row.raw_amount).ok_or_else(|| {
            Error::schema(
                "raw_amount",
                format!(
                    "`{}` for {} dated {} is not numeric",
                    row.raw_amount, row.token_id, row.date
                ),
            )
        })?;
        normalized.push(NormalizedAmountRow {
            token_id: row.token_id.clone(),
            symbol: conversion.symbol.clone(),
            date: row.date,
            amount,
        });
    }
    Ok(normalized)
}

/// Scale a raw amount string by `10 ^ -effective_decimals`.
///
/// Returns None only when the input is not a valid decimal number or the
/// result does not fit a finite f64.
pub fn scale_raw_amount(raw: &str, effective_decimals: i32) -> Option<f64> {
    let value = BigDecimal::from_str(raw.trim()).ok()?;

    let scaled = if effective_decimals >= 0 {
        value / big_pow10(effective_decimals as u32)
    } else {
        value * big_pow10(effective_decimals.unsigned_abs())
    };

    let result = scaled.to_f64()?;
    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}

/// Convert a yoctoNEAR string to NEAR.
pub fn yocto_to_near(raw: &str) -> Option<f64> {
    scale_raw_amount(raw, NEAR_DECIMALS)
}

static POW10_CACHE: Lazy<[BigDecimal; 31]> =
    Lazy::new(|| std::array::from_fn(|i| BigDecimal::from(BigInt::from(10u32).pow(i as u32))));

/// Compute 10^exp as BigDecimal.
pub(crate) fn big_pow10(exp: u32) -> BigDecimal {
    if (exp as usize) < POW10_CACHE.len() {
        POW10_CACHE[exp as usize].clone()
    } else {
        BigDecimal::from(BigInt::from(10u32).pow(exp))
    }
}
