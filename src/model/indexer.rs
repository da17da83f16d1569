//! Typed responses from the block-indexer API.
//!
//! yoctoNEAR balance fields stay strings on these structs (they do not fit
//! in u64); the `*_near` helpers convert at the chain's fixed 24 decimals.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::transform::yocto_to_near;

/// Page envelope used by the indexer's paginated endpoints. Callers must
/// iterate pages 2..=pages themselves.
#[derive(Debug, Clone, Deserialize)]
pub struct Paginated<T> {
    pub records: Vec<T>,
    pub pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockTimes {
    /// Average block time in seconds over the sampled window.
    pub avg: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainStatus {
    #[serde(default)]
    pub last_block_height: Option<i64>,
    #[serde(default)]
    pub last_block_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Validator {
    pub account_id: String,
    pub stake: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub last_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub produced_blocks: Option<i64>,
    #[serde(default)]
    pub efficiency: Option<f64>,
    #[serde(default)]
    pub reward_fee: Option<f64>,
}

impl Validator {
    pub fn stake_near(&self) -> Option<f64> {
        yocto_to_near(&self.stake)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorEpoch {
    #[serde(default)]
    pub epoch_id: Option<String>,
    pub staking_balance: String,
    #[serde(default)]
    pub last_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub produced_blocks: Option<i64>,
}

impl ValidatorEpoch {
    pub fn staking_balance_near(&self) -> Option<f64> {
        yocto_to_near(&self.staking_balance)
    }
}
