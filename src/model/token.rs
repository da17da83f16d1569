//! Fungible token metadata from the DEX stats `/ft` table.

use serde::{Deserialize, Serialize};

/// Per-token decimal metadata keyed by the token's account id.
///
/// `raw_decimals` is the on-chain decimals exponent as reported upstream;
/// the display conversion factor is derived from it by
/// [`crate::transform::conversion_factors`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub token_id: String,
    pub name: String,
    pub symbol: String,
    pub raw_decimals: i32,
}
