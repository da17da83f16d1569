//! Typed row structures produced at the data-source boundary.
//!
//! Clients validate raw JSON into these types before any join or
//! normalization logic runs; transforms never see untyped payloads.

mod indexer;
mod price;
mod row;
mod token;

pub use indexer::{BlockTimes, ChainStatus, Paginated, Validator, ValidatorEpoch};
pub use price::{AmountRow, EnrichedAmountRow, NormalizedAmountRow, PricePoint};
pub use row::{parse_datetime_utc, Row};
pub use token::TokenMetadata;
