//! Data transforms between fetch and chart construction.
//!
//! - [`decimals`] - raw amount to display-unit normalization
//! - [`price_join`] - as-of-date USD price join
//! - [`gini`] - distribution inequality metric
//!
//! All transforms are pure: they allocate new row sets and never mutate
//! their inputs.

mod decimals;
mod gini;
mod price_join;

pub use decimals::{
    conversion_factors, normalize_amounts, scale_raw_amount, yocto_to_near, TokenConversion,
    NEAR_DECIMALS,
};
pub use gini::gini;
pub use price_join::PriceTable;
