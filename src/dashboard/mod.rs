//! Dashboard panels: fetch, transform, chart.
//!
//! Each function here produces one [`Panel`] end to end. A panel that
//! fails to build fails alone; the snapshot binary logs the error and
//! emits a placeholder instead of aborting the other panels.

mod arts;
mod directory;
mod finance;
mod gov;
mod journey;

use serde::Serialize;

use crate::chart::ChartSpec;

pub use arts::{nft_sales_volume_panel, top_nft_projects_panel, top_nft_sales_panel, ProjectWindow};
pub use directory::user_activity_panel;
pub use finance::{
    pool_activity_panel, rewards_by_token_panel, token_price_panel, top_pools_panel,
    top_tokens_panel, tvl_panel, PoolMeasure,
};
pub use gov::{governance_panel, nakamoto_coefficient, staker_rank_panel, validator_history_panel};
pub use journey::{
    bridger_interactions_panel, first_method_panel, new_users_panel, rainbow_bridge_panel,
};

/// One headline figure shown next to a chart.
#[derive(Debug, Clone, Serialize)]
pub struct Metric {
    pub label: String,
    pub value: String,
}

impl Metric {
    pub fn new(label: &str, value: impl Into<String>) -> Self {
        Self { label: label.to_string(), value: value.into() }
    }
}

/// A rendered dashboard unit: title, headline metrics and an optional
/// chart specification.
#[derive(Debug, Clone, Serialize)]
pub struct Panel {
    pub title: String,
    pub metrics: Vec<Metric>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<ChartSpec>,
}

/// Round to an integer and group digits by thousands for metric display.
pub(crate) fn format_thousands(value: f64) -> String {
    // Metric magnitudes top out around total supply in yocto-adjusted
    // NEAR (~1e9), far below i64::MAX; the cast saturates if one ever
    // is not.
    let rounded = value.round() as i64;
    let digits = rounded.abs().to_string();
    let mut grouped = String::new();
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Thousands-grouped currency display with two decimal places.
pub(crate) fn format_usd(value: f64) -> String {
    let cents = (value * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = (cents % 100).abs();
    format!("{}.{frac:02}", format_thousands(whole as f64))
}

/// Turn a snake_case column name into a display label.
pub(crate) fn title_case(column: &str) -> String {
    column
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_formats_column_names() {
        assert_eq!(title_case("active_users"), "Active Users");
        assert_eq!(title_case("tx_per_all_users"), "Tx Per All Users");
        assert_eq!(title_case("tvl"), "Tvl");
    }

    #[test]
    fn thousands_grouping() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.4), "999");
        assert_eq!(format_thousands(1_234_567.8), "1,234,568");
        assert_eq!(format_thousands(-45_000.0), "-45,000");
    }

    #[test]
    fn usd_grouping_keeps_cents() {
        assert_eq!(format_usd(0.0), "0.00");
        assert_eq!(format_usd(1_234_567.891), "1,234,567.89");
        assert_eq!(format_usd(12.5), "12.50");
        assert_eq!(format_usd(-45_000.05), "-45,000.05");
    }
}
