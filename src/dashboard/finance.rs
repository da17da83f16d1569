//! DEX finance panels: reward claims, pool activity, token prices, TVL.
//!
//! The USD panels run the full pipeline: raw amounts from a query table,
//! decimal normalization against the token registry, then the as-of-date
//! price join. Rows that never get a price stay out of the USD charts
//! rather than plotting as zero.

use chrono::NaiveTime;

use crate::chart::{
    build_time_series_chart, category_bar_chart, date_area_chart, CategoryRow, SeriesRow,
    TimeSeriesOptions,
};
use crate::client::{lookup, QueryClient, StatsClient, FINANCE_QUERIES};
use crate::error::{Error, Result};
use crate::model::{AmountRow, Row};
use crate::transform::{conversion_factors, normalize_amounts};

use super::{format_thousands, Metric, Panel};

/// Daily reward claims per token, in USD.
pub async fn rewards_by_token_panel(
    queries: &QueryClient,
    stats: &StatsClient,
    precorrection: i32,
) -> Result<Panel> {
    let rows = usd_series(
        queries,
        stats,
        "reward_claims_by_token",
        UsdColumns { token: "TOKEN_ID", date: "Date", amount: "Total Amount" },
        precorrection,
    )
    .await?;

    let options = TimeSeriesOptions::titled(
        "Reward Amount Claimed per Day (in USD)",
        "Amount (USD)",
    );

    Ok(Panel {
        title: "Ref Reward Claims by Token".to_string(),
        metrics: Vec::new(),
        chart: Some(build_time_series_chart(&rows, &options)),
    })
}

/// Which aggregate of the pool deposits/withdraws table to chart. The
/// upstream query serves both a daily total and a daily average per
/// token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolMeasure {
    Total,
    Average,
}

impl PoolMeasure {
    fn column(self) -> &'static str {
        match self {
            PoolMeasure::Total => "Total Token Amount",
            PoolMeasure::Average => "Average Average Token Amount",
        }
    }

    fn label(self) -> &'static str {
        match self {
            PoolMeasure::Total => "Total",
            PoolMeasure::Average => "Average",
        }
    }
}

/// Daily liquidity-pool deposit/withdraw volume per token, in USD.
pub async fn pool_activity_panel(
    queries: &QueryClient,
    stats: &StatsClient,
    measure: PoolMeasure,
    precorrection: i32,
) -> Result<Panel> {
    let rows = usd_series(
        queries,
        stats,
        "pool_deposit_withdraws",
        UsdColumns { token: "TOKEN", date: "Date", amount: measure.column() },
        precorrection,
    )
    .await?;

    let options = TimeSeriesOptions::titled(
        &format!("Pool Deposits and Withdraws per Day ({}, in USD)", measure.label()),
        "Amount (USD)",
    );

    Ok(Panel {
        title: format!("Ref Pool Deposits and Withdraws ({})", measure.label()),
        metrics: Vec::new(),
        chart: Some(build_time_series_chart(&rows, &options)),
    })
}

/// Daily close price for a list of `(token_id, symbol)` pairs. A pair
/// whose series cannot be fetched or parsed fails the panel.
pub async fn token_price_panel(
    stats: &StatsClient,
    tokens: &[(String, String)],
    title: &str,
) -> Result<Panel> {
    let mut rows = Vec::new();
    for (token_id, symbol) in tokens {
        let points = stats.price_history(token_id, symbol).await?;
        rows.extend(points.into_iter().map(|point| SeriesRow {
            series: point.symbol,
            at: point.at,
            value: point.price,
        }));
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));

    let options = TimeSeriesOptions::titled(title, "Price (USD)");

    Ok(Panel {
        title: title.to_string(),
        metrics: Vec::new(),
        chart: Some(build_time_series_chart(&rows, &options)),
    })
}

/// Total value locked over the trailing `period_days`.
pub async fn tvl_panel(stats: &StatsClient, period_days: u32) -> Result<Panel> {
    let table = stats.historical_tvl(period_days).await?;

    let mut rows = Vec::with_capacity(table.len());
    for row in table.iter() {
        rows.push(SeriesRow {
            series: "TVL".to_string(),
            at: row.datetime("date")?,
            value: row.number("tvl")?,
        });
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));

    let mut metrics = Vec::new();
    if let Some(latest) = rows.last() {
        metrics.push(Metric::new("Current TVL ($)", format_thousands(latest.value)));
    }

    let options = TimeSeriesOptions {
        title: "Total Value Locked".to_string(),
        y_title: "TVL ($)".to_string(),
        value_format: ",.0f".to_string(),
        ..TimeSeriesOptions::default()
    };

    Ok(Panel {
        title: "Total Value Locked".to_string(),
        metrics,
        chart: Some(date_area_chart(&rows, &options)),
    })
}

/// Leading liquidity pools ranked by locked value.
pub async fn top_pools_panel(stats: &StatsClient, top_n: usize) -> Result<Panel> {
    let table = stats.top_pools().await?;
    let bars = tvl_ranked(&table, "pool_id", Some("Pool "), top_n)?;

    let chart = category_bar_chart(&bars, "Top Pools by TVL", "TVL ($)", ",.0f", "tableau20");
    Ok(Panel { title: "Ref Top Pools".to_string(), metrics: Vec::new(), chart: Some(chart) })
}

/// Leading tokens ranked by locked value.
pub async fn top_tokens_panel(stats: &StatsClient, top_n: usize) -> Result<Panel> {
    let table = stats.top_tokens().await?;
    let bars = tvl_ranked(&table, "symbol", None, top_n)?;

    let chart = category_bar_chart(&bars, "Top Tokens by TVL", "TVL ($)", ",.0f", "tableau20");
    Ok(Panel { title: "Ref Top Tokens".to_string(), metrics: Vec::new(), chart: Some(chart) })
}

/// Rank a TVL table by locked value, labeling each bar from `label_column`
/// with an optional prefix (pool ids are bare numbers).
fn tvl_ranked(
    table: &[Row],
    label_column: &str,
    prefix: Option<&str>,
    top_n: usize,
) -> Result<Vec<CategoryRow>> {
    let mut bars = Vec::with_capacity(table.len());
    for row in table {
        let label = row.text(label_column)?;
        bars.push(CategoryRow {
            category: match prefix {
                Some(prefix) => format!("{prefix}{label}"),
                None => label,
            },
            value: row.number("tvl")?,
        });
    }
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    bars.truncate(top_n);
    Ok(bars)
}

struct UsdColumns {
    token: &'static str,
    date: &'static str,
    amount: &'static str,
}

/// Normalize a query table's raw amounts and join daily USD prices,
/// returning long-form chart rows keyed by token symbol.
async fn usd_series(
    queries: &QueryClient,
    stats: &StatsClient,
    short_name: &str,
    columns: UsdColumns,
    precorrection: i32,
) -> Result<Vec<SeriesRow>> {
    let query = lookup(FINANCE_QUERIES, short_name)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown query `{short_name}`")))?;
    let table = queries.fetch(query).await?;

    let mut amounts = Vec::with_capacity(table.len());
    for row in table.iter() {
        amounts.push(AmountRow {
            token_id: row.text(columns.token)?,
            symbol: String::new(),
            date: row.date(columns.date)?,
            raw_amount: row.text(columns.amount)?,
        });
    }

    let metadata = stats.token_metadata().await?;
    let token_ids: Vec<String> = amounts.iter().map(|row| row.token_id.clone()).collect();
    let conversions = conversion_factors(&token_ids, &metadata, precorrection);
    let normalized = normalize_amounts(&amounts, &conversions)?;

    let pairs: Vec<(String, String)> = conversions
        .values()
        .map(|conversion| (conversion.token_id.clone(), conversion.symbol.clone()))
        .collect();
    let prices = stats.price_table(&pairs).await?;

    let mut rows: Vec<SeriesRow> = prices
        .join(&normalized)
        .into_iter()
        .filter_map(|row| {
            row.amount_usd.map(|usd| SeriesRow {
                series: row.symbol,
                at: row.date.and_time(NaiveTime::MIN).and_utc(),
                value: usd,
            })
        })
        .collect();
    rows.sort_by(|a, b| a.at.cmp(&b.at));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn pool_measures_select_their_query_columns() {
        assert_eq!(PoolMeasure::Total.column(), "Total Token Amount");
        assert_eq!(PoolMeasure::Average.column(), "Average Average Token Amount");
        assert_ne!(PoolMeasure::Total.label(), PoolMeasure::Average.label());
    }

    #[test]
    fn tvl_tables_rank_descending_and_truncate() {
        let table: Vec<Row> = vec![
            json!({"pool_id": "3", "tvl": "1200.0"}),
            json!({"pool_id": "79", "tvl": "88000.0"}),
            json!({"pool_id": "11", "tvl": "5400.0"}),
        ]
        .into_iter()
        .map(|v| Row::from_value(v).unwrap())
        .collect();

        let bars = tvl_ranked(&table, "pool_id", Some("Pool "), 2).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].category, "Pool 79");
        assert_eq!(bars[0].value, 88000.0);
        assert_eq!(bars[1].category, "Pool 11");
    }
}

