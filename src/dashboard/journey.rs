//! User journey panels: new-user growth, first contract calls, Rainbow
//! Bridge traffic and bridger interaction spread.

use crate::chart::{category_bar_chart, date_area_chart, CategoryRow, TimeSeriesOptions, SeriesRow};
use crate::client::{lookup, QueryClient, JOURNEY_QUERIES};
use crate::error::{Error, Result};
use crate::model::Row;
use crate::transform::gini;

use super::{format_thousands, format_usd, Metric, Panel};

/// Daily new accounts, with headline figures for the most recent full
/// day. The last row covers a day still in progress, so the figures come
/// from the one before it.
pub async fn new_users_panel(queries: &QueryClient) -> Result<Panel> {
    let query = lookup(JOURNEY_QUERIES, "near_user")
        .ok_or_else(|| Error::InvalidArgument("unknown query `near_user`".to_string()))?;
    let table = queries.fetch(query).await?;

    let mut rows = Vec::with_capacity(table.len());
    let mut cumulative = Vec::with_capacity(table.len());
    for row in table.iter() {
        let at = row.datetime("CREATION_DATE")?;
        rows.push(SeriesRow {
            series: "new_users".to_string(),
            at,
            value: row.number("NEW_USERS")?,
        });
        cumulative.push((at, row.number("CUMULATIVE_USERS")?));
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));
    cumulative.sort_by(|a, b| a.0.cmp(&b.0));

    let mut metrics = Vec::new();
    if rows.len() >= 2 {
        let full_day = &rows[rows.len() - 2];
        metrics.push(Metric::new("New Users", format_thousands(full_day.value)));
        metrics.push(Metric::new(
            "Cumulative New Users",
            format_thousands(cumulative[cumulative.len() - 2].1),
        ));
    }

    let options = TimeSeriesOptions {
        title: "NEAR New Users".to_string(),
        y_title: "New Users".to_string(),
        value_format: ",".to_string(),
        ..TimeSeriesOptions::default()
    };

    Ok(Panel {
        title: "New User Information".to_string(),
        metrics,
        chart: Some(date_area_chart(&rows, &options)),
    })
}

/// The first contract method new users call, for one transaction type,
/// ranked by user count. With no type given, the table's first is used.
pub async fn first_method_panel(
    queries: &QueryClient,
    tx_type: Option<&str>,
    top_n: usize,
) -> Result<Panel> {
    let query = lookup(JOURNEY_QUERIES, "first_method")
        .ok_or_else(|| Error::InvalidArgument("unknown query `first_method`".to_string()))?;
    let table = queries.fetch(query).await?;

    let tx_type = match tx_type {
        Some(tx_type) => tx_type.to_string(),
        None => table
            .first()
            .map(|row| row.text("TX_TYPE"))
            .transpose()?
            .ok_or_else(|| Error::schema("TX_TYPE", "empty first-method table"))?,
    };

    let bars = ranked_first_methods(&table, &tx_type, top_n)?;
    let chart = category_bar_chart(
        &bars,
        &format!("First method called: {tx_type}"),
        "User Count",
        ",",
        "tableau20",
    );

    Ok(Panel {
        title: "Where do NEAR users start their journey?".to_string(),
        metrics: Vec::new(),
        chart: Some(chart),
    })
}

/// Rainbow Bridge traffic: lifetime totals as headline figures and the
/// daily bridged amount as an area chart. The query serves one long
/// table where `VARIABLE` selects the aggregation level; lifetime totals
/// sit in the single `total` row and daily rows are keyed by date in
/// `GROUPER`.
pub async fn rainbow_bridge_panel(queries: &QueryClient) -> Result<Panel> {
    let query = lookup(JOURNEY_QUERIES, "rainbow")
        .ok_or_else(|| Error::InvalidArgument("unknown query `rainbow`".to_string()))?;
    let table = queries.fetch(query).await?;

    let totals = table
        .iter()
        .find(|row| row.text("VARIABLE").is_ok_and(|v| v == "total"))
        .ok_or_else(|| Error::schema("VARIABLE", "no `total` row in the bridge table"))?;

    let metrics = vec![
        Metric::new(
            "Number of Bridge Transactions",
            format_thousands(totals.number("NUMBER_OF_BRIDGE_TX")?),
        ),
        Metric::new(
            "Total Senders (Ethereum addresses)",
            format_thousands(totals.number("TOTAL_SENDERS")?),
        ),
        Metric::new(
            "Total Receivers (NEAR addresses)",
            format_thousands(totals.number("TOTAL_RECEIVERS")?),
        ),
        Metric::new(
            "Number of Tokens Bridged",
            format_thousands(totals.number("NUMBER_OF_TOKENS_BRIDGED")?),
        ),
        Metric::new(
            "Total Amount Bridged ($)",
            format_usd(totals.number("TOTAL_AMOUNT_BRIDGED")?),
        ),
        Metric::new(
            "Average Amount Bridged ($)",
            format_usd(totals.number("AVERAGE_AMOUNT_BRIDGED")?),
        ),
    ];

    let rows = daily_bridge_rows(&table)?;

    let options = TimeSeriesOptions {
        title: "Amount Bridged per Day (USD)".to_string(),
        y_title: "Total Amount Bridged".to_string(),
        value_format: ",.2f".to_string(),
        ..TimeSeriesOptions::default()
    };

    Ok(Panel {
        title: "Crossing the Rainbow Bridge".to_string(),
        metrics,
        chart: Some(date_area_chart(&rows, &options)),
    })
}

/// Rank first methods by user count for one transaction type.
fn ranked_first_methods(table: &[Row], tx_type: &str, top_n: usize) -> Result<Vec<CategoryRow>> {
    let mut bars = Vec::new();
    for row in table {
        if row.text("TX_TYPE")? != tx_type {
            continue;
        }
        bars.push(CategoryRow {
            category: row.text("FIRST_METHOD_NAME")?,
            value: row.number("USER_COUNT")?,
        });
    }
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    bars.truncate(top_n);
    Ok(bars)
}

/// Daily bridged amounts from the long bridge table, date-sorted.
fn daily_bridge_rows(table: &[Row]) -> Result<Vec<SeriesRow>> {
    let mut rows = Vec::new();
    for row in table {
        if row.text("VARIABLE")? != "date" {
            continue;
        }
        // Daily rows serve missing amounts as the text `nan`.
        let Some(amount) = row.opt_number("TOTAL_AMOUNT_BRIDGED")? else {
            continue;
        };
        rows.push(SeriesRow {
            series: "Total Amount Bridged".to_string(),
            at: row.datetime("GROUPER")?,
            value: amount,
        });
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));
    Ok(rows)
}

/// How widely bridgers interact once their assets arrive: addresses
/// interacted with per user, charted for the top `top_n` users, with the
/// Gini coefficient of the distribution as a headline metric.
pub async fn bridger_interactions_panel(queries: &QueryClient, top_n: usize) -> Result<Panel> {
    let query = lookup(JOURNEY_QUERIES, "near_interactions").ok_or_else(|| {
        Error::InvalidArgument("unknown query `near_interactions`".to_string())
    })?;
    let table = queries.fetch(query).await?;

    let mut per_user: Vec<(String, f64)> = Vec::new();
    for row in table.iter() {
        if row.text("VARIABLE")? != "num_receivers" {
            continue;
        }
        per_user.push((row.text("GROUPER")?, row.number("VALUE")?));
    }
    per_user.sort_by(|a, b| b.1.total_cmp(&a.1));

    let values: Vec<f64> = per_user.iter().map(|(_, value)| *value).collect();
    let gini_coefficient = gini(&values)?;
    let average = values.iter().sum::<f64>() / values.len() as f64;

    let metrics = vec![
        Metric::new("Gini Coefficient", format!("{gini_coefficient:.3}")),
        Metric::new("Average addresses interacted with", format!("{average:.2}")),
        Metric::new("Number of NEAR Bridgers", per_user.len().to_string()),
    ];

    let bars: Vec<CategoryRow> = per_user
        .into_iter()
        .take(top_n)
        .map(|(user, value)| CategoryRow { category: user, value })
        .collect();
    let chart = category_bar_chart(
        &bars,
        "User Metrics: Number of Addresses Interacted With",
        "Number of Addresses Interacted With",
        ",",
        "tableau20",
    );

    Ok(Panel {
        title: "NEAR Bridger: User Interactions".to_string(),
        metrics,
        chart: Some(chart),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(values: Vec<serde_json::Value>) -> Vec<Row> {
        values.into_iter().map(|v| Row::from_value(v).unwrap()).collect()
    }

    #[test]
    fn first_methods_filter_by_tx_type_and_rank_descending() {
        let table = rows(vec![
            json!({"TX_TYPE": "Function Call", "FIRST_METHOD_NAME": "mint", "USER_COUNT": "10"}),
            json!({"TX_TYPE": "Function Call", "FIRST_METHOD_NAME": "swap", "USER_COUNT": "250"}),
            json!({"TX_TYPE": "Transfer", "FIRST_METHOD_NAME": "send", "USER_COUNT": "999"}),
        ]);

        let bars = ranked_first_methods(&table, "Function Call", 30).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].category, "swap");
        assert_eq!(bars[1].category, "mint");
    }

    #[test]
    fn first_methods_truncate_to_the_requested_count() {
        let table = rows(
            (0..40)
                .map(|i| {
                    json!({
                        "TX_TYPE": "Function Call",
                        "FIRST_METHOD_NAME": format!("method_{i}"),
                        "USER_COUNT": i.to_string(),
                    })
                })
                .collect(),
        );
        assert_eq!(ranked_first_methods(&table, "Function Call", 30).unwrap().len(), 30);
    }

    #[test]
    fn bridge_rows_keep_daily_entries_and_skip_nan_amounts() {
        let table = rows(vec![
            json!({"VARIABLE": "total", "GROUPER": "nan", "TOTAL_AMOUNT_BRIDGED": "900.0"}),
            json!({"VARIABLE": "date", "GROUPER": "2022-02-02", "TOTAL_AMOUNT_BRIDGED": "500.5"}),
            json!({"VARIABLE": "date", "GROUPER": "2022-02-03", "TOTAL_AMOUNT_BRIDGED": "nan"}),
            json!({"VARIABLE": "date", "GROUPER": "2022-02-01", "TOTAL_AMOUNT_BRIDGED": "100.0"}),
            json!({"VARIABLE": "sender", "GROUPER": "a.near", "TOTAL_AMOUNT_BRIDGED": "7.0"}),
        ]);

        let daily = daily_bridge_rows(&table).unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].value, 100.0);
        assert_eq!(daily[1].value, 500.5);
        assert!(daily[0].at < daily[1].at);
    }
}
