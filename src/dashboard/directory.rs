//! Cross-chain user activity panel.
//!
//! Concatenates the per-chain user queries into one long-form series
//! tagged by blockchain, then charts the chosen metric with the
//! hover-rule layers. Rows dated today or later are dropped: the current
//! day is still accumulating and would always plot as a dip.

use chrono::Utc;
use log::debug;

use crate::chart::{build_time_series_chart, SeriesRow, TimeSeriesOptions};
use crate::client::{QueryClient, DIRECTORY_QUERIES};
use crate::error::Result;

use super::{title_case, Panel};

pub async fn user_activity_panel(
    queries: &QueryClient,
    metric: &str,
    log_scale: bool,
) -> Result<Panel> {
    let today = Utc::now().date_naive();
    let mut rows = Vec::new();

    for query in DIRECTORY_QUERIES {
        let table = queries.fetch(query).await?;
        let chain = query.blockchain.unwrap_or(query.short_name);
        debug!("{}: {} rows for metric {metric}", query.short_name, table.len());

        for row in table.iter() {
            let at = row.datetime("datetime")?;
            if at.date_naive() >= today {
                continue;
            }
            rows.push(SeriesRow {
                series: chain.to_string(),
                at,
                value: row.number(metric)?,
            });
        }
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));

    let label = title_case(metric);
    let options = TimeSeriesOptions {
        title: format!("Daily {label} by Blockchain"),
        y_title: label.clone(),
        log_scale,
        value_format: ",".to_string(),
        ..TimeSeriesOptions::default()
    };

    Ok(Panel {
        title: format!("Crosschain Comparison: {label}"),
        metrics: Vec::new(),
        chart: Some(build_time_series_chart(&rows, &options)),
    })
}
