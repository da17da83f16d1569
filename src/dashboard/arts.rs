//! NFT market panels: weekly sales volume, top projects and the most
//! expensive sales.

use chrono::{DateTime, Utc};

use crate::chart::{
    build_time_series_chart, category_bar_chart, CategoryRow, Mark, SeriesRow, TimeSeriesOptions,
};
use crate::client::{lookup, QueryClient, ARTS_QUERIES};
use crate::error::{Error, Result};
use crate::model::Row;

use super::{format_thousands, Metric, Panel};

/// Weekly NFT sales activity: sellers, buyers and sales count as bars,
/// with the latest week's volume in NEAR as a headline figure.
pub async fn nft_sales_volume_panel(queries: &QueryClient) -> Result<Panel> {
    let query = lookup(ARTS_QUERIES, "sales_volume")
        .ok_or_else(|| Error::InvalidArgument("unknown query `sales_volume`".to_string()))?;
    let table = queries.fetch(query).await?;

    let (rows, volume) = weekly_activity_rows(&table)?;

    let mut metrics = Vec::new();
    if let Some(&(_, latest)) = volume.last() {
        metrics.push(Metric::new("Latest Weekly Volume (NEAR)", format_thousands(latest)));
    }

    let options = TimeSeriesOptions {
        title: "Overall NFT volume on NEAR (weekly)".to_string(),
        y_title: "Sales Count".to_string(),
        mark: Mark::Bar,
        value_format: ",".to_string(),
        ..TimeSeriesOptions::default()
    };

    Ok(Panel {
        title: "What's happening on NEAR?".to_string(),
        metrics,
        chart: Some(build_time_series_chart(&rows, &options)),
    })
}

/// Time window for the top-projects ranking. The upstream API serves a
/// lifetime table and a trailing-week one as separate queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectWindow {
    Lifetime,
    PastWeek,
}

impl ProjectWindow {
    fn short_name(self) -> &'static str {
        match self {
            ProjectWindow::Lifetime => "top_projects",
            ProjectWindow::PastWeek => "top_projects_week",
        }
    }

    fn title(self) -> &'static str {
        match self {
            ProjectWindow::Lifetime => "Top projects by volume",
            ProjectWindow::PastWeek => "Top projects by volume, past week",
        }
    }
}

/// Top NFT projects ranked by sales volume in NEAR over the chosen
/// window.
pub async fn top_nft_projects_panel(
    queries: &QueryClient,
    window: ProjectWindow,
    top_n: usize,
) -> Result<Panel> {
    let short_name = window.short_name();
    let query = lookup(ARTS_QUERIES, short_name)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown query `{short_name}`")))?;
    let table = queries.fetch(query).await?;

    let bars = project_bars(&table, top_n)?;

    let chart = category_bar_chart(
        &bars,
        window.title(),
        "Sales Volume (NEAR)",
        ",.1f",
        "tableau20",
    );

    Ok(Panel {
        title: "The hottest NFT collections".to_string(),
        metrics: Vec::new(),
        chart: Some(chart),
    })
}

/// The most expensive NFT sales, one point per sale colored by project.
pub async fn top_nft_sales_panel(queries: &QueryClient) -> Result<Panel> {
    let query = lookup(ARTS_QUERIES, "top_sales")
        .ok_or_else(|| Error::InvalidArgument("unknown query `top_sales`".to_string()))?;
    let table = queries.fetch(query).await?;

    let mut rows = Vec::with_capacity(table.len());
    for row in table.iter() {
        rows.push(SeriesRow {
            series: row.text("PROJECT")?,
            at: row.datetime("DATETIME")?,
            value: row.number("PRICE")?,
        });
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));

    let options = TimeSeriesOptions {
        title: "Most Expensive NFT Sales".to_string(),
        y_title: "Price (NEAR)".to_string(),
        mark: Mark::Point,
        value_format: ",.1f".to_string(),
        ..TimeSeriesOptions::default()
    };

    Ok(Panel {
        title: "Most Expensive NFT Sales".to_string(),
        metrics: Vec::new(),
        chart: Some(build_time_series_chart(&rows, &options)),
    })
}

/// Fold the wide weekly table into long chart rows (one series per
/// counter column) plus the date-sorted NEAR volume column.
fn weekly_activity_rows(
    table: &[Row],
) -> Result<(Vec<SeriesRow>, Vec<(DateTime<Utc>, f64)>)> {
    let mut rows = Vec::with_capacity(table.len() * 3);
    let mut volume = Vec::with_capacity(table.len());
    for row in table {
        let at = row.datetime("DATE")?;
        for series in ["Sales Count", "Buyers", "Sellers"] {
            rows.push(SeriesRow {
                series: series.to_string(),
                at,
                value: row.number(series)?,
            });
        }
        volume.push((at, row.number("Daily Volume (NEAR)")?));
    }
    rows.sort_by(|a, b| a.at.cmp(&b.at));
    volume.sort_by(|a, b| a.0.cmp(&b.0));
    Ok((rows, volume))
}

/// Collections ranked by lifetime volume, largest first.
fn project_bars(table: &[Row], top_n: usize) -> Result<Vec<CategoryRow>> {
    let mut bars = Vec::with_capacity(table.len());
    for row in table {
        bars.push(CategoryRow {
            category: row.text("NFT Collection")?,
            value: row.number("Total Volume (NEAR)")?,
        });
    }
    bars.sort_by(|a, b| b.value.total_cmp(&a.value));
    bars.truncate(top_n);
    Ok(bars)
}
