//! DEX statistics REST client.
//!
//! Serves token metadata (`/ft`), per-token daily price history
//! (`/price-data?tokenId=`), historical TVL and the top-pool/top-token
//! rankings. Responses are effectively immutable history, so they cache
//! at the long stats TTL.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::warn;
use serde_json::Value;

use crate::cache::TtlCache;
use crate::config::Settings;
use crate::error::Result;
use crate::model::{PricePoint, Row, TokenMetadata};
use crate::transform::PriceTable;

use super::{get_json, http_client};

pub struct StatsClient {
    http: reqwest::Client,
    base_url: String,
    metadata: TtlCache<String, Arc<Vec<TokenMetadata>>>,
    prices: TtlCache<String, Arc<Vec<(DateTime<Utc>, f64)>>>,
    tables: TtlCache<String, Arc<Vec<Row>>>,
    ttl: Duration,
}

impl StatsClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            http: http_client(settings.sources.http_timeout_secs)?,
            base_url: settings.sources.stats_base_url.trim_end_matches('/').to_string(),
            metadata: TtlCache::new(settings.cache.max_capacity),
            prices: TtlCache::new(settings.cache.max_capacity),
            tables: TtlCache::new(settings.cache.max_capacity),
            ttl: Duration::from_secs(settings.cache.stats_ttl_secs),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Fungible token registry with on-chain decimals. Rows missing an id,
    /// symbol or decimals column are skipped with a warning rather than
    /// failing the whole table.
    pub async fn token_metadata(&self) -> Result<Arc<Vec<TokenMetadata>>> {
        let url = self.url("ft");
        self.metadata
            .get_or_compute("ft".to_string(), self.ttl, async {
                let values: Vec<Value> = get_json(&self.http, &url).await?;
                let mut tokens = Vec::with_capacity(values.len());
                for value in values {
                    let row = Row::from_value(value)?;
                    match parse_token(&row) {
                        Ok(token) => tokens.push(token),
                        Err(err) => warn!("skipping token registry row: {err}"),
                    }
                }
                Ok(Arc::new(tokens))
            })
            .await
    }

    /// Daily price history for one token id. Cached per id without the
    /// symbol so renames do not split cache entries; the caller tags the
    /// symbol on the way out. A row with a missing or non-numeric date or
    /// price fails the whole series: a hole in the table would silently
    /// strip USD amounts from every row joined against that day.
    pub async fn price_history(&self, token_id: &str, symbol: &str) -> Result<Vec<PricePoint>> {
        let url = self.url(&format!("price-data?tokenId={token_id}"));
        let series = self
            .prices
            .get_or_compute(token_id.to_string(), self.ttl, async {
                let values: Vec<Value> = get_json(&self.http, &url).await?;
                let mut points = Vec::with_capacity(values.len());
                for value in values {
                    let row = Row::from_value(value)?;
                    points.push(parse_price_point(&row)?);
                }
                Ok(Arc::new(points))
            })
            .await?;

        Ok(series
            .iter()
            .map(|&(at, price)| PricePoint { symbol: symbol.to_string(), at, price })
            .collect())
    }

    /// Assemble a [`PriceTable`] for `(token_id, symbol)` pairs. Any
    /// series that cannot be fetched or parsed fails the table, and with
    /// it the panel being built from it.
    pub async fn price_table(&self, tokens: &[(String, String)]) -> Result<PriceTable> {
        let mut points = Vec::new();
        for (token_id, symbol) in tokens {
            points.extend(self.price_history(token_id, symbol).await?);
        }
        Ok(PriceTable::from_series(points))
    }

    pub async fn historical_tvl(&self, period_days: u32) -> Result<Arc<Vec<Row>>> {
        self.table(&format!("historical-tvl?period={period_days}")).await
    }

    pub async fn top_pools(&self) -> Result<Arc<Vec<Row>>> {
        self.table("top-pools").await
    }

    pub async fn top_tokens(&self) -> Result<Arc<Vec<Row>>> {
        self.table("top-tokens").await
    }

    async fn table(&self, path: &str) -> Result<Arc<Vec<Row>>> {
        let url = self.url(path);
        self.tables
            .get_or_compute(url.clone(), self.ttl, async {
                let values: Vec<Value> = get_json(&self.http, &url).await?;
                let rows = values.into_iter().map(Row::from_value).collect::<Result<Vec<_>>>()?;
                Ok(Arc::new(rows))
            })
            .await
    }
}

fn parse_token(row: &Row) -> Result<TokenMetadata> {
    Ok(TokenMetadata {
        token_id: row.text("token_account_id")?,
        name: row.text("name").unwrap_or_default(),
        symbol: row.text("symbol")?,
        raw_decimals: row.integer("decimals")? as i32,
    })
}

fn parse_price_point(row: &Row) -> Result<(DateTime<Utc>, f64)> {
    Ok((row.datetime("date")?, row.number("price")?))
}
