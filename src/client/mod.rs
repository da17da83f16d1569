//! HTTP clients for the three external data sources.
//!
//! - [`query_api`] - pre-built analytics queries served as JSON row arrays
//! - [`stats`] - DEX statistics REST API (token metadata, price history,
//!   pools)
//! - [`indexer`] - block indexer with API key in the request path
//!
//! Every fetch is read-through cached (see [`crate::cache`]); TTLs come
//! from [`crate::config::CacheSettings`] and follow data volatility.

mod indexer;
mod query_api;
mod stats;

use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result};

pub use indexer::IndexerClient;
pub use query_api::{
    lookup, QueryClient, QueryInfo, ARTS_QUERIES, DIRECTORY_QUERIES, FINANCE_QUERIES,
    GOV_QUERIES, JOURNEY_QUERIES,
};
pub use stats::StatsClient;

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(Error::from)
}

/// GET a JSON document, treating any non-2xx status as a network error.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
) -> Result<T> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Network(format!("GET {url} returned {status}")));
    }
    Ok(response.json::<T>().await?)
}
