//! Pre-built analytics query data source.
//!
//! Each logical query is a static record pointing at a hosted result
//! endpoint that serves the latest run as a JSON array of row objects.
//! Column values frequently arrive as strings; consumers coerce through
//! [`Row`] accessors. No authentication.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::cache::TtlCache;
use crate::config::Settings;
use crate::error::Result;
use crate::model::Row;

use super::{get_json, http_client};

/// One hosted query: where to fetch it and how pages refer to it.
#[derive(Debug, Clone, Copy)]
pub struct QueryInfo {
    pub display_name: &'static str,
    pub api_url: &'static str,
    pub short_name: &'static str,
    /// Set when the query belongs to a cross-chain comparison set.
    pub blockchain: Option<&'static str>,
}

// ============================================================================
// Query catalogs, one per dashboard page
// ============================================================================

pub const DIRECTORY_QUERIES: &[QueryInfo] = &[
    QueryInfo {
        display_name: "NEAR User Data",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/a20cb189-e613-4b4a-afb7-2d461243d6fc/data/latest",
        short_name: "near_users",
        blockchain: Some("NEAR"),
    },
    QueryInfo {
        display_name: "Ethereum User Data",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/45c7182e-83cd-4725-8d4f-f3c6228ef39d/data/latest",
        short_name: "eth_users",
        blockchain: Some("Ethereum"),
    },
    QueryInfo {
        display_name: "Solana User Data",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/a6e1f91d-6ddb-4a1e-a4a3-cf5cbc8131c6/data/latest",
        short_name: "sol_users",
        blockchain: Some("Solana"),
    },
    QueryInfo {
        display_name: "Polygon User Data",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/935f4942-6b68-42b0-b8f4-13abc00a0cc4/data/latest",
        short_name: "matic_users",
        blockchain: Some("Polygon"),
    },
    QueryInfo {
        display_name: "Algorand User Data",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/90d54dd7-0488-4b14-89dc-47c756657d62/data/latest",
        short_name: "algo_users",
        blockchain: Some("Algorand"),
    },
];

pub const FINANCE_QUERIES: &[QueryInfo] = &[
    QueryInfo {
        display_name: "Ref Reward Claims by Token",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/7f9b4890-5ad2-44c0-b596-e9f60650d927/data/latest",
        short_name: "reward_claims_by_token",
        blockchain: None,
    },
    QueryInfo {
        display_name: "Ref Pool Deposits and Withdraws",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/b2c7877e-f140-4085-bb09-4949292843a2/data/latest",
        short_name: "pool_deposit_withdraws",
        blockchain: None,
    },
];

pub const ARTS_QUERIES: &[QueryInfo] = &[
    QueryInfo {
        display_name: "Weekly NFT Sales Volume",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/6ae95685-436d-4682-8d8b-dec364692ed9/data/latest",
        short_name: "sales_volume",
        blockchain: None,
    },
    QueryInfo {
        display_name: "Top NFT Projects",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/89c38bbf-9c3b-41d1-a92e-b12d4bdce055/data/latest",
        short_name: "top_projects",
        blockchain: None,
    },
    QueryInfo {
        display_name: "Top NFT Projects, Past Week",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/b14104c2-fc26-44fb-9be9-6573b3cf2c00/data/latest",
        short_name: "top_projects_week",
        blockchain: None,
    },
    QueryInfo {
        display_name: "Most Expensive NFT Sales",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/a35024bd-71b9-4548-a121-c284c2140fdb/data/latest",
        short_name: "top_sales",
        blockchain: None,
    },
];

pub const GOV_QUERIES: &[QueryInfo] = &[
    QueryInfo {
        display_name: "NEAR Number of Stakers",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/24f17c14-f117-4848-b0d4-1365dc8bc347/data/latest",
        short_name: "stakers",
        blockchain: None,
    },
    QueryInfo {
        display_name: "NEAR Validator Activity",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/bde5b887-df37-46a8-b21f-2f86fea03c4d/data/latest",
        short_name: "validator_activity",
        blockchain: None,
    },
];

pub const JOURNEY_QUERIES: &[QueryInfo] = &[
    QueryInfo {
        display_name: "NEAR User Summary",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/ef747a3f-26e0-4d37-a875-103360fa12e1/data/latest",
        short_name: "near_user",
        blockchain: None,
    },
    QueryInfo {
        display_name: "NEAR User: First Method",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/172c237c-faec-4aa8-ad93-5a97a2b2b6d0/data/latest",
        short_name: "first_method",
        blockchain: None,
    },
    QueryInfo {
        display_name: "Rainbow Bridge",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/439ecbf1-dc9e-4fe7-912a-70695119c7d1/data/latest",
        short_name: "rainbow",
        blockchain: None,
    },
    QueryInfo {
        display_name: "Near User Interactions",
        api_url: "https://node-api.flipsidecrypto.com/api/v2/queries/082d8772-6090-496b-b276-008edc882b8a/data/latest",
        short_name: "near_interactions",
        blockchain: None,
    },
];

/// Find a catalog entry by its short name.
pub fn lookup(catalog: &'static [QueryInfo], short_name: &str) -> Option<&'static QueryInfo> {
    catalog.iter().find(|query| query.short_name == short_name)
}

// ============================================================================
// Client
// ============================================================================

/// Fetches query result tables, cached by endpoint URL.
pub struct QueryClient {
    http: reqwest::Client,
    cache: TtlCache<String, Arc<Vec<Row>>>,
    ttl: Duration,
}

impl QueryClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            http: http_client(settings.sources.http_timeout_secs)?,
            cache: TtlCache::new(settings.cache.max_capacity),
            ttl: Duration::from_secs(settings.cache.query_ttl_secs),
        })
    }

    /// Fetch one query's latest rows.
    pub async fn fetch(&self, query: &QueryInfo) -> Result<Arc<Vec<Row>>> {
        self.cache
            .get_or_compute(query.api_url.to_string(), self.ttl, async {
                let values: Vec<Value> = get_json(&self.http, query.api_url).await?;
                let rows = values.into_iter().map(Row::from_value).collect::<Result<Vec<_>>>()?;
                Ok(Arc::new(rows))
            })
            .await
    }
}
