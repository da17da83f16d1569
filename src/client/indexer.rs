//! Block indexer client.
//!
//! The API key is embedded in the base path (`{base}/apikey/{key}`).
//! These endpoints track the chain head, so entries cache at the short
//! live TTL. Paginated endpoints return `{records, pages}` and pages
//! 2..=N are fetched explicitly.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::TtlCache;
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::model::{BlockTimes, ChainStatus, Paginated, Validator, ValidatorEpoch};

pub struct IndexerClient {
    http: reqwest::Client,
    base: String,
    cache: TtlCache<String, Arc<Value>>,
    ttl: Duration,
}

impl IndexerClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let base = format!(
            "{}/apikey/{}",
            settings.sources.indexer_base_url.trim_end_matches('/'),
            settings.sources.indexer_api_key
        );
        Ok(Self {
            http: super::http_client(settings.sources.http_timeout_secs)?,
            base,
            cache: TtlCache::new(settings.cache.max_capacity),
            ttl: Duration::from_secs(settings.cache.live_ttl_secs),
        })
    }

    pub async fn status(&self) -> Result<ChainStatus> {
        let value = self.fetch_cached(format!("{}/status", self.base)).await?;
        decode(&value, "status")
    }

    /// Average block time over the last `limit` blocks.
    pub async fn block_times(&self, limit: u32) -> Result<BlockTimes> {
        let value =
            self.fetch_cached(format!("{}/block_times?limit={limit}", self.base)).await?;
        decode(&value, "block_times")
    }

    /// Validators in the current active set.
    ///
    /// The upstream `active` flag is intermittently absent, so this falls
    /// through a chain of filters: flagged active, then seen since now,
    /// then seen in the last 8 hours, then the unfiltered list.
    pub async fn validators(&self) -> Result<Vec<Validator>> {
        let value = self.fetch_cached(format!("{}/validators", self.base)).await?;
        let all: Vec<Validator> = decode(&value, "validators")?;

        let now = Utc::now();
        let active: Vec<Validator> = all.iter().filter(|v| v.active).cloned().collect();
        if !active.is_empty() {
            return Ok(active);
        }

        let recent: Vec<Validator> =
            all.iter().filter(|v| v.last_time.is_some_and(|t| t >= now)).cloned().collect();
        if !recent.is_empty() {
            return Ok(recent);
        }

        let cutoff = now - chrono::Duration::hours(8);
        let recent: Vec<Validator> =
            all.iter().filter(|v| v.last_time.is_some_and(|t| t >= cutoff)).cloned().collect();
        if !recent.is_empty() {
            return Ok(recent);
        }

        Ok(all)
    }

    /// Per-epoch staking history for one validator, all pages. Rows
    /// stamped at the Unix epoch are dropped.
    pub async fn validator_epochs(&self, validator: &str) -> Result<Vec<ValidatorEpoch>> {
        let url = format!("{}/validators/{validator}/epochs", self.base);
        let value = self
            .cache
            .get_or_compute(url.clone(), self.ttl, async {
                let first: Paginated<Value> = super::get_json(&self.http, &url).await?;
                let mut records = first.records;
                for page_url in remaining_page_urls(&url, first.pages) {
                    let next: Paginated<Value> = super::get_json(&self.http, &page_url).await?;
                    records.extend(next.records);
                }
                Ok(Arc::new(Value::Array(records)))
            })
            .await?;

        let epochs: Vec<ValidatorEpoch> = decode(&value, "validator_epochs")?;
        let floor = Utc.with_ymd_and_hms(2019, 1, 1, 0, 0, 0).unwrap();
        Ok(epochs
            .into_iter()
            .filter(|epoch| epoch.last_time.is_some_and(|t| t >= floor))
            .collect())
    }

    async fn fetch_cached(&self, url: String) -> Result<Arc<Value>> {
        self.cache
            .get_or_compute(url.clone(), self.ttl, async {
                let value: Value = super::get_json(&self.http, &url).await?;
                Ok(Arc::new(value))
            })
            .await
    }
}

fn decode<T: DeserializeOwned>(value: &Value, what: &str) -> Result<T> {
    serde_json::from_value(value.clone()).map_err(|err| Error::schema(what, err.to_string()))
}

/// URLs for pages 2..=pages of a paginated endpoint. The first page is
/// the bare URL and has already been fetched by the time this runs.
fn remaining_page_urls(url: &str, pages: u32) -> Vec<String> {
    (2..=pages).map(|page| format!("{url}?page={page}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validators_decode_with_and_without_flags() {
        let value = json!([
            {
                "account_id": "validator-a",
                "stake": "1000000000000000000000000",
                "active": true,
                "last_time": "2022-03-05T12:00:00Z",
            },
            {
                "account_id": "validator-b",
                "stake": "2500000000000000000000000",
            },
        ]);

        let validators: Vec<Validator> = decode(&value, "validators").unwrap();
        assert!(validators[0].active);
        assert!(!validators[1].active);
        assert_eq!(validators[0].stake_near().unwrap(), 1.0);
        assert_eq!(validators[1].stake_near().unwrap(), 2.5);
    }

    #[test]
    fn paginated_envelope_decodes() {
        let value = json!({"records": [{"staking_balance": "0"}], "pages": 3});
        let page: Paginated<Value> = serde_json::from_value(value).unwrap();
        assert_eq!(page.pages, 3);
        assert_eq!(page.records.len(), 1);
    }

    #[test]
    fn schema_mismatch_names_the_payload() {
        let value = json!({"unexpected": true});
        let result: Result<Vec<Validator>> = decode(&value, "validators");
        assert!(matches!(result, Err(Error::Schema { column, .. }) if column == "validators"));
    }

    #[test]
    fn single_page_needs_no_followup_fetches() {
        assert!(remaining_page_urls("https://x/validators/v/epochs", 1).is_empty());
        assert!(remaining_page_urls("https://x/validators/v/epochs", 0).is_empty());
    }

    #[test]
    fn multi_page_urls_cover_two_through_n() {
        let urls = remaining_page_urls("https://x/validators/v/epochs", 3);
        assert_eq!(
            urls,
            vec![
                "https://x/validators/v/epochs?page=2".to_string(),
                "https://x/validators/v/epochs?page=3".to_string(),
            ]
        );
    }
}
