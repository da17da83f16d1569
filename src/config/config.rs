use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// External data source configuration.
///
/// The query API serves pre-built analytics queries as JSON row arrays
/// (no authentication). The DEX stats API serves token metadata, price
/// history and pool statistics. The indexer API requires an API key that
/// is embedded in the request path.
#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    #[serde(default = "default_stats_base_url")]
    pub stats_base_url: String,
    #[serde(default = "default_indexer_base_url")]
    pub indexer_base_url: String,
    #[serde(default)]
    pub indexer_api_key: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_stats_base_url() -> String {
    "https://api.stats.ref.finance/api".to_string()
}

fn default_indexer_base_url() -> String {
    "https://near--indexer.datahub.figment.io".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            stats_base_url: default_stats_base_url(),
            indexer_base_url: default_indexer_base_url(),
            indexer_api_key: String::new(),
            http_timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Result cache configuration.
///
/// TTLs follow data volatility: live indexer endpoints change every block,
/// query-API tables refresh a few times per day, and historical price
/// series are effectively immutable.
#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Live indexer data (status, blocks, validators).
    #[serde(default = "default_live_ttl_secs")]
    pub live_ttl_secs: u64,
    /// Pre-built query API tables.
    #[serde(default = "default_query_ttl_secs")]
    pub query_ttl_secs: u64,
    /// Price history and DEX stats tables.
    #[serde(default = "default_stats_ttl_secs")]
    pub stats_ttl_secs: u64,
}

fn default_max_capacity() -> u64 {
    10_000
}

fn default_live_ttl_secs() -> u64 {
    60
}

fn default_query_ttl_secs() -> u64 {
    1_800
}

fn default_stats_ttl_secs() -> u64 {
    3_600 * 12
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
            live_ttl_secs: default_live_ttl_secs(),
            query_ttl_secs: default_query_ttl_secs(),
            stats_ttl_secs: default_stats_ttl_secs(),
        }
    }
}

/// Amount normalization configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct NormalizerSettings {
    /// Subtracted from each token's on-chain decimals before computing the
    /// power-of-ten conversion factor. The upstream amount feed bakes an
    /// extra 10^18 fixed-point scale into its raw values, hence the
    /// default. Set to 0 for feeds whose decimals are already display
    /// precision. This is a policy knob, not a universal constant.
    #[serde(default = "default_precorrection")]
    pub precorrection: i32,
}

fn default_precorrection() -> i32 {
    18
}

impl Default for NormalizerSettings {
    fn default() -> Self {
        Self { precorrection: default_precorrection() }
    }
}

/// Root application configuration.
///
/// Loaded from `config.yaml` when present; every field has a default so
/// the snapshot binary runs without one. `CITIZENS__*` environment
/// variables override file values (e.g. `CITIZENS__SOURCES__INDEXER_API_KEY`).
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Settings {
    #[serde(default)]
    pub sources: SourceSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub normalizer: NormalizerSettings,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name("config").required(false))
            .add_source(Environment::with_prefix("CITIZENS").separator("__"))
            .build()?;

        let settings: Settings = s.try_deserialize()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_complete() {
        let settings = Settings::default();
        assert_eq!(settings.normalizer.precorrection, 18);
        assert_eq!(settings.cache.live_ttl_secs, 60);
        assert_eq!(settings.cache.stats_ttl_secs, 3600 * 12);
        assert!(settings.sources.stats_base_url.starts_with("https://"));
    }
}
