mod config;

pub use config::{CacheSettings, NormalizerSettings, Settings, SourceSettings};
