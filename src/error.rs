//! Error taxonomy for the dashboard data pipeline.
//!
//! Three classes cross module boundaries:
//!
//! - [`Error::Network`] - an upstream fetch failed, timed out, or returned
//!   a non-success status
//! - [`Error::Schema`] - an expected column is absent or unparsable
//! - [`Error::InvalidArgument`] - a transform received input it cannot
//!   operate on
//!
//! Missing token or symbol lookups are NOT errors: normalization drops
//! unmatched identifiers and the price join leaves `amount_usd` empty
//! (see [`crate::transform`]). A failed fetch fails the panel being
//! rendered, never the whole snapshot.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Clone is required so cached loader failures can be handed back to
/// every caller that coalesced on the same in-flight computation.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Upstream HTTP fetch failed, timed out, or returned a non-2xx status.
    #[error("network error: {0}")]
    Network(String),

    /// A row is missing an expected column or carries an unparsable value.
    #[error("schema error in column `{column}`: {reason}")]
    Schema { column: String, reason: String },

    /// A transform was called with input it cannot operate on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    pub fn schema(column: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Schema { column: column.into(), reason: reason.into() }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(err.to_string())
    }
}
