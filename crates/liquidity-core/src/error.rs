//! Error types for liquidity dashboard operations.
//!
//! This module defines [`LiquidityError`] which covers every failure that can
//! occur while fetching feeds, validating inputs, or running the pipeline.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur during dashboard operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LiquidityError {
    /// An upstream feed was unreachable or returned nothing usable.
    #[error("Upstream fetch failed for {feed}: {message}")]
    UpstreamFetchFailure {
        /// The feed that failed (e.g. "price", "liquidity").
        feed: String,
        /// Human-readable failure description.
        message: String,
    },

    /// An upstream feed did not answer within the configured timeout.
    #[error("Upstream {feed} timed out after {timeout:?}")]
    UpstreamTimeout {
        /// The feed that timed out.
        feed: String,
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// A transform produced zero rows.
    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Normalization over a range whose min equals its max.
    #[error("Degenerate range: every value equals {0}")]
    DegenerateRange(f64),

    /// Invalid request configuration.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Network-related errors (connection failures, HTTP status, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<Duration>,
    },

    /// The requested ticker or series id was not found.
    #[error("Series not found: {0}")]
    SeriesNotFound(String),

    /// Error parsing data from a provider.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Input data violates a structural invariant.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// No provider is registered for the requested feed.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided to a provider call.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The requested feature is not supported.
    #[error("Feature not supported: {0}")]
    NotSupported(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl LiquidityError {
    /// Wraps this error as an [`LiquidityError::UpstreamFetchFailure`] for `feed`.
    ///
    /// Timeouts and errors that already name a feed are returned unchanged.
    #[must_use]
    pub fn into_upstream(self, feed: &str) -> Self {
        match self {
            Self::UpstreamFetchFailure { .. } | Self::UpstreamTimeout { .. } => self,
            other => Self::UpstreamFetchFailure {
                feed: feed.to_string(),
                message: other.to_string(),
            },
        }
    }

    /// Returns true if this error came from an upstream feed.
    #[must_use]
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::UpstreamFetchFailure { .. } | Self::UpstreamTimeout { .. }
        )
    }
}

/// Result type alias using [`LiquidityError`].
pub type Result<T> = std::result::Result<T, LiquidityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_upstream_wraps_provider_errors() {
        let err = LiquidityError::Network("connection reset".to_string()).into_upstream("price");
        assert_eq!(
            err,
            LiquidityError::UpstreamFetchFailure {
                feed: "price".to_string(),
                message: "Network error: connection reset".to_string(),
            }
        );
        assert!(err.is_upstream());
    }

    #[test]
    fn test_into_upstream_keeps_timeouts() {
        let timeout = LiquidityError::UpstreamTimeout {
            feed: "liquidity".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert_eq!(timeout.clone().into_upstream("price"), timeout);
    }

    #[test]
    fn test_display() {
        let err = LiquidityError::DegenerateRange(5.0);
        assert_eq!(err.to_string(), "Degenerate range: every value equals 5");
    }
}
