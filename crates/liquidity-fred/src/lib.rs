#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/liquidity/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! FRED liquidity series provider.
//!
//! This crate implements [`DataProvider`] and [`LiquidityDataProvider`] from
//! `liquidity-core` on top of the FRED `series/observations` API.
//!
//! # Example
//!
//! ```no_run
//! use liquidity_fred::FredProvider;
//! use liquidity_core::{LiquidityDataProvider, SeriesId};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> liquidity_core::Result<()> {
//! let provider = FredProvider::new("your-api-key");
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!
//! let walcl = provider.fetch_series(&SeriesId::new("WALCL"), start, end).await?;
//! println!("Fetched {} observations", walcl.len());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use liquidity_core::{
    DataFrequency, DataProvider, LiquidityDataProvider, LiquidityError, Result, Series, SeriesId,
    TimePoint,
};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

/// FRED observations API endpoint.
const OBSERVATIONS_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// Default delay between requests; FRED allows 120 requests per minute.
const DEFAULT_RATE_LIMIT_MS: u64 = 500;

/// Value FRED reports for a missing observation.
const MISSING_VALUE: &str = ".";

/// FRED data provider.
///
/// Implements [`DataProvider`] and [`LiquidityDataProvider`].
pub struct FredProvider {
    client: reqwest::Client,
    api_key: String,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl fmt::Debug for FredProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FredProvider")
            .field("api_key", &"[REDACTED]")
            .field("rate_limit_ms", &self.rate_limit_ms)
            .finish()
    }
}

impl FredProvider {
    /// Create a new FRED provider with the given API key.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be built (no TLS backend available).
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self::with_client(client, api_key)
    }

    /// Create a new FRED provider with a custom HTTP client.
    #[must_use]
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Sets the minimum delay between requests.
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: Duration) -> Self {
        self.rate_limit_ms = u64::try_from(rate_limit.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Apply rate limiting before making a request.
    async fn apply_rate_limit(&self) {
        let now = now_millis();
        let last = self.last_request_time.load(Ordering::Relaxed);
        let elapsed = now.saturating_sub(last);

        if elapsed < self.rate_limit_ms {
            let wait_time = self.rate_limit_ms - elapsed;
            debug!("Rate limiting: waiting {}ms", wait_time);
            sleep(Duration::from_millis(wait_time)).await;
        }

        self.last_request_time.store(now_millis(), Ordering::Relaxed);
    }

    /// Build the observations URL for a series and date range.
    fn build_observations_url(&self, id: &SeriesId, start: NaiveDate, end: NaiveDate) -> String {
        format!(
            "{OBSERVATIONS_URL}?series_id={}&api_key={}&file_type=json&observation_start={}&observation_end={}",
            id.as_str(),
            self.api_key,
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
        )
    }
}

fn now_millis() -> u64 {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(millis).unwrap_or(u64::MAX)
}

/// Parse a FRED observations response into a series.
///
/// Observations reported as `"."` are missing and skipped.
fn parse_observations(id: &SeriesId, response: ObservationsResponse) -> Result<Series> {
    let mut points = Vec::with_capacity(response.observations.len());
    let mut skipped = 0usize;

    for obs in response.observations {
        if obs.value.trim() == MISSING_VALUE {
            skipped += 1;
            continue;
        }
        let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d")
            .map_err(|e| LiquidityError::Parse(format!("{id}: bad date {:?}: {e}", obs.date)))?;
        let value: f64 = obs.value.trim().parse().map_err(|e| {
            LiquidityError::Parse(format!("{id}: bad value {:?} on {date}: {e}", obs.value))
        })?;
        points.push(TimePoint::new(date, value));
    }

    if skipped > 0 {
        debug!(series = %id, skipped, "Skipped missing FRED observations");
    }

    Ok(Series::from_unsorted(points))
}

impl DataProvider for FredProvider {
    fn name(&self) -> &str {
        "FRED"
    }

    fn description(&self) -> &str {
        "Federal Reserve Economic Data: central-bank balance sheet and money market series"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        &[
            DataFrequency::Daily,
            DataFrequency::Weekly,
            DataFrequency::Monthly,
        ]
    }
}

#[async_trait]
impl LiquidityDataProvider for FredProvider {
    async fn fetch_series(
        &self,
        id: &SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series> {
        if start > end {
            return Err(LiquidityError::InvalidParameter(format!(
                "Start date {start} is after end date {end}"
            )));
        }

        self.apply_rate_limit().await;

        let url = self.build_observations_url(id, start, end);
        debug!(series = %id, %start, %end, "Fetching FRED observations");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LiquidityError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LiquidityError::RateLimited {
                provider: "FRED".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if status == reqwest::StatusCode::BAD_REQUEST || status == reqwest::StatusCode::NOT_FOUND {
            let body: Option<ApiError> = response.json().await.ok();
            let message = body.map(|b| b.error_message).unwrap_or_default();
            warn!(series = %id, %status, %message, "FRED rejected series request");
            return Err(LiquidityError::SeriesNotFound(id.to_string()));
        }

        if !status.is_success() {
            return Err(LiquidityError::Network(format!("HTTP {status} for {id}")));
        }

        let observations: ObservationsResponse = response
            .json()
            .await
            .map_err(|e| LiquidityError::Parse(e.to_string()))?;

        parse_observations(id, observations)
    }
}

// ============================================================================
// FRED API Response Types
// ============================================================================

/// Observations API response.
#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<Observation>,
}

#[derive(Debug, Deserialize)]
struct Observation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error_message: String,
}
