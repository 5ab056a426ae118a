#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/liquidity/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance data provider.
//!
//! This crate provides a Yahoo Finance data provider that implements the
//! [`DataProvider`] and [`PriceDataProvider`] traits from `liquidity-core`.
//!
//! # Features
//!
//! - Fetch daily OHLCV bars using Yahoo Finance's chart API
//! - Built-in rate limiting (1 request per second by default)
//! - Rows with missing prices or broken OHLC invariants are dropped
//!
//! # Example
//!
//! ```no_run
//! use liquidity_yahoo::YahooProvider;
//! use liquidity_core::{PriceDataProvider, Symbol};
//! use chrono::NaiveDate;
//!
//! # async fn example() -> liquidity_core::Result<()> {
//! let provider = YahooProvider::new();
//! let symbol = Symbol::new("^GSPC");
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!
//! let bars = provider.fetch_bars(&symbol, start, end).await?;
//! println!("Fetched {} bars", bars.len());
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use liquidity_core::{
    CandlePeriod, DataFrequency, DataProvider, LiquidityError, PriceBar, PriceDataProvider,
    Result, Symbol,
};
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Yahoo Finance chart API base URL.
const CHART_API_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Default rate limit delay in milliseconds.
const DEFAULT_RATE_LIMIT_MS: u64 = 1000;

/// User agent for HTTP requests.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// Yahoo Finance data provider.
///
/// Implements [`DataProvider`] and [`PriceDataProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: reqwest::Client,
    rate_limit_ms: u64,
    last_request_time: AtomicU64,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider with default settings.
    ///
    /// Uses built-in rate limiting of 1 request per second.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rate_limit(Duration::from_millis(DEFAULT_RATE_LIMIT_MS))
    }

    /// Create a new Yahoo Finance provider with a custom HTTP client.
    ///
    /// Uses the provided client for all HTTP requests. Rate limiting
    /// is still applied.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            rate_limit_ms: DEFAULT_RATE_LIMIT_MS,
            last_request_time: AtomicU64::new(0),
        }
    }

    /// Create a new Yahoo Finance provider with custom rate limiting.
    ///
    /// # Panics
    /// Panics if the HTTP client cannot be built (no TLS backend available).
    #[must_use]
    pub fn with_rate_limit(rate_limit: Duration) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            rate_limit_ms: u64::try_from(rate_limit.as_millis()).unwrap_or(u64::MAX),
            last_request_time: AtomicU64::new(0),
        }
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

    /// Build the chart API URL for a symbol and date range.
    ///
    /// Index symbols carry a leading `^`, which is percent-encoded in the path.
    fn build_chart_url(&self, symbol: &Symbol, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let end_ts = end
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        format!(
            "{}/{}?period1={}&period2={}&interval={}",
            CHART_API_URL,
            symbol.as_str().replace('^', "%5E"),
            start_ts,
            end_ts,
            CandlePeriod::Daily.label(),
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

/// Parse a Yahoo Finance chart response into ascending daily bars.
///
/// Rows with a missing price are skipped and rows that break the OHLC
/// invariants are dropped with a warning. When Yahoo repeats a session (the
/// live bar during market hours), the later row wins.
fn parse_chart_response(symbol: &Symbol, response: ChartResponse) -> Result<Vec<PriceBar>> {
    if let Some(error) = response.chart.error {
        if error.code == "Not Found" {
            return Err(LiquidityError::SeriesNotFound(symbol.to_string()));
        }
        return Err(LiquidityError::Other(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or_else(|| LiquidityError::SeriesNotFound(symbol.to_string()))?;

    let timestamps = result.timestamp.unwrap_or_default();
    if timestamps.is_empty() {
        return Err(LiquidityError::EmptyResult(format!(
            "no price rows for {symbol}"
        )));
    }

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| LiquidityError::Parse("Missing quote data".to_string()))?;

    let mut bars: Vec<PriceBar> = Vec::with_capacity(timestamps.len());
    let mut incomplete = 0usize;

    for (i, &ts) in timestamps.iter().enumerate() {
        let Some(date) = Utc.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive()) else {
            return Err(LiquidityError::Parse(format!("bad timestamp {ts}")));
        };
        let field = |column: &[Option<f64>]| column.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            field(&quote.open),
            field(&quote.high),
            field(&quote.low),
            field(&quote.close),
        ) else {
            incomplete += 1;
            continue;
        };
        let volume = field(&quote.volume).unwrap_or(0.0);

        match PriceBar::new(date, open, high, low, close, volume) {
            Ok(bar) => {
                if bars.last().is_some_and(|prev| prev.date >= bar.date) {
                    bars.retain(|prev| prev.date < bar.date);
                }
                bars.push(bar);
            }
            Err(e) => warn!(symbol = %symbol, error = %e, "Dropping invalid price bar"),
        }
    }

    if incomplete > 0 {
        debug!(symbol = %symbol, incomplete, "Skipped incomplete price rows");
    }

    if bars.is_empty() {
        return Err(LiquidityError::EmptyResult(format!(
            "no valid price bars for {symbol}"
        )));
    }

    Ok(bars)
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance data provider for daily index OHLCV"
    }

    fn supported_frequencies(&self) -> &[DataFrequency] {
        &[DataFrequency::Daily]
    }
}

#[async_trait]
impl PriceDataProvider for YahooProvider {
    async fn fetch_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        // Validate date range
        if start > end {
            return Err(LiquidityError::InvalidParameter(format!(
                "Start date {start} is after end date {end}"
            )));
        }

        self.apply_rate_limit().await;

        let url = self.build_chart_url(symbol, start, end);
        debug!("Fetching bars: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LiquidityError::Network(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LiquidityError::RateLimited {
                provider: "Yahoo Finance".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            });
        }

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LiquidityError::SeriesNotFound(symbol.to_string()));
        }

        if !response.status().is_success() {
            return Err(LiquidityError::Network(format!(
                "HTTP {} for {}",
                response.status(),
                symbol
            )));
        }

        let chart_response: ChartResponse = response
            .json()
            .await
            .map_err(|e| LiquidityError::Parse(e.to_string()))?;

        parse_chart_response(symbol, chart_response)
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

/// Chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}
