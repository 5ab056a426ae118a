//! Provider registry and the per-request dashboard pipeline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use liquidity_analytics::{
    AlignedFrame, LiquidityRegime, RefreshSchedule, add_derived_columns, align_bars, composite,
    curated, detect_and_merge, minmax_index, resample, select_for_display,
};
use liquidity_cache::InMemoryCache;
use liquidity_core::{
    CentralBank, DashboardConfig, DataCache, Event, LiquidityBatch, LiquidityDataProvider,
    LiquidityError, LiquiditySpec, PriceBar, PriceDataProvider, Result, Series, SeriesId, Symbol,
};
use tracing::{debug, instrument, warn};

use crate::branding::{Asset, AssetSource};

/// Default per-feed fetch timeout.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Default time-to-live of cached feed results.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

const TRADING_DAYS_PER_YEAR: usize = 252;

// Slack for holiday-thinned calendars and the first liquidity observation.
const WARMUP_MARGIN_DAYS: usize = 14;

/// What one dashboard view shows.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardRequest {
    /// Index ticker charted against liquidity.
    pub symbol: Symbol,
    /// Liquidity series charted.
    pub liquidity: LiquiditySpec,
    /// Request settings.
    pub config: DashboardConfig,
    /// Last day of the display window.
    pub as_of: NaiveDate,
}

impl DashboardRequest {
    /// Creates a request with the default configuration.
    #[must_use]
    pub fn new(symbol: Symbol, liquidity: LiquiditySpec, as_of: NaiveDate) -> Self {
        Self {
            symbol,
            liquidity,
            config: DashboardConfig::default(),
            as_of,
        }
    }

    /// Creates a request for a central bank's liquidity and default index.
    #[must_use]
    pub fn for_bank(bank: CentralBank, as_of: NaiveDate) -> Self {
        Self::new(bank.default_index(), bank.liquidity_spec(), as_of)
    }

    /// Replaces the charted index.
    #[must_use]
    pub fn with_symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = symbol;
        self
    }

    /// Replaces the configuration.
    #[must_use]
    pub fn with_config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Display window `[as_of - lookback_years, as_of]`.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidConfig`] if the window start is out of range.
    pub fn display_window(&self) -> Result<(NaiveDate, NaiveDate)> {
        let start = years_before(self.as_of, self.config.lookback_years)?;
        Ok((start, self.as_of))
    }

    /// First day fetched: the display window start minus enough warm-up for
    /// the longest metric window to fill.
    ///
    /// The longest window is converted from trading rows to calendar days
    /// (365 per 252 rows) plus a fixed margin.
    ///
    /// # Errors
    /// Same as [`display_window`](Self::display_window).
    pub fn fetch_start(&self) -> Result<NaiveDate> {
        let (start, _) = self.display_window()?;
        let metrics = &self.config.metrics;
        let longest = metrics
            .yoy_lag
            .get()
            .max(metrics.corr_window.get())
            .max(metrics.mean_window.get());
        longest
            .checked_mul(365)
            .map(|days| days.div_ceil(TRADING_DAYS_PER_YEAR) + WARMUP_MARGIN_DAYS)
            .and_then(|days| u64::try_from(days).ok())
            .and_then(|days| start.checked_sub_days(Days::new(days)))
            .ok_or_else(|| LiquidityError::InvalidConfig(format!("window {longest} is too long")))
    }

    /// Next refresh according to this request's refresh settings.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidConfig`] for an empty or invalid hour list.
    pub fn refresh_schedule(&self, now: DateTime<Utc>) -> Result<RefreshSchedule> {
        RefreshSchedule::from_config(now, &self.config.refresh)
    }
}

fn years_before(date: NaiveDate, years: u32) -> Result<NaiveDate> {
    years
        .checked_mul(12)
        .and_then(|months| date.checked_sub_months(Months::new(months)))
        .ok_or_else(|| {
            LiquidityError::InvalidConfig(format!("{years} years before {date} is out of range"))
        })
}

/// Everything a dashboard page renders.
#[derive(Clone, Debug, PartialEq)]
pub struct DashboardView {
    /// Index ticker.
    pub symbol: Symbol,
    /// Liquidity series label.
    pub liquidity_label: String,
    /// First day of the display window.
    pub window_start: NaiveDate,
    /// Last day of the display window.
    pub window_end: NaiveDate,
    /// Aligned close/liquidity rows in the window, with derived columns.
    pub frame: AlignedFrame,
    /// Price candles in the window at the configured period.
    pub candles: Vec<PriceBar>,
    /// Merged event timeline in the window; empty when events are off.
    pub events: Vec<Event>,
    /// Most recent events for the event table.
    pub table_events: Vec<Event>,
    /// 0-100 position of the latest liquidity in its window range.
    /// `None` when liquidity was flat over the window.
    pub liquidity_index: Option<f64>,
    /// Band of [`liquidity_index`](Self::liquidity_index).
    pub regime: Option<LiquidityRegime>,
    /// Latest liquidity value.
    pub latest_liquidity: Option<f64>,
    /// Date of the latest aligned row.
    pub last_date: Option<NaiveDate>,
    /// Branding asset, if one loaded.
    pub asset: Option<Asset>,
}

/// Provider registry and pipeline for dashboard requests.
///
/// Providers of each kind are tried in registration order until one
/// succeeds. If a cache is configured it is consulted first and filled on
/// success; cache failures are logged and never fail a request.
///
/// # Example
///
/// ```rust,ignore
/// use liquidity::{CentralBank, Dashboard, DashboardRequest};
///
/// let dashboard = Dashboard::new()
///     .with_fred("your-fred-key")
///     .with_yahoo()
///     .with_memory_cache(liquidity::DEFAULT_CACHE_TTL);
///
/// let view = dashboard
///     .build(&DashboardRequest::for_bank(CentralBank::Ecb, today))
///     .await?;
/// ```
pub struct Dashboard {
    price_providers: Vec<Arc<dyn PriceDataProvider>>,
    liquidity_providers: Vec<Arc<dyn LiquidityDataProvider>>,
    cache: Option<Arc<dyn DataCache>>,
    curated: Vec<Event>,
    asset_source: Option<Arc<dyn AssetSource>>,
    fetch_timeout: Duration,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self {
            price_providers: Vec::new(),
            liquidity_providers: Vec::new(),
            cache: None,
            curated: Vec::new(),
            asset_source: None,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field(
                "price_providers",
                &self
                    .price_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "liquidity_providers",
                &self
                    .liquidity_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field("cache", &self.cache.as_ref().map(|_| "configured"))
            .field("curated_events", &self.curated.len())
            .field("asset_source", &self.asset_source)
            .field("fetch_timeout", &self.fetch_timeout)
            .finish()
    }
}

impl Dashboard {
    /// Create a new dashboard with no providers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache for this dashboard.
    #[must_use]
    pub fn set_cache(mut self, cache: Arc<dyn DataCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Use an in-memory cache whose entries expire after `ttl`.
    #[must_use]
    pub fn with_memory_cache(self, ttl: Duration) -> Self {
        self.set_cache(Arc::new(InMemoryCache::with_ttl(ttl)))
    }

    /// Set the per-feed fetch timeout.
    #[must_use]
    pub const fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the curated events merged into every timeline.
    #[must_use]
    pub fn with_curated_events(mut self, events: Vec<Event>) -> Self {
        self.curated = events;
        self
    }

    /// Use the built-in Fed timeline as curated events.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidData`] if the timeline does not parse.
    pub fn with_fed_timeline(self) -> Result<Self> {
        Ok(self.with_curated_events(curated::fed_timeline()?))
    }

    /// Set the branding asset source.
    #[must_use]
    pub fn with_asset_source(mut self, source: Arc<dyn AssetSource>) -> Self {
        self.asset_source = Some(source);
        self
    }

    /// Register a price data provider.
    pub fn register_price(&mut self, provider: Arc<dyn PriceDataProvider>) {
        debug!(provider = provider.name(), "Registering price provider");
        self.price_providers.push(provider);
    }

    /// Register a liquidity data provider.
    pub fn register_liquidity(&mut self, provider: Arc<dyn LiquidityDataProvider>) {
        debug!(provider = provider.name(), "Registering liquidity provider");
        self.liquidity_providers.push(provider);
    }

    /// Fetch daily bars, trying providers in order until one succeeds.
    ///
    /// # Errors
    /// Returns [`LiquidityError::ProviderNotConfigured`] without providers,
    /// otherwise the last provider's error if all of them fail.
    pub async fn fetch_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>> {
        if self.price_providers.is_empty() {
            return Err(LiquidityError::ProviderNotConfigured(
                "No price providers registered".to_string(),
            ));
        }

        // Check cache first
        if let Some(cache) = &self.cache {
            for provider in &self.price_providers {
                match cache.get_bars(provider.name(), symbol, start, end).await {
                    Ok(Some(cached)) => {
                        debug!(
                            provider = provider.name(),
                            symbol = %symbol,
                            "Cache hit for price bars"
                        );
                        return Ok(cached);
                    }
                    Ok(None) => {}
                    Err(e) => warn!(provider = provider.name(), error = %e, "Cache read failed"),
                }
            }
        }

        // Try each provider in order
        let mut last_error = None;
        for provider in &self.price_providers {
            debug!(
                provider = provider.name(),
                symbol = %symbol,
                "Fetching price bars"
            );

            match provider.fetch_bars(symbol, start, end).await {
                Ok(bars) => {
                    if let Some(cache) = &self.cache {
                        if let Err(e) = cache
                            .put_bars(provider.name(), symbol, start, end, &bars)
                            .await
                        {
                            warn!(
                                provider = provider.name(),
                                error = %e,
                                "Failed to cache price bars"
                            );
                        }
                    }
                    return Ok(bars);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, trying next"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            LiquidityError::Other("All providers failed with no error".to_string())
        }))
    }

    /// Fetch liquidity series, collecting per-series failures.
    ///
    /// Each id is served from the cache when possible; the rest go to the
    /// providers in order, each provider only seeing the ids its
    /// predecessors failed on.
    ///
    /// # Errors
    /// Returns [`LiquidityError::ProviderNotConfigured`] without providers.
    pub async fn fetch_liquidity(
        &self,
        ids: &[SeriesId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<LiquidityBatch> {
        if self.liquidity_providers.is_empty() {
            return Err(LiquidityError::ProviderNotConfigured(
                "No liquidity providers registered".to_string(),
            ));
        }

        let mut batch = LiquidityBatch::default();
        let mut pending = Vec::new();
        for id in ids {
            match self.cached_series(id, start, end).await {
                Some(series) => {
                    batch.series.insert(id.clone(), series);
                }
                None => pending.push(id.clone()),
            }
        }

        for provider in &self.liquidity_providers {
            if pending.is_empty() {
                break;
            }
            debug!(
                provider = provider.name(),
                series_count = pending.len(),
                "Fetching liquidity series"
            );

            let fetched = provider.fetch_many(&pending, start, end).await;
            for (id, series) in fetched.series {
                if let Some(cache) = &self.cache {
                    if let Err(e) = cache
                        .put_series(provider.name(), &id, start, end, &series)
                        .await
                    {
                        warn!(
                            provider = provider.name(),
                            error = %e,
                            "Failed to cache liquidity series"
                        );
                    }
                }
                batch.series.insert(id, series);
            }
            for (id, error) in &fetched.failed {
                warn!(
                    provider = provider.name(),
                    series = %id,
                    error = %error,
                    "Provider failed for series"
                );
            }
            pending = fetched.failed.iter().map(|(id, _)| id.clone()).collect();
            batch.failed = fetched.failed;
        }

        Ok(batch)
    }

    async fn cached_series(
        &self,
        id: &SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<Series> {
        let cache = self.cache.as_ref()?;
        for provider in &self.liquidity_providers {
            match cache.get_series(provider.name(), id, start, end).await {
                Ok(Some(series)) => {
                    debug!(
                        provider = provider.name(),
                        series = %id,
                        "Cache hit for liquidity series"
                    );
                    return Some(series);
                }
                Ok(None) => {}
                Err(e) => warn!(provider = provider.name(), error = %e, "Cache read failed"),
            }
        }
        None
    }

    /// Fetch the components of `spec` and combine them into one series.
    ///
    /// # Errors
    /// Returns [`LiquidityError::UpstreamFetchFailure`] if a component is
    /// unavailable and [`LiquidityError::EmptyResult`] if the components
    /// share no date.
    pub async fn fetch_liquidity_series(
        &self,
        spec: &LiquiditySpec,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Series> {
        let ids = composite::required_series(spec);
        let batch = self.fetch_liquidity(&ids, start, end).await?;
        composite::build(spec, &batch)
    }

    /// Run `fut` under the fetch timeout, folding its errors into upstream failures of `feed`.
    async fn guarded<T>(&self, feed: &str, fut: impl Future<Output = Result<T>>) -> Result<T> {
        match tokio::time::timeout(self.fetch_timeout, fut).await {
            Ok(result) => result.map_err(|e| e.into_upstream(feed)),
            Err(_) => {
                warn!(feed, timeout = ?self.fetch_timeout, "Upstream fetch timed out");
                Err(LiquidityError::UpstreamTimeout {
                    feed: feed.to_string(),
                    timeout: self.fetch_timeout,
                })
            }
        }
    }

    /// Load the branding asset, if any. Failures are logged and yield `None`.
    pub async fn load_asset(&self) -> Option<Asset> {
        let source = self.asset_source.as_ref()?;
        match source.load().await {
            Ok(asset) => Some(asset),
            Err(e) => {
                debug!(error = %e, "Branding asset unavailable");
                None
            }
        }
    }

    /// Build the dashboard view for one request.
    ///
    /// Fetches the price and liquidity feeds concurrently, aligns them on
    /// the price calendar, derives rolling columns, trims to the display
    /// window, computes the liquidity index, resamples the candles and
    /// builds the event timeline.
    ///
    /// # Errors
    /// - [`LiquidityError::InvalidConfig`] for an invalid configuration
    /// - [`LiquidityError::ProviderNotConfigured`] if a feed has no provider
    /// - [`LiquidityError::UpstreamFetchFailure`] / [`LiquidityError::UpstreamTimeout`]
    ///   if either feed fails, times out or returns nothing
    /// - [`LiquidityError::EmptyResult`] if the feeds do not overlap in the window
    #[instrument(skip(self, request), fields(symbol = %request.symbol, liquidity = %request.liquidity.label(), as_of = %request.as_of))]
    pub async fn build(&self, request: &DashboardRequest) -> Result<DashboardView> {
        let config = &request.config;
        config.validate()?;
        let (start, end) = request.display_window()?;
        let fetch_start = request.fetch_start()?;

        if self.price_providers.is_empty() {
            return Err(LiquidityError::ProviderNotConfigured(
                "No price providers registered".to_string(),
            ));
        }
        if self.liquidity_providers.is_empty() {
            return Err(LiquidityError::ProviderNotConfigured(
                "No liquidity providers registered".to_string(),
            ));
        }

        let price = self.guarded("price", async {
            let bars = self.fetch_bars(&request.symbol, fetch_start, end).await?;
            if bars.is_empty() {
                return Err(LiquidityError::EmptyResult(format!(
                    "no price bars for {}",
                    request.symbol
                )));
            }
            Ok(bars)
        });
        let liquidity = self.guarded(
            "liquidity",
            self.fetch_liquidity_series(&request.liquidity, fetch_start, end),
        );
        let (bars, liquidity) = tokio::try_join!(price, liquidity)?;

        let frame = align_bars(&bars, &liquidity)?;
        let frame = add_derived_columns(frame, &config.metrics)?.window(start, end)?;

        let (liquidity_index, regime) = match minmax_index(frame.liquidity()) {
            Ok(index) => (Some(index), Some(LiquidityRegime::classify(index))),
            Err(LiquidityError::DegenerateRange(value)) => {
                debug!(value, "Liquidity flat over the window, no index");
                (None, None)
            }
            Err(e) => return Err(e),
        };

        let first_shown = bars.partition_point(|bar| bar.date < start);
        let candles = resample(&bars[first_shown..], config.period)?;

        let (events, table_events) = if config.show_events {
            let timeline = detect_and_merge(&bars, &self.curated, config.event_threshold)?;
            (
                select_for_display(&timeline, start, end, None),
                select_for_display(&timeline, start, end, Some(config.event_table_limit)),
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let view = DashboardView {
            symbol: request.symbol.clone(),
            liquidity_label: request.liquidity.label(),
            window_start: start,
            window_end: end,
            latest_liquidity: frame.liquidity().last().copied(),
            last_date: frame.last_date(),
            frame,
            candles,
            events,
            table_events,
            liquidity_index,
            regime,
            asset: self.load_asset().await,
        };

        debug!(
            rows = view.frame.len(),
            candles = view.candles.len(),
            events = view.events.len(),
            index = ?view.liquidity_index,
            "Built dashboard view"
        );
        Ok(view)
    }

    // Builder methods for easy setup with specific providers

    /// Add the FRED provider for liquidity series.
    #[cfg(feature = "fred")]
    #[must_use]
    pub fn with_fred(mut self, api_key: &str) -> Self {
        self.register_liquidity(Arc::new(liquidity_fred::FredProvider::new(api_key)));
        self
    }

    /// Add the Yahoo Finance provider for index bars.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(mut self) -> Self {
        self.register_price(Arc::new(liquidity_yahoo::YahooProvider::new()));
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Datelike, Weekday};
    use liquidity_analytics::metrics::{COL_CLOSE_YOY, COL_CORRELATION, COL_LIQUIDITY_YOY};
    use liquidity_core::{
        CandlePeriod, DataFrequency, DataProvider, Direction, EventSource, TimePoint,
    };

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn as_of() -> NaiveDate {
        d(2024, 6, 28)
    }

    fn drop_day() -> NaiveDate {
        d(2024, 3, 14)
    }

    fn days(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
        from.iter_days().take_while(move |day| *day <= to)
    }

    fn weekdays(from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        days(from, to)
            .filter(|day| day.weekday().number_from_monday() <= 5)
            .collect()
    }

    /// Slow uptrend with a single 6% drop on `drop_day`.
    fn sample_bars() -> Vec<PriceBar> {
        weekdays(d(2022, 1, 3), as_of())
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let mut close = 100.0 + i as f64 * 0.01;
                if date >= drop_day() {
                    close *= 0.94;
                }
                PriceBar::new(date, close, close, close, close, 1_000.0).unwrap()
            })
            .collect()
    }

    fn wednesdays(f: impl Fn(usize) -> f64) -> Series {
        let points = days(d(2022, 1, 3), as_of())
            .filter(|day| day.weekday() == Weekday::Wed)
            .enumerate()
            .map(|(k, date)| TimePoint::new(date, f(k)))
            .collect();
        Series::from_points(points).unwrap()
    }

    fn net_liquidity_feed() -> BTreeMap<SeriesId, Series> {
        let rrp = weekdays(d(2022, 1, 3), as_of())
            .into_iter()
            .map(|date| TimePoint::new(date, 500.0))
            .collect();
        BTreeMap::from([
            (
                SeriesId::new("WALCL"),
                wednesdays(|k| 7_000_000.0 + k as f64 * 1_000.0),
            ),
            (SeriesId::new("WDTGAL"), wednesdays(|_| 700_000.0)),
            (SeriesId::new("RRPONTSYD"), Series::from_points(rrp).unwrap()),
        ])
    }

    #[derive(Debug, Default)]
    struct MockPrice {
        name: &'static str,
        bars: Vec<PriceBar>,
        delay: Option<Duration>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl DataProvider for MockPrice {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> &str {
            "mock price feed"
        }

        fn supported_frequencies(&self) -> &[DataFrequency] {
            &[DataFrequency::Daily]
        }
    }

    #[async_trait]
    impl PriceDataProvider for MockPrice {
        async fn fetch_bars(
            &self,
            _symbol: &Symbol,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Vec<PriceBar>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            if self.fail {
                return Err(LiquidityError::Network("connection refused".to_string()));
            }
            Ok(self
                .bars
                .iter()
                .filter(|bar| bar.date >= start && bar.date <= end)
                .copied()
                .collect())
        }
    }

    #[derive(Debug, Default)]
    struct MockLiquidity {
        series: BTreeMap<SeriesId, Series>,
        calls: AtomicUsize,
    }

    impl DataProvider for MockLiquidity {
        fn name(&self) -> &str {
            "mock-liquidity"
        }

        fn description(&self) -> &str {
            "mock liquidity feed"
        }

        fn supported_frequencies(&self) -> &[DataFrequency] {
            &[DataFrequency::Weekly]
        }
    }

    #[async_trait]
    impl LiquidityDataProvider for MockLiquidity {
        async fn fetch_series(
            &self,
            id: &SeriesId,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<Series> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.series
                .get(id)
                .map(|s| s.between(start, end))
                .ok_or_else(|| LiquidityError::SeriesNotFound(id.to_string()))
        }
    }

    #[derive(Debug)]
    struct BrokenAsset;

    #[async_trait]
    impl AssetSource for BrokenAsset {
        async fn load(&self) -> Result<Asset> {
            Err(LiquidityError::Other("logo missing".to_string()))
        }
    }

    fn price(bars: Vec<PriceBar>) -> Arc<MockPrice> {
        Arc::new(MockPrice {
            name: "mock-price",
            bars,
            ..Default::default()
        })
    }

    fn liquidity(series: BTreeMap<SeriesId, Series>) -> Arc<MockLiquidity> {
        Arc::new(MockLiquidity {
            series,
            ..Default::default()
        })
    }

    fn dashboard(price: Arc<MockPrice>, liquidity: Arc<MockLiquidity>) -> Dashboard {
        let mut dashboard = Dashboard::new();
        dashboard.register_price(price);
        dashboard.register_liquidity(liquidity);
        dashboard
    }

    fn fed_request(config: DashboardConfig) -> DashboardRequest {
        DashboardRequest::for_bank(CentralBank::Fed, as_of()).with_config(config)
    }

    #[test]
    fn test_request_windows() {
        let request = fed_request(DashboardConfig::default().with_lookback_years(2));

        assert_eq!(request.display_window().unwrap(), (d(2022, 6, 28), as_of()));
        // 252-row YoY lag: 365 calendar days plus the margin.
        assert_eq!(request.fetch_start().unwrap(), d(2021, 6, 14));
    }

    #[tokio::test]
    async fn test_build_net_liquidity_dashboard() {
        let curated = vec![
            Event::curated(d(2023, 12, 13), "Pivot", "", "★", Direction::Up),
            Event::curated(d(2020, 3, 15), "Emergency cut", "", "★", Direction::Down),
        ];
        let mut config = DashboardConfig::default()
            .with_lookback_years(1)
            .with_period(CandlePeriod::Weekly);
        config.event_table_limit = 1;

        let view = dashboard(price(sample_bars()), liquidity(net_liquidity_feed()))
            .with_curated_events(curated)
            .build(&fed_request(config))
            .await
            .unwrap();

        assert_eq!(view.symbol, Symbol::new("^GSPC"));
        assert_eq!(view.liquidity_label, "NET_LIQUIDITY");
        assert_eq!(view.window_start, d(2023, 6, 28));
        assert_eq!(view.frame.dates().first(), Some(&d(2023, 6, 28)));
        assert_eq!(view.last_date, Some(as_of()));

        // Last Wednesday: WALCL 7_129_000 - TGA 700_000 - RRP 500bn.
        assert_eq!(view.latest_liquidity, Some(5_929_000.0));
        assert_eq!(view.liquidity_index, Some(100.0));
        assert_eq!(view.regime, Some(LiquidityRegime::Ample));
        assert!(view.frame.column(COL_CORRELATION).is_some());

        assert!(view.candles.iter().all(|c| c.date.weekday() == Weekday::Fri));
        assert_eq!(view.candles.last().map(|c| c.date), Some(as_of()));

        let dates: Vec<NaiveDate> = view.events.iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![d(2023, 12, 13), drop_day()]);
        assert_eq!(view.events[1].source, EventSource::Auto);
        assert_eq!(view.events[1].direction, Direction::Down);
        assert_eq!(view.table_events.len(), 1);
        assert_eq!(view.table_events[0].date, drop_day());
        assert!(view.asset.is_none());
    }

    #[tokio::test]
    async fn test_metrics_defined_from_first_row_with_holidays() {
        let holidays = [
            d(2022, 1, 17), d(2022, 2, 21), d(2022, 4, 15), d(2022, 5, 30), d(2022, 6, 20),
            d(2022, 7, 4), d(2022, 9, 5), d(2022, 11, 24), d(2022, 12, 26),
            d(2023, 1, 2), d(2023, 1, 16), d(2023, 2, 20), d(2023, 4, 7), d(2023, 5, 29),
            d(2023, 6, 19), d(2023, 7, 4), d(2023, 9, 4), d(2023, 11, 23), d(2023, 12, 25),
            d(2024, 1, 1), d(2024, 1, 15), d(2024, 2, 19), d(2024, 3, 29), d(2024, 5, 27),
            d(2024, 6, 19),
        ];
        let bars: Vec<PriceBar> = sample_bars()
            .into_iter()
            .filter(|bar| !holidays.contains(&bar.date))
            .collect();
        let config = DashboardConfig::default().with_lookback_years(1);

        let view = dashboard(price(bars), liquidity(net_liquidity_feed()))
            .build(&fed_request(config))
            .await
            .unwrap();

        assert_eq!(view.frame.dates().first(), Some(&d(2023, 6, 28)));
        for name in [COL_CLOSE_YOY, COL_LIQUIDITY_YOY, COL_CORRELATION] {
            let column = view.frame.column(name).unwrap();
            assert!(column.iter().all(Option::is_some), "{name} undefined in window");
        }
    }

    #[tokio::test]
    async fn test_curated_event_wins_over_auto() {
        let curated = vec![Event::curated(drop_day(), "Known shock", "", "★", Direction::Down)];

        let view = dashboard(price(sample_bars()), liquidity(net_liquidity_feed()))
            .with_curated_events(curated)
            .build(&fed_request(DashboardConfig::default().with_lookback_years(1)))
            .await
            .unwrap();

        let on_drop: Vec<&Event> = view.events.iter().filter(|e| e.date == drop_day()).collect();
        assert_eq!(on_drop.len(), 1);
        assert_eq!(on_drop[0].title, "Known shock");
        assert_eq!(on_drop[0].source, EventSource::Curated);
    }

    #[tokio::test]
    async fn test_events_disabled() {
        let config = DashboardConfig::default().with_lookback_years(1).with_events(false);

        let view = dashboard(price(sample_bars()), liquidity(net_liquidity_feed()))
            .build(&fed_request(config))
            .await
            .unwrap();

        assert!(view.events.is_empty());
        assert!(view.table_events.is_empty());
    }

    #[tokio::test]
    async fn test_flat_liquidity_has_no_index() {
        let feed = BTreeMap::from([(SeriesId::new("JPNASSETS"), wednesdays(|_| 750.0))]);
        let request = DashboardRequest::for_bank(CentralBank::Boj, as_of())
            .with_config(DashboardConfig::default().with_lookback_years(1));

        let view = dashboard(price(sample_bars()), liquidity(feed))
            .build(&request)
            .await
            .unwrap();

        assert_eq!(view.symbol, Symbol::new("^N225"));
        assert_eq!(view.liquidity_index, None);
        assert_eq!(view.regime, None);
        assert_eq!(view.latest_liquidity, Some(750.0));
    }

    #[tokio::test]
    async fn test_missing_component_is_upstream_failure() {
        let mut feed = net_liquidity_feed();
        feed.remove(&SeriesId::new("WDTGAL"));

        let err = dashboard(price(sample_bars()), liquidity(feed))
            .build(&fed_request(DashboardConfig::default()))
            .await
            .unwrap_err();

        match err {
            LiquidityError::UpstreamFetchFailure { feed, message } => {
                assert_eq!(feed, "liquidity");
                assert!(message.contains("WDTGAL"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_price_failure_is_upstream_failure() {
        let failing = Arc::new(MockPrice {
            name: "down",
            fail: true,
            ..Default::default()
        });

        let err = dashboard(failing, liquidity(net_liquidity_feed()))
            .build(&fed_request(DashboardConfig::default()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LiquidityError::UpstreamFetchFailure { ref feed, .. } if feed == "price"
        ));
    }

    #[tokio::test]
    async fn test_empty_price_feed_is_upstream_failure() {
        let err = dashboard(price(Vec::new()), liquidity(net_liquidity_feed()))
            .build(&fed_request(DashboardConfig::default()))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            LiquidityError::UpstreamFetchFailure { ref feed, .. } if feed == "price"
        ));
    }

    #[tokio::test]
    async fn test_price_timeout() {
        let slow = Arc::new(MockPrice {
            name: "slow",
            bars: sample_bars(),
            delay: Some(Duration::from_millis(500)),
            ..Default::default()
        });

        let err = dashboard(slow, liquidity(net_liquidity_feed()))
            .with_fetch_timeout(Duration::from_millis(20))
            .build(&fed_request(DashboardConfig::default()))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            LiquidityError::UpstreamTimeout {
                feed: "price".to_string(),
                timeout: Duration::from_millis(20),
            }
        );
    }

    #[tokio::test]
    async fn test_falls_back_to_next_price_provider() {
        let failing = Arc::new(MockPrice {
            name: "down",
            fail: true,
            ..Default::default()
        });
        let backup = price(sample_bars());

        let mut dashboard = dashboard(failing.clone(), liquidity(net_liquidity_feed()));
        dashboard.register_price(backup.clone());
        let view = dashboard
            .build(&fed_request(DashboardConfig::default().with_lookback_years(1)))
            .await
            .unwrap();

        assert!(!view.frame.is_empty());
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(backup.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_serves_repeat_requests() {
        let prices = price(sample_bars());
        let feed = liquidity(net_liquidity_feed());
        let dashboard =
            dashboard(prices.clone(), feed.clone()).with_memory_cache(DEFAULT_CACHE_TTL);
        let request = fed_request(DashboardConfig::default().with_lookback_years(1));

        let first = dashboard.build(&request).await.unwrap();
        let second = dashboard.build(&request).await.unwrap();

        assert_eq!(first.candles, second.candles);
        assert_eq!(first.frame.dates(), second.frame.dates());
        assert_eq!(prices.calls.load(Ordering::SeqCst), 1);
        assert_eq!(feed.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_overlap_is_empty_result() {
        // Only observation falls on the Saturday after the last price.
        let late = BTreeMap::from([(
            SeriesId::new("ECBASSETSW"),
            Series::from_points(vec![TimePoint::new(d(2024, 6, 29), 1.0)]).unwrap(),
        )]);
        let request = DashboardRequest::for_bank(CentralBank::Ecb, d(2024, 6, 30));

        let err = dashboard(price(sample_bars()), liquidity(late))
            .build(&request)
            .await
            .unwrap_err();

        assert!(matches!(err, LiquidityError::EmptyResult(_)));
    }

    #[tokio::test]
    async fn test_broken_asset_does_not_fail_build() {
        let view = dashboard(price(sample_bars()), liquidity(net_liquidity_feed()))
            .with_asset_source(Arc::new(BrokenAsset))
            .build(&fed_request(DashboardConfig::default().with_lookback_years(1)))
            .await
            .unwrap();

        assert!(view.asset.is_none());
    }

    #[tokio::test]
    async fn test_requires_providers() {
        let err = Dashboard::new()
            .build(&fed_request(DashboardConfig::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, LiquidityError::ProviderNotConfigured(_)));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let config = DashboardConfig::default().with_event_threshold(-1.0);

        let err = dashboard(price(sample_bars()), liquidity(net_liquidity_feed()))
            .build(&fed_request(config))
            .await
            .unwrap_err();
        assert!(matches!(err, LiquidityError::InvalidConfig(_)));
    }

    #[test]
    fn test_refresh_schedule_from_request() {
        let now = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 6, 10, 12, 0, 0).unwrap();
        let request = fed_request(DashboardConfig::default());
        let schedule = request.refresh_schedule(now).unwrap();

        // 13:00 UTC is the next of the default [13, 22] hours.
        assert_eq!(schedule.seconds_until, 3_600);
        assert_eq!(
            schedule.describe(request.config.refresh.display_timezone),
            "2024-06-10 22:00 KST"
        );
    }
}
