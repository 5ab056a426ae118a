//! No-op cache implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use liquidity_core::{DataCache, PriceBar, Result, Series, SeriesId, Symbol};
use std::time::Duration;
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// All `get_*` methods return `Ok(None)` and all `put_*` methods return `Ok(())`.
/// Useful for disabling caching or testing code paths without cache hits.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DataCache for NoopCache {
    async fn get_bars(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Option<Vec<PriceBar>>> {
        trace!("NoopCache: get_bars called, returning None");
        Ok(None)
    }

    async fn put_bars(
        &self,
        _provider: &str,
        _symbol: &Symbol,
        _start: NaiveDate,
        _end: NaiveDate,
        _bars: &[PriceBar],
    ) -> Result<()> {
        trace!("NoopCache: put_bars called, doing nothing");
        Ok(())
    }

    async fn get_series(
        &self,
        _provider: &str,
        _id: &SeriesId,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Option<Series>> {
        trace!("NoopCache: get_series called, returning None");
        Ok(None)
    }

    async fn put_series(
        &self,
        _provider: &str,
        _id: &SeriesId,
        _start: NaiveDate,
        _end: NaiveDate,
        _series: &Series,
    ) -> Result<()> {
        trace!("NoopCache: put_series called, doing nothing");
        Ok(())
    }

    async fn invalidate_stale(&self, _ttl: Duration) -> Result<usize> {
        trace!("NoopCache: invalidate_stale called, returning 0");
        Ok(0)
    }

    async fn clear(&self) -> Result<()> {
        trace!("NoopCache: clear called, doing nothing");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquidity_core::TimePoint;

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache::new();
        let symbol = Symbol::new("^GSPC");
        let id = SeriesId::new("WALCL");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

        let bars = vec![PriceBar::new(start, 10.0, 11.0, 9.0, 10.5, 1.0).unwrap()];
        cache.put_bars("test", &symbol, start, end, &bars).await.unwrap();
        let series = Series::from_points(vec![TimePoint::new(start, 1.0)]).unwrap();
        cache.put_series("test", &id, start, end, &series).await.unwrap();

        assert!(cache.get_bars("test", &symbol, start, end).await.unwrap().is_none());
        assert!(cache.get_series("test", &id, start, end).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_noop_cache_management() {
        let cache = NoopCache::new();

        let removed = cache
            .invalidate_stale(Duration::from_secs(3600))
            .await
            .unwrap();
        assert_eq!(removed, 0);
        assert!(cache.clear().await.is_ok());
    }
}
