//! In-memory cache implementation.

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use liquidity_core::{DataCache, PriceBar, Result, Series, SeriesId, Symbol};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

/// Cache entry with timestamp for TTL-based invalidation.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: chrono::DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    fn is_stale(&self, ttl: Duration) -> bool {
        let age = Utc::now().signed_duration_since(self.cached_at);
        age > chrono::TimeDelta::from_std(ttl).unwrap_or(chrono::TimeDelta::MAX)
    }
}

/// Key for cache entries: provider, symbol or series id, and requested range.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RangeKey {
    provider: String,
    name: String,
    start: NaiveDate,
    end: NaiveDate,
}

impl RangeKey {
    fn new(provider: &str, name: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            provider: provider.to_string(),
            name: name.to_string(),
            start,
            end,
        }
    }
}

/// In-memory cache with an optional time-to-live.
///
/// Data is stored in `RwLock`-protected `HashMap`s and is lost when the cache
/// is dropped. With a TTL set, lookups ignore entries older than the TTL, so a
/// hit is never more than `ttl` stale even if `invalidate_stale` is never called.
#[derive(Debug, Default)]
pub struct InMemoryCache {
    ttl: Option<Duration>,
    bars: RwLock<HashMap<RangeKey, CacheEntry<Vec<PriceBar>>>>,
    series: RwLock<HashMap<RangeKey, CacheEntry<Series>>>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache without expiry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new empty in-memory cache whose entries expire after `ttl`.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl: Some(ttl),
            ..Default::default()
        }
    }

    fn is_fresh<T>(&self, entry: &CacheEntry<T>) -> bool {
        self.ttl.is_none_or(|ttl| !entry.is_stale(ttl))
    }
}

#[async_trait]
impl DataCache for InMemoryCache {
    #[instrument(skip(self), fields(provider = %provider, symbol = %symbol))]
    async fn get_bars(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<PriceBar>>> {
        let key = RangeKey::new(provider, symbol.as_str(), start, end);

        let cache = self.bars.read().await;
        match cache.get(&key).filter(|entry| self.is_fresh(entry)) {
            Some(entry) => {
                debug!("Cache hit for price bars");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for price bars");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, bars), fields(provider = %provider, symbol = %symbol, count = bars.len()))]
    async fn put_bars(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        bars: &[PriceBar],
    ) -> Result<()> {
        let key = RangeKey::new(provider, symbol.as_str(), start, end);

        let mut cache = self.bars.write().await;
        cache.insert(key, CacheEntry::new(bars.to_vec()));
        debug!("Cached {} price bars", bars.len());
        Ok(())
    }

    #[instrument(skip(self), fields(provider = %provider, series = %id))]
    async fn get_series(
        &self,
        provider: &str,
        id: &SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Series>> {
        let key = RangeKey::new(provider, id.as_str(), start, end);

        let cache = self.series.read().await;
        match cache.get(&key).filter(|entry| self.is_fresh(entry)) {
            Some(entry) => {
                debug!("Cache hit for liquidity series");
                Ok(Some(entry.data.clone()))
            }
            None => {
                debug!("Cache miss for liquidity series");
                Ok(None)
            }
        }
    }

    #[instrument(skip(self, series), fields(provider = %provider, series = %id, count = series.len()))]
    async fn put_series(
        &self,
        provider: &str,
        id: &SeriesId,
        start: NaiveDate,
        end: NaiveDate,
        series: &Series,
    ) -> Result<()> {
        let key = RangeKey::new(provider, id.as_str(), start, end);

        let mut cache = self.series.write().await;
        cache.insert(key, CacheEntry::new(series.clone()));
        debug!("Cached {} liquidity observations", series.len());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize> {
        let mut total_removed = 0usize;

        {
            let mut cache = self.bars.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        {
            let mut cache = self.series.write().await;
            let before = cache.len();
            cache.retain(|_, entry| !entry.is_stale(ttl));
            total_removed += before - cache.len();
        }

        if total_removed > 0 {
            debug!("Invalidated {} stale cache entries", total_removed);
        }

        Ok(total_removed)
    }

    #[instrument(skip(self))]
    async fn clear(&self) -> Result<()> {
        self.bars.write().await.clear();
        self.series.write().await.clear();
        debug!("Cleared all cache entries");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquidity_core::TimePoint;

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_memory_cache_bars() {
        let cache = InMemoryCache::new();
        let symbol = Symbol::new("^GSPC");
        let (start, end) = range();

        // Initially no data
        assert!(cache.get_bars("test", &symbol, start, end).await.unwrap().is_none());

        let bars = vec![
            PriceBar::new(start, 150.0, 152.0, 149.0, 151.0, 1_000_000.0).unwrap(),
            PriceBar::new(end, 151.0, 153.0, 150.0, 152.0, 1_100_000.0).unwrap(),
        ];
        cache.put_bars("test", &symbol, start, end, &bars).await.unwrap();

        let cached = cache.get_bars("test", &symbol, start, end).await.unwrap();
        assert_eq!(cached, Some(bars));

        // A different range is a different key
        assert!(cache.get_bars("test", &symbol, start, start).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_series() {
        let cache = InMemoryCache::new();
        let id = SeriesId::new("WALCL");
        let (start, end) = range();

        let series = Series::from_points(vec![TimePoint::new(start, 7_000_000.0)]).unwrap();
        cache.put_series("fred", &id, start, end, &series).await.unwrap();

        assert_eq!(cache.get_series("fred", &id, start, end).await.unwrap(), Some(series));
        assert!(cache.get_series("other", &id, start, end).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ttl_hides_expired_entries() {
        let cache = InMemoryCache::with_ttl(Duration::ZERO);
        let id = SeriesId::new("WALCL");
        let (start, end) = range();
        let series = Series::from_points(vec![TimePoint::new(start, 1.0)]).unwrap();

        cache.put_series("fred", &id, start, end, &series).await.unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert!(cache.get_series("fred", &id, start, end).await.unwrap().is_none());
        assert_eq!(cache.invalidate_stale(Duration::ZERO).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_memory_cache_clear() {
        let cache = InMemoryCache::new();
        let id = SeriesId::new("WALCL");
        let (start, end) = range();
        let series = Series::from_points(vec![TimePoint::new(start, 1.0)]).unwrap();

        cache.put_series("fred", &id, start, end, &series).await.unwrap();
        cache.clear().await.unwrap();

        assert!(cache.get_series("fred", &id, start, end).await.unwrap().is_none());
    }
}
