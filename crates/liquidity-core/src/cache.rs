//! Cache trait for storing fetched upstream data.
//!
//! This module defines the [`DataCache`] trait that provides a unified interface
//! for caching price bars and liquidity series between requests.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::time::Duration;

use crate::{
    error::Result,
    types::{PriceBar, Series, SeriesId, Symbol},
};

/// Trait for caching fetched upstream data.
///
/// Implementations must never return an entry older than their configured
/// time-to-live; beyond that no coherency is assumed.
#[async_trait]
pub trait DataCache: Send + Sync {
    /// Retrieves cached bars for a symbol and exact date range.
    ///
    /// Returns `Ok(Some(bars))` if cached data exists, `Ok(None)` if not cached.
    async fn get_bars(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Vec<PriceBar>>>;

    /// Stores bars fetched for a symbol and date range.
    async fn put_bars(
        &self,
        provider: &str,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
        bars: &[PriceBar],
    ) -> Result<()>;

    /// Retrieves a cached liquidity series for an exact date range.
    ///
    /// Returns `Ok(Some(series))` if cached, `Ok(None)` if not cached.
    async fn get_series(
        &self,
        provider: &str,
        id: &SeriesId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<Series>>;

    /// Stores a liquidity series fetched for a date range.
    async fn put_series(
        &self,
        provider: &str,
        id: &SeriesId,
        start: NaiveDate,
        end: NaiveDate,
        series: &Series,
    ) -> Result<()>;

    /// Removes cache entries older than the specified TTL.
    ///
    /// Returns the number of entries invalidated.
    async fn invalidate_stale(&self, ttl: Duration) -> Result<usize>;

    /// Clears all cached data.
    async fn clear(&self) -> Result<()>;
}
