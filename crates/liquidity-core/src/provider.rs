//! Provider traits for fetching upstream feeds.
//!
//! This module defines the core provider traits:
//!
//! - [`DataProvider`] - Base trait for all data providers
//! - [`PriceDataProvider`] - Daily OHLCV bars for an equity index
//! - [`LiquidityDataProvider`] - Central-bank balance sheet series

use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::{
    error::{LiquidityError, Result},
    frequency::DataFrequency,
    types::{PriceBar, Series, SeriesId, Symbol},
};

/// Base trait for all data providers.
///
/// All data providers must implement this trait to provide basic metadata
/// about the provider and its capabilities.
pub trait DataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "FRED").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;

    /// Returns the native frequencies this provider serves.
    fn supported_frequencies(&self) -> &[DataFrequency];
}

/// Provider for daily OHLCV price bars.
#[async_trait]
pub trait PriceDataProvider: DataProvider {
    /// Fetches daily bars for `symbol` between `start` and `end` inclusive.
    ///
    /// Bars are returned in ascending date order.
    async fn fetch_bars(
        &self,
        symbol: &Symbol,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>>;
}

/// Result of fetching several liquidity series at once.
///
/// A batch may be partial: series that failed are listed in `failed`
/// together with their error, and callers decide whether they can proceed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LiquidityBatch {
    /// Series fetched successfully, keyed by id.
    pub series: BTreeMap<SeriesId, Series>,
    /// Series that could not be fetched.
    pub failed: Vec<(SeriesId, LiquidityError)>,
}

impl LiquidityBatch {
    /// Returns true if every requested series was fetched.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Returns the fetched series for `id`.
    #[must_use]
    pub fn get(&self, id: &SeriesId) -> Option<&Series> {
        self.series.get(id)
    }
}

/// Provider for macro liquidity series.
#[async_trait]
pub trait LiquidityDataProvider: DataProvider {
    /// Fetches one series at its native frequency.
    async fn fetch_series(&self, id: &SeriesId, start: NaiveDate, end: NaiveDate)
    -> Result<Series>;

    /// Fetches several series, collecting failures instead of aborting.
    ///
    /// Default implementation calls `fetch_series` concurrently for each id.
    /// An empty series counts as a failure.
    async fn fetch_many(
        &self,
        ids: &[SeriesId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> LiquidityBatch {
        let fetches = ids.iter().map(|id| async move {
            let result = match self.fetch_series(id, start, end).await {
                Ok(series) if series.is_empty() => Err(LiquidityError::EmptyResult(format!(
                    "{id} returned no observations"
                ))),
                other => other,
            };
            (id.clone(), result)
        });

        let mut batch = LiquidityBatch::default();
        for (id, result) in futures::future::join_all(fetches).await {
            match result {
                Ok(series) => {
                    batch.series.insert(id, series);
                }
                Err(e) => batch.failed.push((id, e)),
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TimePoint;

    #[derive(Debug)]
    struct StaticProvider;

    impl DataProvider for StaticProvider {
        fn name(&self) -> &str {
            "static"
        }

        fn description(&self) -> &str {
            "fixed series for tests"
        }

        fn supported_frequencies(&self) -> &[DataFrequency] {
            &[DataFrequency::Weekly]
        }
    }

    #[async_trait]
    impl LiquidityDataProvider for StaticProvider {
        async fn fetch_series(
            &self,
            id: &SeriesId,
            start: NaiveDate,
            _end: NaiveDate,
        ) -> Result<Series> {
            match id.as_str() {
                "GOOD" => Series::from_points(vec![TimePoint::new(start, 1.0)]),
                "EMPTY" => Ok(Series::new()),
                _ => Err(LiquidityError::SeriesNotFound(id.to_string())),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_many_collects_partial_results() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let ids = [
            SeriesId::new("GOOD"),
            SeriesId::new("EMPTY"),
            SeriesId::new("MISSING"),
        ];

        let batch = StaticProvider.fetch_many(&ids, start, start).await;

        assert!(!batch.is_complete());
        assert_eq!(batch.series.len(), 1);
        assert!(batch.get(&SeriesId::new("GOOD")).is_some());
        let failed: Vec<_> = batch.failed.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(failed, vec!["EMPTY", "MISSING"]);
    }
}
