#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/liquidity/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the liquidity dashboard.
//!
//! This crate provides the foundational abstractions:
//!
//! - [`PriceDataProvider`](provider::PriceDataProvider) - Daily index bars
//! - [`LiquidityDataProvider`](provider::LiquidityDataProvider) - Balance-sheet series
//! - [`DataCache`](cache::DataCache) - Caching abstraction
//! - [`DashboardConfig`](config::DashboardConfig) - Request-scoped settings

/// Cache trait for storing fetched data.
pub mod cache;
/// Request configuration.
pub mod config;
/// Error types for dashboard operations.
pub mod error;
/// Data frequency and candle period definitions.
pub mod frequency;
/// Provider traits for fetching upstream feeds.
pub mod provider;
/// Core data types (Series, PriceBar, Event, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::DataCache;
pub use config::{DashboardConfig, MetricsConfig, RefreshConfig, WindowPolicy};
pub use error::{LiquidityError, Result};
pub use frequency::{CandlePeriod, DataFrequency};
pub use provider::{DataProvider, LiquidityBatch, LiquidityDataProvider, PriceDataProvider};
pub use types::{
    CentralBank, Direction, Event, EventSource, LiquidityComponent, LiquiditySpec,
    NET_LIQUIDITY_COMPONENTS, PriceBar, Series, SeriesId, Symbol, TimePoint,
};
