#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/liquidity/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Liquidity dashboard backend.
//!
//! This crate re-exports the core types, analytics and provider
//! implementations, and provides a [`Dashboard`] that runs the whole
//! fetch, align, derive, resample and annotate pass for one request.
//!
//! # Features
//!
//! - `fred` - FRED provider for central-bank balance sheet series
//! - `yahoo` - Yahoo Finance provider for daily index bars
//!
//! # Example
//!
//! ```rust,ignore
//! use liquidity::{CentralBank, Dashboard, DashboardRequest};
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> liquidity::Result<()> {
//!     let dashboard = Dashboard::new()
//!         .with_fred("your-fred-key")
//!         .with_yahoo()
//!         .with_fed_timeline()?;
//!
//!     let as_of = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
//!     let view = dashboard.build(&DashboardRequest::for_bank(CentralBank::Fed, as_of)).await?;
//!     println!("index = {:?}, regime = {:?}", view.liquidity_index, view.regime);
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use liquidity_core::*;

// Transforms
pub use liquidity_analytics::{
    AlignedFrame, LiquidityRegime, RefreshSchedule, align, align_bars, bars_to_dataframe,
    composite, curated, detect, detect_and_merge, merge, metrics, minmax_index, next_refresh,
    pct_change, resample, rolling_corr, rolling_mean, select_for_display,
};

// Cache implementations
pub use liquidity_cache::{InMemoryCache, NoopCache};

// Providers
#[cfg(feature = "fred")]
pub use liquidity_fred::FredProvider;
#[cfg(feature = "yahoo")]
pub use liquidity_yahoo::YahooProvider;

mod branding;
mod dashboard;
mod session;

pub use branding::{Asset, AssetSource, FileAsset};
pub use dashboard::{
    DEFAULT_CACHE_TTL, DEFAULT_FETCH_TIMEOUT, Dashboard, DashboardRequest, DashboardView,
};
pub use session::{SessionId, SessionState, SessionStore};
