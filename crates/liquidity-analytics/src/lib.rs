#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/liquidity/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Transforms from raw feeds to dashboard values.
//!
//! All functions here are synchronous and free of I/O; undefined statistics
//! are `None`, never errors.

/// Forward-fill alignment onto the price calendar.
pub mod align;
/// Next scheduled refresh.
pub mod clock;
/// Net liquidity from balance-sheet components.
pub mod composite;
/// Curated liquidity timeline.
pub mod curated;
/// Large-move detection and timeline merging.
pub mod events;
/// Aligned price/liquidity frame.
pub mod frame;
/// Rolling statistics and the liquidity index.
pub mod metrics;
/// Weekly and monthly candle aggregation.
pub mod resample;

pub use align::{align, align_bars};
pub use clock::{MIN_REFRESH_SECONDS, RefreshSchedule, next_refresh};
pub use events::{detect, detect_and_merge, merge, select_for_display};
pub use frame::{AlignedFrame, bars_to_dataframe};
pub use metrics::{
    LiquidityRegime, add_derived_columns, minmax_index, pct_change, rolling_corr, rolling_mean,
};
pub use resample::resample;
