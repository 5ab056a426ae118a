//! Request-scoped dashboard configuration.
//!
//! Everything the presentation layer lets a user pick (lookback window,
//! candle period, event overlay, detection threshold) plus the tunables of
//! the derived-metrics and refresh-clock stages.

use std::num::NonZero;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{LiquidityError, Result};
use crate::frequency::CandlePeriod;

/// How a rolling statistic treats an incomplete leading window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    /// Undefined until `window` observations are available.
    #[default]
    FullWindow,
    /// Defined from the first observation using whatever is available.
    Partial,
}

/// Window lengths for the derived-metrics stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Trailing window of the liquidity moving average.
    pub mean_window: NonZero<usize>,
    /// Leading-window policy of the moving average.
    pub mean_policy: WindowPolicy,
    /// Lag (in rows) of the year-over-year change.
    pub yoy_lag: NonZero<usize>,
    /// Trailing window of the price/liquidity correlation.
    pub corr_window: NonZero<usize>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            mean_window: NonZero::<usize>::MIN.saturating_add(19),
            mean_policy: WindowPolicy::FullWindow,
            yoy_lag: NonZero::<usize>::MIN.saturating_add(251),
            corr_window: NonZero::<usize>::MIN.saturating_add(89),
        }
    }
}

/// Scheduled refresh settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Hours of day (UTC) at which upstream data is refreshed.
    pub hours_utc: Vec<u32>,
    /// Zone the next refresh is displayed in.
    pub display_timezone: Tz,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            hours_utc: vec![13, 22],
            display_timezone: chrono_tz::Asia::Seoul,
        }
    }
}

impl RefreshConfig {
    /// Checks that at least one hour is configured and every hour is in `0..24`.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidConfig`] otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.hours_utc.is_empty() {
            return Err(LiquidityError::InvalidConfig(
                "refresh hour list is empty".to_string(),
            ));
        }
        if let Some(hour) = self.hours_utc.iter().find(|h| **h > 23) {
            return Err(LiquidityError::InvalidConfig(format!(
                "refresh hour {hour} is outside 0..=23"
            )));
        }
        Ok(())
    }
}

/// Settings for one dashboard request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Years of history shown and used for the liquidity index range.
    pub lookback_years: u32,
    /// Candle period the price chart is resampled to.
    pub period: CandlePeriod,
    /// Whether the event overlay is computed.
    pub show_events: bool,
    /// Absolute daily return that triggers an auto-detected event.
    pub event_threshold: f64,
    /// Maximum number of events listed in the event table.
    pub event_table_limit: usize,
    /// Derived-metric windows.
    pub metrics: MetricsConfig,
    /// Refresh schedule.
    pub refresh: RefreshConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            lookback_years: 5,
            period: CandlePeriod::Daily,
            show_events: true,
            event_threshold: 0.05,
            event_table_limit: 10,
            metrics: MetricsConfig::default(),
            refresh: RefreshConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Sets the lookback window in years.
    #[must_use]
    pub const fn with_lookback_years(mut self, years: u32) -> Self {
        self.lookback_years = years;
        self
    }

    /// Sets the candle period.
    #[must_use]
    pub const fn with_period(mut self, period: CandlePeriod) -> Self {
        self.period = period;
        self
    }

    /// Enables or disables the event overlay.
    #[must_use]
    pub const fn with_events(mut self, show_events: bool) -> Self {
        self.show_events = show_events;
        self
    }

    /// Sets the event detection threshold (e.g. `0.05` for 5%).
    #[must_use]
    pub const fn with_event_threshold(mut self, threshold: f64) -> Self {
        self.event_threshold = threshold;
        self
    }

    /// Validates every field.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidConfig`] describing the first bad field.
    pub fn validate(&self) -> Result<()> {
        if self.lookback_years == 0 {
            return Err(LiquidityError::InvalidConfig(
                "lookback_years must be at least 1".to_string(),
            ));
        }
        if !self.event_threshold.is_finite() || self.event_threshold <= 0.0 {
            return Err(LiquidityError::InvalidConfig(format!(
                "event_threshold must be a positive number, got {}",
                self.event_threshold
            )));
        }
        self.refresh.validate()
    }
}
