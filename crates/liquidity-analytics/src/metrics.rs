//! Rolling statistics over aligned series.
//!
//! Every function returns one output per input; positions where a statistic
//! is undefined (window not filled, zero denominator, too few valid pairs)
//! are `None` rather than an error.

use std::num::NonZero;

use liquidity_core::{LiquidityError, MetricsConfig, Result, WindowPolicy};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::frame::AlignedFrame;

/// Moving average of the liquidity column.
pub const COL_LIQUIDITY_MEAN: &str = "liquidity_mean";
/// Year-over-year percent change of the liquidity column.
pub const COL_LIQUIDITY_YOY: &str = "liquidity_yoy";
/// Year-over-year percent change of the close column.
pub const COL_CLOSE_YOY: &str = "close_yoy";
/// Rolling correlation between close and liquidity.
pub const COL_CORRELATION: &str = "corr";

/// Arithmetic mean of the trailing `window` values at each position.
///
/// With [`WindowPolicy::FullWindow`] the first `window - 1` positions are
/// `None`; with [`WindowPolicy::Partial`] they average what is available.
/// A window holding a non-finite value is `None`.
#[must_use]
pub fn rolling_mean(values: &[f64], window: NonZero<usize>, policy: WindowPolicy) -> Vec<Option<f64>> {
    let window = window.get();
    let mut sum = 0.0;
    let mut non_finite = 0usize;
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            if v.is_finite() {
                sum += v;
            } else {
                non_finite += 1;
            }
            if i >= window {
                let old = values[i - window];
                if old.is_finite() {
                    sum -= old;
                } else {
                    non_finite -= 1;
                }
            }
            let count = (i + 1).min(window);
            match policy {
                WindowPolicy::FullWindow if count < window => None,
                _ if non_finite > 0 => None,
                _ => Some(sum / count as f64),
            }
        })
        .collect()
}

/// Percent change versus the value `lag` positions earlier.
///
/// `(v[t] - v[t-lag]) / v[t-lag] * 100`; `None` for the first `lag` positions
/// and wherever the base value is zero or not finite.
#[must_use]
pub fn pct_change(values: &[f64], lag: NonZero<usize>) -> Vec<Option<f64>> {
    let lag = lag.get();
    (0..values.len())
        .map(|i| {
            let base = values[i.checked_sub(lag)?];
            if base == 0.0 || !base.is_finite() {
                return None;
            }
            let change = (values[i] - base) / base * 100.0;
            change.is_finite().then_some(change)
        })
        .collect()
}

/// Pearson correlation of the trailing `window` pairs at each position.
///
/// Undefined until `window` positions exist. Within a window, pairs where
/// either side is NaN are skipped; fewer than two valid pairs, or a side with
/// zero variance, yields `None`. Results are clamped to `[-1, 1]`.
///
/// # Errors
/// Returns [`LiquidityError::InvalidData`] if the inputs differ in length.
pub fn rolling_corr(a: &[f64], b: &[f64], window: NonZero<usize>) -> Result<Vec<Option<f64>>> {
    if a.len() != b.len() {
        return Err(LiquidityError::InvalidData(format!(
            "correlation inputs differ in length: {} vs {}",
            a.len(),
            b.len()
        )));
    }
    let window = window.get();
    Ok((0..a.len())
        .map(|end| {
            let start = (end + 1).checked_sub(window)?;
            pearson(&a[start..=end], &b[start..=end])
        })
        .collect())
}

fn pearson(a: &[f64], b: &[f64]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(x, y)| (*x, *y))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    let r = cov / (var_a * var_b).sqrt();
    r.is_finite().then(|| r.clamp(-1.0, 1.0))
}

/// Position of the latest value within the min-max range of `values`, 0 to 100.
///
/// Non-finite values are ignored. The whole slice is the normalization range,
/// so callers pass exactly the lookback they want ranked against.
///
/// # Errors
/// Returns [`LiquidityError::EmptyResult`] if there is no finite value and
/// [`LiquidityError::DegenerateRange`] if every value is equal.
pub fn minmax_index(values: &[f64]) -> Result<f64> {
    let mut finite = values.iter().copied().filter(|v| v.is_finite());
    let first = finite
        .next()
        .ok_or_else(|| LiquidityError::EmptyResult("no values to normalize".to_string()))?;
    let (min, max, latest) = finite.fold((first, first, first), |(lo, hi, _), v| {
        (lo.min(v), hi.max(v), v)
    });
    if max == min {
        return Err(LiquidityError::DegenerateRange(min));
    }
    Ok((latest - min) / (max - min) * 100.0)
}

/// Qualitative band of the 0-100 liquidity index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityRegime {
    /// Index below 30: liquidity near the bottom of its range.
    Tight,
    /// Index from 30 up to 70.
    Neutral,
    /// Index of 70 or more: liquidity near the top of its range.
    Ample,
}

impl LiquidityRegime {
    /// Classifies an index value.
    #[must_use]
    pub fn classify(index: f64) -> Self {
        if index < 30.0 {
            Self::Tight
        } else if index < 70.0 {
            Self::Neutral
        } else {
            Self::Ample
        }
    }
}

/// Adds the standard derived columns to `frame`.
///
/// - [`COL_LIQUIDITY_MEAN`]: `rolling_mean(liquidity, mean_window, mean_policy)`
/// - [`COL_LIQUIDITY_YOY`]: `pct_change(liquidity, yoy_lag)`
/// - [`COL_CLOSE_YOY`]: `pct_change(close, yoy_lag)`
/// - [`COL_CORRELATION`]: `rolling_corr(close, liquidity, corr_window)`
///
/// # Errors
/// Only fails if a column cannot be attached, which indicates a bug.
pub fn add_derived_columns(frame: AlignedFrame, config: &MetricsConfig) -> Result<AlignedFrame> {
    let mean = rolling_mean(frame.liquidity(), config.mean_window, config.mean_policy);
    let liquidity_yoy = pct_change(frame.liquidity(), config.yoy_lag);
    let close_yoy = pct_change(frame.close(), config.yoy_lag);
    let corr = rolling_corr(frame.close(), frame.liquidity(), config.corr_window)?;

    debug!(
        rows = frame.len(),
        mean_window = config.mean_window.get(),
        yoy_lag = config.yoy_lag.get(),
        corr_window = config.corr_window.get(),
        "Computed derived columns"
    );

    frame
        .with_column(COL_LIQUIDITY_MEAN, mean)?
        .with_column(COL_LIQUIDITY_YOY, liquidity_yoy)?
        .with_column(COL_CLOSE_YOY, close_yoy)?
        .with_column(COL_CORRELATION, corr)
}
