//! Scheduled refresh clock.

use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use liquidity_core::{LiquidityError, RefreshConfig, Result};
use serde::{Deserialize, Serialize};

/// Minimum delay before the next refresh, in seconds.
pub const MIN_REFRESH_SECONDS: i64 = 60;

/// Next scheduled refresh.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSchedule {
    /// Instant of the next refresh.
    pub next: DateTime<Utc>,
    /// Whole seconds until the refresh, never below [`MIN_REFRESH_SECONDS`].
    pub seconds_until: i64,
}

impl RefreshSchedule {
    /// Computes the schedule from a refresh configuration.
    ///
    /// # Errors
    /// Same as [`next_refresh`].
    pub fn from_config(now: DateTime<Utc>, config: &RefreshConfig) -> Result<Self> {
        next_refresh(now, &config.hours_utc)
    }

    /// Next refresh in the given display zone.
    #[must_use]
    pub fn in_timezone(&self, tz: Tz) -> DateTime<Tz> {
        self.next.with_timezone(&tz)
    }

    /// Formats the next refresh as `YYYY-MM-DD HH:MM <zone>`.
    #[must_use]
    pub fn describe(&self, tz: Tz) -> String {
        self.in_timezone(tz).format("%Y-%m-%d %H:%M %Z").to_string()
    }
}

/// Earliest instant strictly after `now` falling on one of `hours_utc` (at `HH:00:00` UTC).
///
/// A target hour equal to `now` counts as passed and rolls to the next day.
///
/// # Errors
/// Returns [`LiquidityError::InvalidConfig`] if `hours_utc` is empty or
/// holds an hour outside `0..=23`.
pub fn next_refresh(now: DateTime<Utc>, hours_utc: &[u32]) -> Result<RefreshSchedule> {
    let today = now.date_naive();
    let mut next: Option<DateTime<Utc>> = None;

    for &hour in hours_utc {
        let mut candidate = today
            .and_hms_opt(hour, 0, 0)
            .ok_or_else(|| {
                LiquidityError::InvalidConfig(format!("refresh hour {hour} is outside 0..=23"))
            })?
            .and_utc();
        if candidate <= now {
            candidate += TimeDelta::days(1);
        }
        next = Some(next.map_or(candidate, |n| n.min(candidate)));
    }

    let next = next.ok_or_else(|| {
        LiquidityError::InvalidConfig("refresh hour list is empty".to_string())
    })?;
    let seconds_until = (next - now).num_seconds().max(MIN_REFRESH_SECONDS);
    Ok(RefreshSchedule {
        next,
        seconds_until,
    })
}
