//! Data frequency and candle period definitions.
//!
//! This module defines [`DataFrequency`] for the native sampling of upstream
//! feeds and [`CandlePeriod`] for the bar size a chart is resampled to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LiquidityError;

/// Native frequency of an upstream time series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataFrequency {
    /// One observation per business day.
    Daily,
    /// One observation per week (e.g. Wednesday balance-sheet levels).
    Weekly,
    /// One observation per month.
    Monthly,
}

/// Bar size a chart is rendered at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CandlePeriod {
    /// Daily bars, passed through unchanged.
    #[default]
    Daily,
    /// Weekly bars covering Saturday to Friday, labelled with the Friday.
    Weekly,
    /// Monthly bars labelled with the last calendar day of the month.
    Monthly,
}

impl CandlePeriod {
    /// Returns the short interval label used by chart APIs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Daily => "1d",
            Self::Weekly => "1wk",
            Self::Monthly => "1mo",
        }
    }
}

impl fmt::Display for CandlePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        f.write_str(name)
    }
}

impl FromStr for CandlePeriod {
    type Err = LiquidityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" | "1d" | "d" => Ok(Self::Daily),
            "weekly" | "week" | "1wk" | "w" => Ok(Self::Weekly),
            "monthly" | "month" | "1mo" | "m" => Ok(Self::Monthly),
            other => Err(LiquidityError::InvalidConfig(format!(
                "unsupported candle period: {other}"
            ))),
        }
    }
}
