//! Core data types for the liquidity dashboard.
//!
//! This module defines the fundamental data structures:
//!
//! - [`Symbol`] - Equity index ticker
//! - [`SeriesId`] - Macro series identifier (e.g. `WALCL`)
//! - [`TimePoint`] / [`Series`] - Date-ordered numeric series
//! - [`PriceBar`] - Validated OHLCV bar
//! - [`Event`] - Timeline annotation with a typed [`Direction`]
//! - [`LiquiditySpec`] / [`CentralBank`] - Which liquidity series to chart

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{LiquidityError, Result};

/// An equity index ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identifier of an upstream macro series (e.g. `WALCL`, `RRPONTSYD`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(String);

impl SeriesId {
    /// Creates a new series id, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// A single dated observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Calendar day of the observation.
    pub date: NaiveDate,
    /// Observed value.
    pub value: f64,
}

impl TimePoint {
    /// Creates a new time point.
    #[must_use]
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// A date-ordered series of observations.
///
/// Dates are strictly increasing; there are never two points on the same day.
/// Gaps (non-trading or non-reporting days) are allowed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<TimePoint>", into = "Vec<TimePoint>")]
pub struct Series {
    points: Vec<TimePoint>,
}

impl Series {
    /// Creates an empty series.
    #[must_use]
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates a series from points that must already be strictly increasing by date.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidData`] if two points are out of order
    /// or share a date.
    pub fn from_points(points: Vec<TimePoint>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(LiquidityError::InvalidData(format!(
                "series dates must be strictly increasing: {} then {}",
                pair[0].date, pair[1].date
            )));
        }
        Ok(Self { points })
    }

    /// Builds a series from unordered observations.
    ///
    /// Points are sorted by date; when a date repeats the last value given wins.
    #[must_use]
    pub fn from_unsorted(mut points: Vec<TimePoint>) -> Self {
        points.reverse();
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        Self { points }
    }

    /// Returns the number of observations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if there are no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the observations as a slice.
    #[must_use]
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Returns an iterator over the observations.
    pub fn iter(&self) -> impl Iterator<Item = &TimePoint> {
        self.points.iter()
    }

    /// Returns the observed values in date order.
    #[must_use]
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// Returns the first observation.
    #[must_use]
    pub fn first(&self) -> Option<&TimePoint> {
        self.points.first()
    }

    /// Returns the most recent observation.
    #[must_use]
    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// Returns the last value observed at or before `date`.
    #[must_use]
    pub fn value_as_of(&self, date: NaiveDate) -> Option<f64> {
        let idx = self.points.partition_point(|p| p.date <= date);
        idx.checked_sub(1).map(|i| self.points[i].value)
    }

    /// Returns the observations dated within `[start, end]`.
    #[must_use]
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Self {
        let lo = self.points.partition_point(|p| p.date < start);
        let hi = self.points.partition_point(|p| p.date <= end);
        Self {
            points: self.points[lo..hi.max(lo)].to_vec(),
        }
    }
}

impl TryFrom<Vec<TimePoint>> for Series {
    type Error = LiquidityError;

    fn try_from(points: Vec<TimePoint>) -> Result<Self> {
        Self::from_points(points)
    }
}

impl From<Series> for Vec<TimePoint> {
    fn from(series: Series) -> Self {
        series.points
    }
}

impl IntoIterator for Series {
    type Item = TimePoint;
    type IntoIter = std::vec::IntoIter<TimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a TimePoint;
    type IntoIter = std::slice::Iter<'a, TimePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// OHLCV (Open, High, Low, Close, Volume) bar for one day or period.
///
/// Prices are positive, volume is non-negative and
/// `low <= min(open, close)`, `max(open, close) <= high`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Session date (or period label once resampled).
    pub date: NaiveDate,
    /// Opening price.
    pub open: f64,
    /// Highest price during the period.
    pub high: f64,
    /// Lowest price during the period.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Trading volume.
    pub volume: f64,
}

impl PriceBar {
    /// Creates a new bar, validating the OHLC invariants.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidData`] if a price is not positive, the
    /// volume is negative, or open/close fall outside `[low, high]`.
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Result<Self> {
        let bar = Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        };
        if bar.is_valid() {
            Ok(bar)
        } else {
            Err(LiquidityError::InvalidData(format!(
                "bar on {date} violates OHLC invariants: o={open} h={high} l={low} c={close} v={volume}"
            )))
        }
    }

    /// Returns true if the bar satisfies the OHLC invariants.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }
}

/// Direction of the move an event marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Price or liquidity moved up.
    Up,
    /// Price or liquidity moved down.
    Down,
}

impl Direction {
    /// Direction of a signed return; zero counts as down.
    #[must_use]
    pub fn of_return(r: f64) -> Self {
        if r > 0.0 { Self::Up } else { Self::Down }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Up => "up",
            Self::Down => "down",
        })
    }
}

impl FromStr for Direction {
    type Err = LiquidityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(LiquidityError::InvalidData(format!(
                "event direction must be up or down, got {other:?}"
            ))),
        }
    }
}

/// Where an event came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    /// Hand-authored historical event.
    Curated,
    /// Synthesized from a large daily return.
    Auto,
}

/// A dated annotation on the chart timeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Day the event is pinned to.
    pub date: NaiveDate,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: String,
    /// Marker glyph drawn on the chart.
    pub glyph: String,
    /// Direction of the move.
    pub direction: Direction,
    /// Origin of the event.
    pub source: EventSource,
}

impl Event {
    /// Creates a curated event.
    #[must_use]
    pub fn curated(
        date: NaiveDate,
        title: impl Into<String>,
        description: impl Into<String>,
        glyph: impl Into<String>,
        direction: Direction,
    ) -> Self {
        Self {
            date,
            title: title.into(),
            description: description.into(),
            glyph: glyph.into(),
            direction,
            source: EventSource::Curated,
        }
    }

    /// Parses a curated event from its textual fields.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidData`] if the date is not `YYYY-MM-DD`
    /// or the direction is neither `up` nor `down`.
    pub fn parse(
        date: &str,
        title: &str,
        description: &str,
        glyph: &str,
        direction: &str,
    ) -> Result<Self> {
        let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
            .map_err(|e| LiquidityError::InvalidData(format!("event date {date:?}: {e}")))?;
        Ok(Self::curated(
            date,
            title,
            description,
            glyph,
            direction.parse()?,
        ))
    }
}

/// Which liquidity series a dashboard charts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquiditySpec {
    /// A single upstream series used as-is.
    Single(SeriesId),
    /// US net liquidity: Fed total assets minus TGA minus overnight reverse repo.
    NetLiquidity,
}

impl LiquiditySpec {
    /// Label used for cache keys and logging.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Single(id) => id.to_string(),
            Self::NetLiquidity => "NET_LIQUIDITY".to_string(),
        }
    }
}

/// Component of a composite liquidity series.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiquidityComponent {
    /// Upstream series id.
    pub id: &'static str,
    /// Multiplier converting the published unit to millions of USD.
    pub scale: f64,
    /// Sign applied when summing (+1 adds liquidity, -1 drains it).
    pub sign: f64,
}

/// Components of [`LiquiditySpec::NetLiquidity`].
///
/// FRED publishes `RRPONTSYD` in billions of USD while the other two are in
/// millions, so the reverse repo is scaled by 1000 before subtracting. Net
/// liquidity computed from the raw published values (no scaling) will differ
/// by roughly the reverse repo balance.
pub const NET_LIQUIDITY_COMPONENTS: [LiquidityComponent; 3] = [
    // Fed total assets, millions of USD, weekly (Wednesday)
    LiquidityComponent {
        id: "WALCL",
        scale: 1.0,
        sign: 1.0,
    },
    // Treasury General Account, millions of USD, weekly
    LiquidityComponent {
        id: "WDTGAL",
        scale: 1.0,
        sign: -1.0,
    },
    // Overnight reverse repo, billions of USD, daily
    LiquidityComponent {
        id: "RRPONTSYD",
        scale: 1_000.0,
        sign: -1.0,
    },
];

/// Central bank whose balance sheet drives the liquidity column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralBank {
    /// Federal Reserve (United States).
    #[default]
    Fed,
    /// European Central Bank (euro area).
    Ecb,
    /// Bank of Japan.
    Boj,
}

impl CentralBank {
    /// Liquidity series charted for this central bank.
    #[must_use]
    pub fn liquidity_spec(&self) -> LiquiditySpec {
        match self {
            Self::Fed => LiquiditySpec::NetLiquidity,
            Self::Ecb => LiquiditySpec::Single(SeriesId::new("ECBASSETSW")),
            Self::Boj => LiquiditySpec::Single(SeriesId::new("JPNASSETS")),
        }
    }

    /// Default benchmark index for this central bank's market.
    #[must_use]
    pub fn default_index(&self) -> Symbol {
        match self {
            Self::Fed => Symbol::new("^GSPC"),
            Self::Ecb => Symbol::new("^STOXX50E"),
            Self::Boj => Symbol::new("^N225"),
        }
    }
}

impl FromStr for CentralBank {
    type Err = LiquidityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fed" | "us" | "usa" => Ok(Self::Fed),
            "ecb" | "eu" | "euro" => Ok(Self::Ecb),
            "boj" | "jp" | "japan" => Ok(Self::Boj),
            other => Err(LiquidityError::InvalidConfig(format!(
                "unknown central bank: {other}"
            ))),
        }
    }
}
