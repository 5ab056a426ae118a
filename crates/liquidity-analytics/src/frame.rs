//! Price/liquidity frame keyed by the price calendar.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use liquidity_core::{LiquidityError, PriceBar, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// `NaiveDate::num_days_from_ce` of 1970-01-01; polars dates count days from there.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Price and liquidity columns on the price series' calendar, plus derived columns.
///
/// Every row has a close and a forward-filled liquidity value. Derived columns
/// hold `None` where a statistic is undefined (e.g. before its window fills).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignedFrame {
    dates: Vec<NaiveDate>,
    close: Vec<f64>,
    liquidity: Vec<f64>,
    columns: BTreeMap<String, Vec<Option<f64>>>,
}

impl AlignedFrame {
    pub(crate) fn from_rows(rows: Vec<(NaiveDate, f64, f64)>) -> Self {
        let mut frame = Self {
            dates: Vec::with_capacity(rows.len()),
            close: Vec::with_capacity(rows.len()),
            liquidity: Vec::with_capacity(rows.len()),
            columns: BTreeMap::new(),
        };
        for (date, close, liquidity) in rows {
            frame.dates.push(date);
            frame.close.push(close);
            frame.liquidity.push(liquidity);
        }
        frame
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns true if the frame has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Row dates, strictly increasing.
    #[must_use]
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Closing prices.
    #[must_use]
    pub fn close(&self) -> &[f64] {
        &self.close
    }

    /// Forward-filled liquidity values.
    #[must_use]
    pub fn liquidity(&self) -> &[f64] {
        &self.liquidity
    }

    /// Returns a derived column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&[Option<f64>]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Names of the derived columns, in sorted order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    /// Date of the last row.
    #[must_use]
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Adds or replaces a derived column.
    ///
    /// # Errors
    /// Returns [`LiquidityError::InvalidData`] if `values` does not have one
    /// entry per row.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Option<f64>>) -> Result<Self> {
        let name = name.into();
        if values.len() != self.len() {
            return Err(LiquidityError::InvalidData(format!(
                "column {name} has {} values for {} rows",
                values.len(),
                self.len()
            )));
        }
        self.columns.insert(name, values);
        Ok(self)
    }

    /// Keeps only the rows dated within `[start, end]`.
    ///
    /// # Errors
    /// Returns [`LiquidityError::EmptyResult`] if no row falls in the window.
    pub fn window(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end).max(lo);
        if lo == hi {
            return Err(LiquidityError::EmptyResult(format!(
                "no aligned rows between {start} and {end}"
            )));
        }
        Ok(Self {
            dates: self.dates[lo..hi].to_vec(),
            close: self.close[lo..hi].to_vec(),
            liquidity: self.liquidity[lo..hi].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), values[lo..hi].to_vec()))
                .collect(),
        })
    }

    /// Converts the frame into a polars `DataFrame`.
    ///
    /// Columns: `date`, `close`, `liquidity`, then every derived column.
    ///
    /// # Errors
    /// Returns [`LiquidityError::Other`] if polars rejects the columns.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let date_col = date_column(&self.dates)?;
        let mut columns = vec![
            date_col,
            Column::new("close".into(), self.close.clone()),
            Column::new("liquidity".into(), self.liquidity.clone()),
        ];
        for (name, values) in &self.columns {
            columns.push(Column::new(name.as_str().into(), values.clone()));
        }
        DataFrame::new(columns).map_err(|e| LiquidityError::Other(e.to_string()))
    }
}

/// Converts OHLCV bars into a polars `DataFrame` with columns
/// `date, open, high, low, close, volume`.
///
/// # Errors
/// Returns [`LiquidityError::Other`] if polars rejects the columns.
pub fn bars_to_dataframe(bars: &[PriceBar]) -> Result<DataFrame> {
    let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
    DataFrame::new(vec![
        date_column(&dates)?,
        Column::new("open".into(), bars.iter().map(|b| b.open).collect::<Vec<_>>()),
        Column::new("high".into(), bars.iter().map(|b| b.high).collect::<Vec<_>>()),
        Column::new("low".into(), bars.iter().map(|b| b.low).collect::<Vec<_>>()),
        Column::new("close".into(), bars.iter().map(|b| b.close).collect::<Vec<_>>()),
        Column::new("volume".into(), bars.iter().map(|b| b.volume).collect::<Vec<_>>()),
    ])
    .map_err(|e| LiquidityError::Other(e.to_string()))
}

fn date_column(dates: &[NaiveDate]) -> Result<Column> {
    let days: Vec<i32> = dates
        .iter()
        .map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)
        .collect();
    Column::new("date".into(), days)
        .cast(&DataType::Date)
        .map_err(|e| LiquidityError::Other(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn frame() -> AlignedFrame {
        AlignedFrame::from_rows(vec![
            (d(2), 100.0, 5.0),
            (d(3), 101.0, 5.0),
            (d(4), 102.0, 6.0),
        ])
    }

    #[test]
    fn test_with_column_checks_length() {
        let err = frame().with_column("x", vec![Some(1.0)]).unwrap_err();
        assert!(matches!(err, LiquidityError::InvalidData(_)));

        let frame = frame()
            .with_column("x", vec![None, Some(1.0), Some(2.0)])
            .unwrap();
        assert_eq!(frame.column("x").unwrap(), &[None, Some(1.0), Some(2.0)]);
        assert_eq!(frame.column_names().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_window_slices_every_column() {
        let frame = frame()
            .with_column("x", vec![None, Some(1.0), Some(2.0)])
            .unwrap()
            .window(d(3), d(31))
            .unwrap();
        assert_eq!(frame.dates(), &[d(3), d(4)]);
        assert_eq!(frame.close(), &[101.0, 102.0]);
        assert_eq!(frame.column("x").unwrap(), &[Some(1.0), Some(2.0)]);
    }

    #[test]
    fn test_window_outside_range_is_empty_result() {
        let err = frame().window(d(10), d(20)).unwrap_err();
        assert!(matches!(err, LiquidityError::EmptyResult(_)));
    }

    #[test]
    fn test_to_dataframe() {
        let df = frame()
            .with_column("corr", vec![None, None, Some(0.5)])
            .unwrap()
            .to_dataframe()
            .unwrap();
        assert_eq!(df.height(), 3);
        assert_eq!(df.width(), 4);
        assert_eq!(df.column("date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("corr").unwrap().null_count(), 2);
    }

    #[test]
    fn test_bars_to_dataframe() {
        let bars = vec![
            PriceBar::new(d(2), 10.0, 11.0, 9.0, 10.5, 100.0).unwrap(),
            PriceBar::new(d(3), 10.5, 12.0, 10.0, 11.5, 200.0).unwrap(),
        ];
        let df = bars_to_dataframe(&bars).unwrap();
        assert_eq!(df.height(), 2);
        assert_eq!(df.width(), 6);
    }
}
