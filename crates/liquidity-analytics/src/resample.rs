//! Daily bar aggregation into weekly and monthly candles.

use chrono::{Datelike, Days, Months, NaiveDate};
use liquidity_core::{CandlePeriod, LiquidityError, PriceBar, Result};

/// First Friday on or after `date`, so weeks run Saturday to Friday.
fn week_ending_friday(date: NaiveDate) -> Option<NaiveDate> {
    let ahead = (11 - date.weekday().num_days_from_monday()) % 7;
    date.checked_add_days(Days::new(u64::from(ahead)))
}

/// Last calendar day of the month containing `date`.
fn month_end(date: NaiveDate) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

/// Aggregates sorted daily bars into `period` candles.
///
/// Daily is the identity. Weekly candles cover Saturday to Friday and are
/// labelled with that Friday, so weekend bars join the following week.
/// Monthly candles are labelled with the last day of their month.
/// Within a bucket: open is the first open, high the max high, low the min
/// low, close the last close and volume the sum. Empty buckets are never
/// emitted; output stays in ascending date order.
///
/// # Errors
/// Returns [`LiquidityError::InvalidData`] if `bars` are not strictly
/// increasing by date.
pub fn resample(bars: &[PriceBar], period: CandlePeriod) -> Result<Vec<PriceBar>> {
    if let Some(pair) = bars.windows(2).find(|w| w[0].date >= w[1].date) {
        return Err(LiquidityError::InvalidData(format!(
            "bars must be sorted ascending by date: {} then {}",
            pair[0].date, pair[1].date
        )));
    }

    let bucket_of: fn(NaiveDate) -> Option<NaiveDate> = match period {
        CandlePeriod::Daily => return Ok(bars.to_vec()),
        CandlePeriod::Weekly => week_ending_friday,
        CandlePeriod::Monthly => month_end,
    };

    let mut out: Vec<PriceBar> = Vec::new();
    for bar in bars {
        let label = bucket_of(bar.date).ok_or_else(|| {
            LiquidityError::InvalidData(format!("no {period} bucket for {}", bar.date))
        })?;
        match out.last_mut() {
            Some(agg) if agg.date == label => {
                agg.high = agg.high.max(bar.high);
                agg.low = agg.low.min(bar.low);
                agg.close = bar.close;
                agg.volume += bar.volume;
            }
            _ => out.push(PriceBar { date: label, ..*bar }),
        }
    }
    Ok(out)
}
