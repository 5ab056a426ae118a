//! Forward-fill alignment of a liquidity series onto the price calendar.

use liquidity_core::{LiquidityError, PriceBar, Result, Series, TimePoint};
use tracing::debug;

use crate::frame::AlignedFrame;

/// Joins `price` and `liquidity` on the price calendar.
///
/// Each price row takes the most recent liquidity observation dated at or
/// before it. Rows preceding the first liquidity observation have no
/// liquidity value and are dropped. No date outside `price` is ever emitted.
///
/// # Errors
/// Returns [`LiquidityError::EmptyResult`] if no row survives, e.g. when every
/// liquidity observation postdates the last price.
pub fn align(price: &Series, liquidity: &Series) -> Result<AlignedFrame> {
    let observations = liquidity.points();
    let mut next = 0;
    let mut last_value = None;
    let mut dropped = 0usize;
    let mut rows = Vec::with_capacity(price.len());

    for point in price {
        while next < observations.len() && observations[next].date <= point.date {
            last_value = Some(observations[next].value);
            next += 1;
        }
        match last_value {
            Some(value) => rows.push((point.date, point.value, value)),
            None => dropped += 1,
        }
    }

    debug!(
        rows = rows.len(),
        dropped,
        price_rows = price.len(),
        liquidity_rows = liquidity.len(),
        "Aligned price and liquidity"
    );

    if rows.is_empty() {
        return Err(LiquidityError::EmptyResult(
            "price and liquidity series do not overlap".to_string(),
        ));
    }
    Ok(AlignedFrame::from_rows(rows))
}

/// Aligns the closes of `bars` with `liquidity`.
///
/// # Errors
/// Returns [`LiquidityError::InvalidData`] if bars are not strictly ordered by
/// date, otherwise the same errors as [`align`].
pub fn align_bars(bars: &[PriceBar], liquidity: &Series) -> Result<AlignedFrame> {
    let closes = Series::from_points(
        bars.iter()
            .map(|bar| TimePoint::new(bar.date, bar.close))
            .collect(),
    )?;
    align(&closes, liquidity)
}
