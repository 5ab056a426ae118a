//! Large-move detection and timeline merging.

use std::collections::{BTreeMap, HashSet};

use chrono::NaiveDate;
use liquidity_core::{Direction, Event, EventSource, LiquidityError, PriceBar, Result};
use tracing::debug;

/// Glyph drawn for an auto-detected rally.
pub const GLYPH_UP: &str = "▲";
/// Glyph drawn for an auto-detected selloff.
pub const GLYPH_DOWN: &str = "▼";

/// Scans daily returns of `bars` for moves of at least `threshold`.
///
/// `r[t] = close[t] / close[t-1] - 1`; the first bar has no return. A date is
/// flagged when `|r| >= threshold` unless a curated event already sits on it
/// or an earlier auto event claimed it. Only the auto-detected events are
/// returned, in date order.
///
/// # Errors
/// Returns [`LiquidityError::InvalidConfig`] if `threshold` is not a positive
/// finite number.
pub fn detect(bars: &[PriceBar], curated: &[Event], threshold: f64) -> Result<Vec<Event>> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(LiquidityError::InvalidConfig(format!(
            "event threshold must be a positive number, got {threshold}"
        )));
    }

    let mut claimed: HashSet<NaiveDate> = curated.iter().map(|e| e.date).collect();
    let mut events = Vec::new();

    for pair in bars.windows(2) {
        let (prev, bar) = (&pair[0], &pair[1]);
        let r = bar.close / prev.close - 1.0;
        if !r.is_finite() || r.abs() < threshold {
            continue;
        }
        if !claimed.insert(bar.date) {
            continue;
        }
        events.push(move_event(bar.date, r));
    }

    debug!(
        bars = bars.len(),
        threshold,
        detected = events.len(),
        "Detected large daily moves"
    );
    Ok(events)
}

fn move_event(date: NaiveDate, r: f64) -> Event {
    let direction = Direction::of_return(r);
    let pct = format!("{:+.1}%", r * 100.0);
    let (title, glyph) = match direction {
        Direction::Up => (format!("Sharp rally {pct}"), GLYPH_UP),
        Direction::Down => (format!("Sharp drop {pct}"), GLYPH_DOWN),
    };
    Event {
        date,
        title,
        description: format!("Index closed {pct} versus the previous session"),
        glyph: glyph.to_string(),
        direction,
        source: EventSource::Auto,
    }
}

/// Merges curated and auto events into one chronological timeline.
///
/// At most one event per date survives; curated events take priority over
/// auto ones and, among duplicates of the same kind, the first one wins.
#[must_use]
pub fn merge(curated: &[Event], auto: &[Event]) -> Vec<Event> {
    let mut by_date: BTreeMap<NaiveDate, Event> = BTreeMap::new();
    for event in curated.iter().chain(auto) {
        by_date.entry(event.date).or_insert_with(|| event.clone());
    }
    by_date.into_values().collect()
}

/// Runs [`detect`] and [`merge`] in one step.
///
/// # Errors
/// Same as [`detect`].
pub fn detect_and_merge(bars: &[PriceBar], curated: &[Event], threshold: f64) -> Result<Vec<Event>> {
    let auto = detect(bars, curated, threshold)?;
    Ok(merge(curated, &auto))
}

/// Selects the events to list for a lookback window.
///
/// Keeps events dated within `[start, end]` and, when `limit` is set, only
/// the most recent `limit` of them. Output stays in ascending date order.
#[must_use]
pub fn select_for_display(
    events: &[Event],
    start: NaiveDate,
    end: NaiveDate,
    limit: Option<usize>,
) -> Vec<Event> {
    let in_window: Vec<&Event> = events
        .iter()
        .filter(|e| e.date >= start && e.date <= end)
        .collect();
    let skip = limit.map_or(0, |n| in_window.len().saturating_sub(n));
    in_window.into_iter().skip(skip).cloned().collect()
}
