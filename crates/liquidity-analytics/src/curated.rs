//! Curated liquidity timeline.
//!
//! Hand-authored Federal Reserve balance-sheet milestones drawn on the chart.

use liquidity_core::{Event, Result};

/// `(date, title, description, glyph, direction)`
const FED_TIMELINE: &[(&str, &str, &str, &str, &str)] = &[
    (
        "2008-09-15",
        "Lehman Brothers bankruptcy",
        "Funding markets freeze; emergency facilities expand the balance sheet",
        "⚠",
        "down",
    ),
    (
        "2008-11-25",
        "QE1 announced",
        "Fed commits to buying agency debt and MBS",
        "🏦",
        "up",
    ),
    (
        "2010-11-03",
        "QE2 announced",
        "$600B of longer-dated Treasury purchases",
        "🏦",
        "up",
    ),
    (
        "2012-09-13",
        "QE3 announced",
        "Open-ended MBS purchases",
        "🏦",
        "up",
    ),
    (
        "2013-05-22",
        "Taper tantrum",
        "Tapering signal sends yields sharply higher",
        "⚠",
        "down",
    ),
    (
        "2017-10-02",
        "QT1 begins",
        "Balance sheet runoff starts",
        "🏦",
        "down",
    ),
    (
        "2019-09-17",
        "Repo market spike",
        "Overnight repo rates spike on reserve scarcity",
        "⚠",
        "down",
    ),
    (
        "2020-03-15",
        "Emergency cut to zero",
        "Rates cut to 0-0.25% with $700B of asset purchases",
        "🏦",
        "up",
    ),
    (
        "2020-03-23",
        "Unlimited QE",
        "Asset purchases in the amounts needed",
        "🏦",
        "up",
    ),
    (
        "2022-03-16",
        "Hiking cycle begins",
        "First rate increase since 2018",
        "🏦",
        "down",
    ),
    (
        "2022-06-01",
        "QT2 begins",
        "Runoff of Treasuries and MBS resumes",
        "🏦",
        "down",
    ),
    (
        "2023-03-12",
        "BTFP launched",
        "Bank Term Funding Program after the SVB failure",
        "🏦",
        "up",
    ),
    (
        "2024-09-18",
        "Easing cycle begins",
        "50bp cut, first since 2020",
        "🏦",
        "up",
    ),
];

/// Returns the curated Fed timeline, sorted by date.
///
/// # Errors
/// Returns [`liquidity_core::LiquidityError::InvalidData`] if an entry does
/// not parse.
pub fn fed_timeline() -> Result<Vec<Event>> {
    FED_TIMELINE
        .iter()
        .map(|(date, title, description, glyph, direction)| {
            Event::parse(date, title, description, glyph, direction)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeline_parses_sorted_and_unique() {
        let events = fed_timeline().unwrap();
        assert_eq!(events.len(), FED_TIMELINE.len());
        assert!(events.windows(2).all(|w| w[0].date < w[1].date));
    }
}
