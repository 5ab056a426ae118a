//! Composite liquidity series built from balance-sheet components.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use liquidity_core::{
    LiquidityBatch, LiquidityComponent, LiquidityError, LiquiditySpec, NET_LIQUIDITY_COMPONENTS,
    Result, Series, SeriesId, TimePoint,
};
use tracing::{debug, warn};

/// Upstream series needed to build `spec`.
#[must_use]
pub fn required_series(spec: &LiquiditySpec) -> Vec<SeriesId> {
    match spec {
        LiquiditySpec::Single(id) => vec![id.clone()],
        LiquiditySpec::NetLiquidity => NET_LIQUIDITY_COMPONENTS
            .iter()
            .map(|c| SeriesId::new(c.id))
            .collect(),
    }
}

/// Builds the series for `spec` out of a fetched batch.
///
/// # Errors
/// Returns [`LiquidityError::UpstreamFetchFailure`] if a required series is
/// missing from the batch and [`LiquidityError::EmptyResult`] if the
/// components never report on a common date.
pub fn build(spec: &LiquiditySpec, batch: &LiquidityBatch) -> Result<Series> {
    match spec {
        LiquiditySpec::Single(id) => batch.get(id).cloned().ok_or_else(|| missing(batch, &[id])),
        LiquiditySpec::NetLiquidity => combine(&NET_LIQUIDITY_COMPONENTS, batch),
    }
}

/// Signed, scaled sum of `components` on the dates where all of them report.
///
/// # Errors
/// Same as [`build`].
pub fn combine(components: &[LiquidityComponent], batch: &LiquidityBatch) -> Result<Series> {
    let ids: Vec<SeriesId> = components.iter().map(|c| SeriesId::new(c.id)).collect();
    let absent: Vec<&SeriesId> = ids.iter().filter(|id| batch.get(id).is_none()).collect();
    if !absent.is_empty() {
        return Err(missing(batch, &absent));
    }

    let mut totals: BTreeMap<NaiveDate, (usize, f64)> = BTreeMap::new();
    for (component, id) in components.iter().zip(&ids) {
        let Some(series) = batch.get(id) else {
            continue;
        };
        for point in series {
            let entry = totals.entry(point.date).or_insert((0, 0.0));
            entry.0 += 1;
            entry.1 += component.sign * component.scale * point.value;
        }
    }

    let points: Vec<TimePoint> = totals
        .into_iter()
        .filter(|(_, (count, _))| *count == components.len())
        .map(|(date, (_, value))| TimePoint::new(date, value))
        .collect();

    debug!(
        components = components.len(),
        rows = points.len(),
        "Combined liquidity components"
    );

    if points.is_empty() {
        return Err(LiquidityError::EmptyResult(
            "liquidity components share no common date".to_string(),
        ));
    }
    Series::from_points(points)
}

fn missing(batch: &LiquidityBatch, ids: &[&SeriesId]) -> LiquidityError {
    let names: Vec<String> = ids.iter().map(ToString::to_string).collect();
    for (id, error) in &batch.failed {
        warn!(series = %id, error = %error, "Liquidity component unavailable");
    }
    LiquidityError::UpstreamFetchFailure {
        feed: "liquidity".to_string(),
        message: format!("missing series: {}", names.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn series(points: &[(u32, f64)]) -> Series {
        Series::from_points(points.iter().map(|(day, v)| TimePoint::new(d(*day), *v)).collect())
            .unwrap()
    }

    fn batch(entries: Vec<(&str, Series)>) -> LiquidityBatch {
        LiquidityBatch {
            series: entries
                .into_iter()
                .map(|(id, s)| (SeriesId::new(id), s))
                .collect(),
            failed: Vec::new(),
        }
    }

    #[test]
    fn test_net_liquidity_on_common_dates() {
        let batch = batch(vec![
            ("WALCL", series(&[(3, 7_000_000.0), (10, 7_100_000.0)])),
            ("WDTGAL", series(&[(3, 700_000.0), (10, 750_000.0)])),
            // Billions; daily, with a gap on the 10th.
            ("RRPONTSYD", series(&[(2, 500.0), (3, 450.0), (4, 440.0), (11, 400.0)])),
        ]);

        let net = build(&LiquiditySpec::NetLiquidity, &batch).unwrap();

        assert_eq!(net.len(), 1);
        assert_eq!(net.points()[0].date, d(3));
        assert_eq!(net.points()[0].value, 7_000_000.0 - 700_000.0 - 450_000.0);
    }

    #[test]
    fn test_missing_component_is_upstream_failure() {
        let mut batch = batch(vec![
            ("WALCL", series(&[(3, 1.0)])),
            ("RRPONTSYD", series(&[(3, 1.0)])),
        ]);
        batch.failed.push((
            SeriesId::new("WDTGAL"),
            LiquidityError::Network("timeout".to_string()),
        ));

        let err = build(&LiquiditySpec::NetLiquidity, &batch).unwrap_err();

        match err {
            LiquidityError::UpstreamFetchFailure { feed, message } => {
                assert_eq!(feed, "liquidity");
                assert!(message.contains("WDTGAL"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_single_series_passthrough() {
        let spec = LiquiditySpec::Single(SeriesId::new("ECBASSETSW"));
        let batch = batch(vec![("ECBASSETSW", series(&[(5, 6.5)]))]);

        assert_eq!(required_series(&spec), vec![SeriesId::new("ECBASSETSW")]);
        assert_eq!(build(&spec, &batch).unwrap().values(), vec![6.5]);
    }

    #[test]
    fn test_no_common_dates() {
        let batch = batch(vec![
            ("WALCL", series(&[(3, 1.0)])),
            ("WDTGAL", series(&[(4, 1.0)])),
            ("RRPONTSYD", series(&[(5, 1.0)])),
        ]);
        assert!(matches!(
            build(&LiquiditySpec::NetLiquidity, &batch),
            Err(LiquidityError::EmptyResult(_))
        ));
    }
}
