//! Summary statistics over a ranked view.

use climate_map_ranking_models::{EmptySelection, RankedView, SummaryStats};

/// Computes max, min, mean and median over the view's values.
///
/// Statistics always describe the values as ranked, i.e. after
/// aggregation when the view is aggregated.
///
/// # Errors
///
/// Returns [`EmptySelection`] when the view has no entries. Callers render
/// placeholders for this case rather than failing.
pub fn summarize(view: &RankedView) -> Result<SummaryStats, EmptySelection> {
    let mut values: Vec<f64> = view.values().collect();
    if values.is_empty() {
        return Err(EmptySelection {
            variable: view.variable().to_string(),
        });
    }

    values.sort_by(f64::total_cmp);

    let count = values.len();
    let mean = running_mean(&values);
    let mid = count / 2;
    let median = if count % 2 == 0 {
        f64::midpoint(values[mid - 1], values[mid])
    } else {
        values[mid]
    };

    Ok(SummaryStats {
        max: values[count - 1],
        min: values[0],
        mean,
        median,
        count,
    })
}

/// Incremental mean; stays finite for finite inputs near `f64::MAX`.
fn running_mean(values: &[f64]) -> f64 {
    let mut mean = 0.0;
    for (i, v) in values.iter().enumerate() {
        #[allow(clippy::cast_precision_loss)]
        let n = (i + 1) as f64;
        mean += (v - mean) / n;
    }
    mean
}
