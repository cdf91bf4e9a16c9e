#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Ranked view and summary statistic types.
//!
//! A [`RankedView`] is derived from a dataset for one selected variable and
//! discarded on the next selection; nothing here is persisted.

use climate_map_dataset_models::CanonicalKey;
use serde::{Deserialize, Serialize};

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    /// Display name (first spelling seen when aggregated).
    pub municipality: String,
    /// Join key derived from `municipality`.
    pub key: CanonicalKey,
    /// Variable label the entry was filtered on.
    pub variable: String,
    /// Value, or the group mean when aggregated.
    pub value: f64,
}

/// Entries for a single variable, sorted descending by value.
///
/// Ties keep source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedView {
    variable: String,
    aggregated: bool,
    entries: Vec<RankedEntry>,
}

impl RankedView {
    /// Wraps entries that are already sorted.
    #[must_use]
    pub const fn new(variable: String, aggregated: bool, entries: Vec<RankedEntry>) -> Self {
        Self {
            variable,
            aggregated,
            entries,
        }
    }

    /// Selected variable label.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Whether duplicate municipalities were averaged.
    #[must_use]
    pub const fn aggregated(&self) -> bool {
        self.aggregated
    }

    /// All entries, best first.
    #[must_use]
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    /// The `n` highest-ranked entries (fewer if the view is shorter).
    #[must_use]
    pub fn top_n(&self, n: usize) -> &[RankedEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// Values in rank order.
    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.entries.iter().map(|e| e.value)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no rows matched the variable.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Maximum, minimum, mean and median of a ranked view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    /// Largest value.
    pub max: f64,
    /// Smallest value.
    pub min: f64,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (mean of the two middle values for even counts).
    pub median: f64,
    /// Number of values summarized.
    pub count: usize,
}

/// The selected variable matched no rows.
///
/// Not a failure: callers render placeholder statistics instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptySelection {
    /// The variable that matched nothing.
    pub variable: String,
}

impl std::fmt::Display for EmptySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no rows for variable {:?}", self.variable)
    }
}

impl std::error::Error for EmptySelection {}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, value: f64) -> RankedEntry {
        RankedEntry {
            municipality: name.to_string(),
            key: CanonicalKey::from_canonical(name.to_uppercase()),
            variable: "v".to_string(),
            value,
        }
    }

    #[test]
    fn top_n_is_clamped_to_length() {
        let view = RankedView::new(
            "v".to_string(),
            false,
            vec![entry("a", 3.0), entry("b", 2.0)],
        );
        assert_eq!(view.top_n(1).len(), 1);
        assert_eq!(view.top_n(6).len(), 2);
        assert!(view.top_n(0).is_empty());
    }

    #[test]
    fn empty_selection_names_the_variable() {
        let err = EmptySelection {
            variable: "Média Anual".to_string(),
        };
        assert_eq!(err.to_string(), "no rows for variable \"Média Anual\"");
    }
}
