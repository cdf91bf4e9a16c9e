#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Normalized tabular record types.
//!
//! Every supported spreadsheet layout is normalized into a flat list of
//! [`Record`] values (one municipality, one variable, one numeric value)
//! before any ranking or joining happens.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One normalized row of the source table.
///
/// Both text fields are trimmed and non-empty and `value` is always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Municipality display name as it appeared in the source.
    pub municipality: String,
    /// Variable label (e.g. "Média Mensal - Janeiro").
    pub variable: String,
    /// Projected value.
    pub value: f64,
}

/// Accent-free, upper-cased, whitespace-collapsed municipality name.
///
/// This is the only join key between the tabular dataset and the polygon
/// boundaries. Build it with `climate_map_dataset::canonical::canonicalize`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Wraps a string that is already in canonical form.
    #[must_use]
    pub const fn from_canonical(value: String) -> Self {
        Self(value)
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<CanonicalKey> for String {
    fn from(key: CanonicalKey) -> Self {
        key.0
    }
}

/// The three semantic columns every source must provide.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SemanticColumn {
    /// Municipality name.
    Municipality,
    /// Variable label.
    Variable,
    /// Numeric value.
    Value,
}

impl SemanticColumn {
    /// All semantic columns in canonical output order.
    pub const ALL: &[Self] = &[Self::Municipality, Self::Variable, Self::Value];
}

/// How source columns are mapped onto [`SemanticColumn`]s.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColumnMode {
    /// Match header names against the synonym table.
    #[default]
    ByName,
    /// Fixed positions: municipality in column 0, variable in column 2,
    /// value in column 3.
    ByPosition,
}

/// Row accounting produced while normalizing a source table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadReport {
    /// Data rows seen (header excluded).
    pub rows_read: usize,
    /// Rows dropped because the value could not be parsed as a number.
    pub dropped_unparseable_value: usize,
    /// Rows dropped because the municipality or variable was blank.
    pub dropped_empty_field: usize,
}

impl LoadReport {
    /// Number of rows that survived normalization.
    #[must_use]
    pub const fn rows_kept(&self) -> usize {
        self.rows_read - self.dropped_unparseable_value - self.dropped_empty_field
    }
}

/// Distinct variable labels present in a dataset.
///
/// Identity is the set of strings; display order is computed separately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableSet(BTreeSet<String>);

impl VariableSet {
    /// Returns `true` if the label is present.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.0.contains(label)
    }

    /// Number of distinct labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates labels in byte order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for VariableSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// An immutable, fully normalized dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
    report: LoadReport,
}

impl Dataset {
    /// Builds a dataset from normalized records in source order.
    #[must_use]
    pub const fn new(records: Vec<Record>, report: LoadReport) -> Self {
        Self { records, report }
    }

    /// Records in source order.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Row accounting from normalization.
    #[must_use]
    pub const fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Distinct variable labels.
    #[must_use]
    pub fn variables(&self) -> VariableSet {
        self.records.iter().map(|r| r.variable.as_str()).collect()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no rows survived normalization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(municipality: &str, variable: &str, value: f64) -> Record {
        Record {
            municipality: municipality.to_string(),
            variable: variable.to_string(),
            value,
        }
    }

    #[test]
    fn variable_sets_ignore_row_order() {
        let a = Dataset::new(
            vec![record("A", "x", 1.0), record("B", "y", 2.0)],
            LoadReport::default(),
        );
        let b = Dataset::new(
            vec![
                record("B", "y", 2.0),
                record("A", "x", 1.0),
                record("C", "x", 3.0),
            ],
            LoadReport::default(),
        );
        assert_eq!(a.variables(), b.variables());
        assert_eq!(a.variables().len(), 2);
    }

    #[test]
    fn semantic_column_display_is_snake_case() {
        assert_eq!(SemanticColumn::Municipality.to_string(), "municipality");
        assert_eq!("value".parse::<SemanticColumn>().ok(), Some(SemanticColumn::Value));
    }

    #[test]
    fn column_mode_parses_from_str() {
        assert_eq!("by_position".parse::<ColumnMode>().ok(), Some(ColumnMode::ByPosition));
        assert_eq!(ColumnMode::default(), ColumnMode::ByName);
    }

    #[test]
    fn load_report_counts_kept_rows() {
        let report = LoadReport {
            rows_read: 10,
            dropped_unparseable_value: 3,
            dropped_empty_field: 1,
        };
        assert_eq!(report.rows_kept(), 6);
    }
}
