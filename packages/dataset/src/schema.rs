//! Column resolution onto the canonical municipality/variable/value schema.
//!
//! Header matching is driven entirely by [`SYNONYMS`]; adding a new
//! spelling is a one-line table change.

use climate_map_dataset_models::{ColumnMode, SemanticColumn};
use thiserror::Error;

/// Accepted header spellings per semantic column.
///
/// Entries are compared after [`normalize_header`], so accented spellings
/// such as `município` are listed only for readability.
pub const SYNONYMS: &[(SemanticColumn, &[&str])] = &[
    (
        SemanticColumn::Municipality,
        &[
            "municipio",
            "município",
            "nm_mun",
            "nome_municipio",
            "municipality",
        ],
    ),
    (
        SemanticColumn::Variable,
        &["variavel", "variável", "variable", "indicador"],
    ),
    (
        SemanticColumn::Value,
        &["valor", "value", "media", "média"],
    ),
];

/// Fixed column positions used by [`ColumnMode::ByPosition`].
const POSITIONAL: ColumnIndices = ColumnIndices {
    municipality: 0,
    variable: 2,
    value: 3,
};

/// Errors raised when a source cannot be mapped onto the canonical schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// No header matched any synonym of this column.
    #[error("Required column is missing: {0}")]
    MissingColumn(SemanticColumn),

    /// Positional mode needs more columns than the source has.
    #[error("Expected at least {required} columns, found {found}")]
    TooFewColumns {
        /// Minimum number of columns.
        required: usize,
        /// Columns present in the header row.
        found: usize,
    },

    /// The sheet has no header row.
    #[error("Source has no header row")]
    NoHeader,
}

/// Zero-based source column index for each semantic column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndices {
    /// Municipality column.
    pub municipality: usize,
    /// Variable column.
    pub variable: usize,
    /// Value column.
    pub value: usize,
}

impl ColumnIndices {
    /// Highest index referenced, used to size row lookups.
    #[must_use]
    pub fn max_index(&self) -> usize {
        self.municipality.max(self.variable).max(self.value)
    }
}

/// Normalizes a header for synonym matching: accent-free, lower-case,
/// trimmed.
#[must_use]
pub fn normalize_header(header: &str) -> String {
    deunicode::deunicode(header.trim()).trim().to_lowercase()
}

/// Looks up which semantic column a header names, if any.
#[must_use]
pub fn classify_header(header: &str) -> Option<SemanticColumn> {
    let normalized = normalize_header(header);
    SYNONYMS.iter().find_map(|(column, spellings)| {
        spellings
            .iter()
            .any(|s| normalize_header(s) == normalized)
            .then_some(*column)
    })
}

/// Resolves source column indices for the given header row.
///
/// # Errors
///
/// Returns [`SchemaError::NoHeader`] for an empty header row,
/// [`SchemaError::MissingColumn`] when name matching cannot find a column,
/// and [`SchemaError::TooFewColumns`] when positional mode has fewer than
/// four columns to work with.
pub fn resolve_columns(headers: &[String], mode: ColumnMode) -> Result<ColumnIndices, SchemaError> {
    if headers.is_empty() {
        return Err(SchemaError::NoHeader);
    }

    match mode {
        ColumnMode::ByPosition => {
            let required = POSITIONAL.max_index() + 1;
            if headers.len() < required {
                return Err(SchemaError::TooFewColumns {
                    required,
                    found: headers.len(),
                });
            }
            Ok(POSITIONAL)
        }
        ColumnMode::ByName => resolve_by_name(headers),
    }
}

fn resolve_by_name(headers: &[String]) -> Result<ColumnIndices, SchemaError> {
    let mut municipality = None;
    let mut variable = None;
    let mut value = None;

    for (idx, header) in headers.iter().enumerate() {
        let Some(column) = classify_header(header) else {
            continue;
        };

        let slot = match column {
            SemanticColumn::Municipality => &mut municipality,
            SemanticColumn::Variable => &mut variable,
            SemanticColumn::Value => &mut value,
        };

        if slot.is_some() {
            log::warn!("Ignoring duplicate {column} column {header:?} at index {idx}");
        } else {
            *slot = Some(idx);
        }
    }

    Ok(ColumnIndices {
        municipality: municipality.ok_or(SchemaError::MissingColumn(SemanticColumn::Municipality))?,
        variable: variable.ok_or(SchemaError::MissingColumn(SemanticColumn::Variable))?,
        value: value.ok_or(SchemaError::MissingColumn(SemanticColumn::Value))?,
    })
}
