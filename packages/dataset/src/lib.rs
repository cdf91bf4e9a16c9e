#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Tabular source loading and normalization.
//!
//! Reads a workbook (`.xlsx`, `.xls`, `.ods`) or CSV file, resolves its
//! columns onto the canonical municipality/variable/value schema, coerces
//! values to numbers and drops rows that cannot be salvaged. Also owns the
//! municipality name canonicalization used as the cross-dataset join key.

pub mod canonical;
pub mod load;
pub mod numeric;
pub mod schema;

pub use canonical::canonicalize;
pub use load::{TabularFormat, load_dataset};
pub use schema::{ColumnIndices, SchemaError, resolve_columns};

use thiserror::Error;

/// Errors that can occur while loading a tabular source.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The required columns could not be resolved.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// The workbook could not be opened or read.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// The CSV source could not be parsed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// The workbook contains no worksheets.
    #[error("Workbook has no worksheets")]
    NoWorksheet,
}
