#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CSV and XLSX export of a ranked view.
//!
//! Both formats carry the same columns in rank order. Values are written
//! unformatted so a round trip reproduces them exactly; pt-BR formatting
//! is a display concern only.

use climate_map_ranking_models::{RankedEntry, RankedView};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Name of the single worksheet in XLSX exports.
pub const SHEET_NAME: &str = "ranking";

/// Errors raised while writing an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Flushing the CSV buffer failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Workbook writer error.
    #[error("XLSX error: {0}")]
    Xlsx(#[from] XlsxError),

    /// The view does not fit in a worksheet.
    #[error("Too many rows for a worksheet: {0}")]
    TooManyRows(usize),
}

/// Which columns an export carries.
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
pub enum ExportColumns {
    /// `municipality,value`
    #[default]
    MunicipalityValue,
    /// `municipality,variable,value`
    MunicipalityVariableValue,
}

impl ExportColumns {
    /// Header row.
    #[must_use]
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::MunicipalityValue => &["municipality", "value"],
            Self::MunicipalityVariableValue => &["municipality", "variable", "value"],
        }
    }

    /// Text cells of an entry; the value column is always last.
    fn text_cells(self, entry: &RankedEntry) -> Vec<&str> {
        match self {
            Self::MunicipalityValue => vec![entry.municipality.as_str()],
            Self::MunicipalityVariableValue => {
                vec![entry.municipality.as_str(), entry.variable.as_str()]
            }
        }
    }
}

/// Writes the view as UTF-8, comma-delimited CSV with a header row.
///
/// # Errors
///
/// Returns [`ExportError`] if a record cannot be written.
pub fn to_csv(view: &RankedView, columns: ExportColumns) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns.headers())?;

    for entry in view.entries() {
        let value = entry.value.to_string();
        let mut record = columns.text_cells(entry);
        record.push(&value);
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    log::debug!("Exported {} rows of {:?} as CSV", view.len(), view.variable());
    Ok(bytes)
}

/// Writes the view as a workbook with a single `ranking` sheet.
///
/// # Errors
///
/// Returns [`ExportError`] if the workbook cannot be built or the view
/// exceeds the worksheet row limit.
pub fn to_xlsx(view: &RankedView, columns: ExportColumns) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let bold = Format::new().set_bold();
    for (col, header) in (0_u16..).zip(columns.headers()) {
        sheet.write_string_with_format(0, col, *header, &bold)?;
    }

    for (idx, entry) in view.entries().iter().enumerate() {
        let row = u32::try_from(idx + 1).map_err(|_| ExportError::TooManyRows(view.len()))?;
        let mut col = 0_u16;
        for text in columns.text_cells(entry) {
            sheet.write_string(row, col, text)?;
            col += 1;
        }
        sheet.write_number(row, col, entry.value)?;
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!("Exported {} rows of {:?} as XLSX", view.len(), view.variable());
    Ok(bytes)
}

/// Download file stem for a variable: `ranking_<variable>`, with path
/// separators replaced so the name stays a single path component.
#[must_use]
pub fn export_file_stem(variable: &str) -> String {
    let cleaned: String = variable
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    format!("ranking_{cleaned}")
}
