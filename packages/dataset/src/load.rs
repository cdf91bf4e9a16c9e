//! Reads workbook and CSV bytes into a normalized [`Dataset`].

use std::io::Cursor;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use climate_map_dataset_models::{ColumnMode, Dataset, LoadReport, Record};

use crate::DatasetError;
use crate::numeric::parse_value;
use crate::schema::{ColumnIndices, SchemaError, resolve_columns};

/// Zip local-file-header magic (`.xlsx`, `.xlsm`, `.ods`).
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// OLE compound document magic (legacy `.xls`).
const OLE_MAGIC: &[u8] = &[0xD0, 0xCF, 0x11, 0xE0];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Physical format of a tabular source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabularFormat {
    /// Any workbook format `calamine` understands.
    Workbook,
    /// Delimited text (comma or semicolon).
    Csv,
}

impl TabularFormat {
    /// Detects the format from the file name extension, falling back to
    /// magic bytes when the name is missing or unrecognized.
    #[must_use]
    pub fn detect(name: Option<&str>, bytes: &[u8]) -> Self {
        let ext = name
            .and_then(|n| Path::new(n).extension())
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match ext.as_deref() {
            Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Self::Workbook,
            Some("csv" | "txt") => Self::Csv,
            _ if bytes.starts_with(ZIP_MAGIC) || bytes.starts_with(OLE_MAGIC) => Self::Workbook,
            _ => Self::Csv,
        }
    }
}

/// A single source cell before coercion.
#[derive(Debug, Clone, PartialEq)]
enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Self::Empty,
            Data::Float(f) => Self::Number(*f),
            #[allow(clippy::cast_precision_loss)]
            Data::Int(i) => Self::Number(*i as f64),
            Data::String(s) => Self::from_text(s),
            other => Self::from_text(&other.to_string()),
        }
    }

    fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Self::Empty
        } else {
            Self::Text(s.to_string())
        }
    }

    /// Stringifies the cell for name-like columns.
    fn text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(s) => s.trim().to_string(),
            #[allow(clippy::cast_possible_truncation)]
            Self::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Self::Number(f) => f.to_string(),
        }
    }

    fn value(&self) -> Option<f64> {
        match self {
            Self::Empty => None,
            Self::Text(s) => parse_value(s),
            Self::Number(f) => f.is_finite().then_some(*f),
        }
    }
}

/// Header plus data rows, as read from the source.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Loads and normalizes a tabular source.
///
/// # Errors
///
/// Returns [`DatasetError`] if the bytes cannot be read in the given format
/// or the required columns cannot be resolved. Rows with unparseable values
/// are dropped, not reported as errors.
pub fn load_dataset(
    bytes: &[u8],
    format: TabularFormat,
    mode: ColumnMode,
) -> Result<Dataset, DatasetError> {
    let table = match format {
        TabularFormat::Workbook => read_workbook(bytes)?,
        TabularFormat::Csv => read_csv(bytes)?,
    };

    let dataset = normalize_table(table, mode)?;
    let report = dataset.report();

    log::info!(
        "Loaded {} records ({} rows read, {} dropped for unparseable values, {} for blank fields)",
        dataset.len(),
        report.rows_read,
        report.dropped_unparseable_value,
        report.dropped_empty_field,
    );

    Ok(dataset)
}

fn read_workbook(bytes: &[u8]) -> Result<RawTable, DatasetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(DatasetError::NoWorksheet)??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawTable::default());
    };

    let headers = header_row.iter().map(|d| Cell::from_data(d).text()).collect();
    let rows = rows
        .map(|row| row.iter().map(Cell::from_data).collect())
        .collect();

    Ok(RawTable { headers, rows })
}

fn read_csv(bytes: &[u8]) -> Result<RawTable, DatasetError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(sniff_delimiter(bytes))
        .from_reader(bytes);

    let mut records = reader.records();
    let Some(header) = records.next().transpose()? else {
        return Ok(RawTable::default());
    };

    let headers = header.iter().map(|h| h.trim().to_string()).collect();
    let mut rows = Vec::new();
    for result in records {
        let record = result?;
        rows.push(record.iter().map(Cell::from_text).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Picks `;` when the header line uses it more than `,` (common in pt-BR
/// spreadsheet exports, where `,` is the decimal separator).
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    if semicolons > commas { b';' } else { b',' }
}

fn normalize_table(table: RawTable, mode: ColumnMode) -> Result<Dataset, SchemaError> {
    let cols: ColumnIndices = resolve_columns(&table.headers, mode)?;

    let mut report = LoadReport::default();
    let mut records = Vec::with_capacity(table.rows.len());
    let empty = Cell::Empty;

    for row in &table.rows {
        if row.iter().all(|c| *c == Cell::Empty) {
            continue;
        }
        report.rows_read += 1;

        let cell = |idx: usize| row.get(idx).unwrap_or(&empty);

        let Some(value) = cell(cols.value).value() else {
            report.dropped_unparseable_value += 1;
            continue;
        };

        let municipality = cell(cols.municipality).text();
        let variable = cell(cols.variable).text();
        if municipality.is_empty() || variable.is_empty() {
            report.dropped_empty_field += 1;
            continue;
        }

        records.push(Record {
            municipality,
            variable,
            value,
        });
    }

    if report.dropped_unparseable_value > 0 {
        log::warn!(
            "Dropped {} rows with unparseable values",
            report.dropped_unparseable_value
        );
    }

    Ok(Dataset::new(records, report))
}
