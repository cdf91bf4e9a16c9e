//! Pipeline configuration.
//!
//! Every field has a default, so an empty TOML file (or none at all) gives
//! a working configuration.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use climate_map_boundaries_models::BoundaryOptions;
use climate_map_dataset_models::ColumnMode;
use climate_map_export::ExportColumns;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "CLIMATE_MAP_CONFIG";

/// Default tabular source path.
pub const DEFAULT_DATA_PATH: &str = "dados.xlsx";

/// Default boundary archive path.
pub const DEFAULT_BOUNDARIES_PATH: &str = "municipios.zip";

/// Default number of leading municipalities shown in charts.
pub const DEFAULT_TOP_N: usize = 6;

/// Accepted top-N values.
pub const TOP_N_RANGE: RangeInclusive<usize> = 3..=30;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid TOML for [`PipelineConfig`].
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// `top_n` is outside [`TOP_N_RANGE`].
    #[error("top_n must be between 3 and 30, got {0}")]
    TopNOutOfRange(usize),

    /// The simplification tolerance is negative or not finite.
    #[error("simplify_tolerance_m must be a non-negative number, got {0}")]
    InvalidTolerance(f64),
}

/// All knobs of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct PipelineConfig {
    /// Tabular source used when none is given on the command line.
    pub data_path: PathBuf,
    /// Boundary archive used when none is given on the command line.
    pub boundaries_path: PathBuf,
    /// How source columns are located.
    pub column_mode: ColumnMode,
    /// Average duplicate municipalities instead of listing each row.
    pub aggregate: bool,
    /// Number of leading municipalities for the chart and highlights.
    pub top_n: usize,
    /// Mark the top-N polygons on the map.
    pub highlight_top_n: bool,
    /// Build the choropleth at all.
    pub show_map: bool,
    /// Columns written by CSV and XLSX exports.
    pub export_columns: ExportColumns,
    /// Boundary archive settings.
    pub boundaries: BoundaryOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            boundaries_path: PathBuf::from(DEFAULT_BOUNDARIES_PATH),
            column_mode: ColumnMode::default(),
            aggregate: false,
            top_n: DEFAULT_TOP_N,
            highlight_top_n: true,
            show_map: true,
            export_columns: ExportColumns::default(),
            boundaries: BoundaryOptions::default(),
        }
    }
}

impl PipelineConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on malformed TOML or out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TopNOutOfRange`] or
    /// [`ConfigError::InvalidTolerance`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TOP_N_RANGE.contains(&self.top_n) {
            return Err(ConfigError::TopNOutOfRange(self.top_n));
        }
        let tolerance = self.boundaries.simplify_tolerance_m;
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ConfigError::InvalidTolerance(tolerance));
        }
        Ok(())
    }
}

/// Loads the config from `path`, or from [`CONFIG_ENV`] when `path` is
/// `None`, or falls back to defaults when neither is set.
///
/// # Errors
///
/// Returns [`ConfigError`] if the named file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
    let Some(path) = path.map(Path::to_path_buf).or(from_env) else {
        log::debug!("No config file; using defaults");
        return Ok(PipelineConfig::default());
    };

    log::info!("Reading config from {}", path.display());
    let text = std::fs::read_to_string(&path)?;
    PipelineConfig::from_toml_str(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
        assert_eq!(config.top_n, 6);
        assert_eq!(config.data_path, PathBuf::from("dados.xlsx"));
        assert_eq!(config.boundaries.name_field, "NM_MUN");
        assert_eq!(config.column_mode, ColumnMode::ByName);
        assert!(config.show_map);
    }

    #[test]
    fn parses_partial_document() {
        let config = PipelineConfig::from_toml_str(
            r#"
            aggregate = true
            top_n = 10
            column_mode = "by_position"
            export_columns = "municipality_variable_value"

            [boundaries]
            name_field = "NOME"
            "#,
        )
        .unwrap();

        assert!(config.aggregate);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.column_mode, ColumnMode::ByPosition);
        assert_eq!(config.export_columns, ExportColumns::MunicipalityVariableValue);
        assert_eq!(config.boundaries.name_field, "NOME");
        assert!((config.boundaries.simplify_tolerance_m - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_top_n() {
        let err = PipelineConfig::from_toml_str("top_n = 2").unwrap_err();
        assert!(matches!(err, ConfigError::TopNOutOfRange(2)));
        let err = PipelineConfig::from_toml_str("top_n = 31").unwrap_err();
        assert!(matches!(err, ConfigError::TopNOutOfRange(31)));
    }

    #[test]
    fn rejects_negative_tolerance() {
        let err = PipelineConfig::from_toml_str("[boundaries]\nsimplify_tolerance_m = -1.0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTolerance(_)));
    }

    #[test]
    fn rejects_unknown_column_mode() {
        let err = PipelineConfig::from_toml_str("column_mode = \"sideways\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("climate_map.toml");
        std::fs::write(&path, "show_map = false\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(!config.show_map);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
