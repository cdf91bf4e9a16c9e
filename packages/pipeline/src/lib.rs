#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! The climate map pipeline.
//!
//! A [`Pipeline`] owns its configuration and a [`LoadCache`]. Every
//! evaluation re-reads its sources by content: unchanged bytes come back
//! from the cache, new bytes replace the cached snapshot. Tabular errors
//! fail the evaluation; boundary errors only make the map unavailable.

pub mod cache;
pub mod config;

pub use cache::{ContentKey, LoadCache, Memo};
pub use config::{ConfigError, PipelineConfig, load_config};

use std::path::Path;
use std::sync::Arc;

use climate_map_boundaries::{GeometrySourceError, JoinedPolygonSet, join_with_highlight};
use climate_map_boundaries_models::BoundarySet;
use climate_map_dataset::{DatasetError, TabularFormat};
use climate_map_dataset_models::Dataset;
use climate_map_export::ExportError;
use climate_map_ranking::display::summary_metrics;
use climate_map_ranking_models::{EmptySelection, RankedEntry, RankedView, SummaryStats};
use thiserror::Error;

/// Errors that abort an evaluation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The tabular source could not be loaded.
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// A source file could not be read.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration was rejected.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// An export could not be written.
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Bytes of an input together with a label (usually the file name).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    label: String,
    bytes: Vec<u8>,
}

impl Source {
    /// Wraps bytes that were obtained elsewhere (an upload, a test).
    #[must_use]
    pub fn from_bytes(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }

    /// Reads a file.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be read.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        Ok(Self {
            label: path.display().to_string(),
            bytes: std::fs::read(path)?,
        })
    }

    /// The label, used for format detection and log messages.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The raw bytes.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// State of the choropleth for one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum MapOutcome {
    /// The map is switched off in the configuration.
    Disabled,
    /// The boundaries could not be loaded; the message says why.
    Unavailable(String),
    /// The joined polygons, ready to render.
    Ready(JoinedPolygonSet),
}

/// Everything derived from one variable selection.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Ranking for the selected variable.
    pub view: RankedView,
    /// Statistics over the view, or the empty-selection marker.
    pub summary: Result<SummaryStats, EmptySelection>,
    /// Number of leading entries charted and highlighted.
    pub top_n: usize,
    /// The choropleth, if one could be built.
    pub map: MapOutcome,
}

impl Evaluation {
    /// The charted leading entries.
    #[must_use]
    pub fn top(&self) -> &[RankedEntry] {
        self.view.top_n(self.top_n)
    }

    /// Labelled, display-formatted summary values.
    #[must_use]
    pub fn metrics(&self) -> [(&'static str, String); 4] {
        summary_metrics(&self.summary)
    }
}

/// The configured pipeline and its cache.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    cache: LoadCache,
}

impl Pipeline {
    /// Creates a pipeline with an empty cache.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        Self::with_cache(config, LoadCache::default())
    }

    /// Creates a pipeline around an existing cache.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid.
    pub fn with_cache(config: PipelineConfig, cache: LoadCache) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config, cache })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Replaces the configuration, keeping cached sources. Cache keys
    /// include the parse options, so a changed column mode or boundary
    /// setting reloads on next use.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if the configuration is invalid.
    pub fn reconfigure(&mut self, config: PipelineConfig) -> Result<(), PipelineError> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// The cache, for inspection.
    #[must_use]
    pub const fn cache(&self) -> &LoadCache {
        &self.cache
    }

    /// Drops all cached sources.
    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Loads (or reuses) the dataset for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Dataset`] if the source cannot be normalized.
    pub fn load_dataset(&mut self, source: &Source) -> Result<Arc<Dataset>, PipelineError> {
        let mode = self.config.column_mode;
        let key = ContentKey::with_options(source.bytes(), mode.as_ref());
        let format = TabularFormat::detect(Some(source.label()), source.bytes());

        let dataset = self.cache.datasets.get_or_try_load(key, || {
            log::info!("Loading {format:?} source {}", source.label());
            climate_map_dataset::load_dataset(source.bytes(), format, mode)
        })?;
        Ok(dataset)
    }

    /// Loads (or reuses) the boundaries for `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometrySourceError`] if the archive cannot be read.
    pub fn load_boundaries(&mut self, source: &Source) -> Result<Arc<BoundarySet>, GeometrySourceError> {
        let options = &self.config.boundaries;
        let key = ContentKey::with_options(
            source.bytes(),
            &format!("{}|{}", options.name_field, options.simplify_tolerance_m),
        );

        self.cache.boundaries.get_or_try_load(key, || {
            climate_map_boundaries::load_boundary_archive(source.bytes(), options)
        })
    }

    /// Variable labels of the dataset in display order.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Dataset`] if the source cannot be normalized.
    pub fn variables(&mut self, data: &Source) -> Result<Vec<String>, PipelineError> {
        let dataset = self.load_dataset(data)?;
        Ok(climate_map_ranking::order_variables(&dataset.variables()))
    }

    /// Ranks, summarizes and (when enabled) joins `variable`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Dataset`] if the tabular source cannot be
    /// normalized. Boundary failures are reported through
    /// [`MapOutcome::Unavailable`] instead.
    pub fn evaluate(
        &mut self,
        data: &Source,
        boundaries: Option<&Source>,
        variable: &str,
    ) -> Result<Evaluation, PipelineError> {
        let dataset = self.load_dataset(data)?;

        let view = climate_map_ranking::rank(dataset.records(), variable, self.config.aggregate);
        let summary = climate_map_ranking::summarize(&view);
        if let Err(empty) = &summary {
            log::warn!("{empty}");
        }

        let map = self.map_for(&view, boundaries);

        Ok(Evaluation {
            view,
            summary,
            top_n: self.config.top_n,
            map,
        })
    }

    fn map_for(&mut self, view: &RankedView, boundaries: Option<&Source>) -> MapOutcome {
        if !self.config.show_map {
            return MapOutcome::Disabled;
        }
        let Some(source) = boundaries else {
            return MapOutcome::Unavailable("no boundary archive provided".to_string());
        };

        match self.load_boundaries(source) {
            Ok(set) => {
                let highlight = self.config.highlight_top_n.then_some(self.config.top_n);
                MapOutcome::Ready(join_with_highlight(&set, view, highlight))
            }
            Err(e) => {
                log::warn!("Map unavailable for {}: {e}", source.label());
                MapOutcome::Unavailable(e.to_string())
            }
        }
    }

    /// CSV bytes of the evaluation's ranking, using the configured columns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Export`] if writing fails.
    pub fn export_csv(&self, evaluation: &Evaluation) -> Result<Vec<u8>, PipelineError> {
        Ok(climate_map_export::to_csv(
            &evaluation.view,
            self.config.export_columns,
        )?)
    }

    /// XLSX bytes of the evaluation's ranking, using the configured columns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Export`] if writing fails.
    pub fn export_xlsx(&self, evaluation: &Evaluation) -> Result<Vec<u8>, PipelineError> {
        Ok(climate_map_export::to_xlsx(
            &evaluation.view,
            self.config.export_columns,
        )?)
    }
}
