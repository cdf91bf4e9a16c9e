//! Evaluation plus artifact output, shared by the subcommand and the
//! interactive mode.

use std::path::{Path, PathBuf};

use climate_map_boundaries::to_geojson_string;
use climate_map_pipeline::{MapOutcome, Pipeline, Source};

use crate::render;

/// Files to write after an evaluation.
#[derive(Debug, Default)]
pub struct Outputs {
    pub csv: Option<PathBuf>,
    pub xlsx: Option<PathBuf>,
    pub geojson: Option<PathBuf>,
}

/// Opens the boundary archive if it exists; a missing file only disables
/// the map.
pub fn boundary_source(path: &Path) -> Option<Source> {
    match Source::from_path(path) {
        Ok(source) => Some(source),
        Err(e) => {
            log::warn!("Boundary archive {} not readable: {e}", path.display());
            None
        }
    }
}

/// Evaluates `variable`, prints the result and writes the requested files.
///
/// # Errors
///
/// Returns an error if evaluation, export or a file write fails.
pub fn run(
    pipeline: &mut Pipeline,
    data: &Source,
    boundaries: Option<&Source>,
    variable: &str,
    outputs: &Outputs,
) -> Result<(), Box<dyn std::error::Error>> {
    let evaluation = pipeline.evaluate(data, boundaries, variable)?;
    render::print_evaluation(&evaluation);

    if let Some(path) = &outputs.csv {
        std::fs::write(path, pipeline.export_csv(&evaluation)?)?;
        log::info!("Wrote {}", path.display());
    }

    if let Some(path) = &outputs.xlsx {
        std::fs::write(path, pipeline.export_xlsx(&evaluation)?)?;
        log::info!("Wrote {}", path.display());
    }

    if let Some(path) = &outputs.geojson {
        match &evaluation.map {
            MapOutcome::Ready(joined) => {
                std::fs::write(path, to_geojson_string(joined)?)?;
                log::info!("Wrote {}", path.display());
            }
            other => log::warn!(
                "Skipping {}: {}",
                path.display(),
                render::map_status(other)
            ),
        }
    }

    Ok(())
}
