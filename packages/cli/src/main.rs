#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the climate map pipeline.
//!
//! `variables` lists the variables of a source, `report` ranks one of them
//! and writes CSV/XLSX/GeoJSON artifacts. Without a subcommand the tool
//! walks through the same choices interactively.

mod interactive;
mod render;
mod report;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use climate_map_dataset_models::ColumnMode;
use climate_map_export::ExportColumns;
use climate_map_pipeline::{Pipeline, PipelineConfig, Source, load_config};

use crate::report::Outputs;

#[derive(Parser)]
#[command(
    name = "climate_map",
    about = "Rankings and choropleths of municipal climate projections"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "CLIMATE_MAP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Options shared by commands that read the tabular source.
#[derive(clap::Args)]
struct SourceArgs {
    /// Tabular source (.xlsx, .xls, .ods or .csv); defaults to the config's
    /// `data_path`
    #[arg(long)]
    data: Option<PathBuf>,
    /// Read municipality/variable/value from columns 0/2/3 instead of
    /// matching header names
    #[arg(long)]
    by_position: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the variables of a source in display order
    Variables {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Rank one variable and write the requested artifacts
    Report {
        #[command(flatten)]
        source: SourceArgs,
        /// Variable label, exactly as it appears in the source
        #[arg(long)]
        variable: String,
        /// Average rows of the same municipality
        #[arg(long)]
        aggregate: bool,
        /// Number of leading municipalities to chart (3-30)
        #[arg(long)]
        top_n: Option<usize>,
        /// Zipped shapefile of municipality boundaries
        #[arg(long)]
        boundaries: Option<PathBuf>,
        /// Skip the map
        #[arg(long)]
        no_map: bool,
        /// Write the joined polygons as `GeoJSON`
        #[arg(long)]
        geojson: Option<PathBuf>,
        /// Write the ranking as CSV
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write the ranking as XLSX
        #[arg(long)]
        xlsx: Option<PathBuf>,
        /// Include the variable column in CSV/XLSX exports
        #[arg(long)]
        with_variable_column: bool,
    },
}

impl SourceArgs {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(data) = &self.data {
            config.data_path.clone_from(data);
        }
        if self.by_position {
            config.column_mode = ColumnMode::ByPosition;
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;

    let Some(command) = cli.command else {
        return interactive::run(config);
    };

    match command {
        Commands::Variables { source } => {
            source.apply(&mut config);
            let data = Source::from_path(&config.data_path)?;
            let mut pipeline = Pipeline::new(config)?;
            for variable in pipeline.variables(&data)? {
                println!("{variable}");
            }
        }
        Commands::Report {
            source,
            variable,
            aggregate,
            top_n,
            boundaries,
            no_map,
            geojson,
            csv,
            xlsx,
            with_variable_column,
        } => {
            source.apply(&mut config);
            config.aggregate |= aggregate;
            if let Some(n) = top_n {
                config.top_n = n;
            }
            if let Some(path) = boundaries {
                config.boundaries_path = path;
            }
            if no_map {
                config.show_map = false;
            }
            if with_variable_column {
                config.export_columns = ExportColumns::MunicipalityVariableValue;
            }

            let data = Source::from_path(&config.data_path)?;
            let boundaries = if config.show_map {
                report::boundary_source(&config.boundaries_path)
            } else {
                None
            };
            let mut pipeline = Pipeline::new(config)?;

            report::run(
                &mut pipeline,
                &data,
                boundaries.as_ref(),
                &variable,
                &Outputs { csv, xlsx, geojson },
            )?;
        }
    }

    Ok(())
}
