//! Menu-driven mode using `dialoguer`.
//!
//! Mirrors the dashboard flow: pick a variable, choose how many leading
//! municipalities to chart, whether to aggregate, and which files to write.

use std::path::PathBuf;

use climate_map_export::export_file_stem;
use climate_map_pipeline::config::TOP_N_RANGE;
use climate_map_pipeline::{Pipeline, PipelineConfig, Source};
use dialoguer::{Confirm, Input, MultiSelect, Select};

use crate::report::{self, Outputs};

/// Label of the entry that leaves the variable unselected.
const NO_SELECTION: &str = "— Selecione —";

/// Files the user can ask for.
enum Export {
    Csv,
    Xlsx,
    GeoJson,
}

impl Export {
    const ALL: &[Self] = &[Self::Csv, Self::Xlsx, Self::GeoJson];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Csv => "CSV (variável filtrada)",
            Self::Xlsx => "Excel (variável filtrada)",
            Self::GeoJson => "GeoJSON do mapa",
        }
    }

    #[must_use]
    const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::GeoJson => "geojson",
        }
    }
}

/// Runs the interactive flow against the configured source paths.
///
/// # Errors
///
/// Returns an error if the source cannot be loaded, a prompt fails, or an
/// output cannot be written.
pub fn run(mut config: PipelineConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("Climate Map");
    println!();

    let data = Source::from_path(&config.data_path)?;
    let mut pipeline = Pipeline::new(config.clone())?;
    let variables = pipeline.variables(&data)?;

    let mut labels = vec![NO_SELECTION];
    labels.extend(variables.iter().map(String::as_str));

    let idx = Select::new()
        .with_prompt("Selecione a variável")
        .items(&labels)
        .default(0)
        .max_length(20)
        .interact()?;

    let Some(variable) = idx.checked_sub(1).map(|i| variables[i].clone()) else {
        println!("Selecione uma variável para exibir ranking, gráfico e mapa.");
        return Ok(());
    };

    config.top_n = Input::new()
        .with_prompt(format!(
            "Top N (destaque, {}-{})",
            TOP_N_RANGE.start(),
            TOP_N_RANGE.end()
        ))
        .default(config.top_n)
        .validate_with(|n: &usize| {
            if TOP_N_RANGE.contains(n) {
                Ok(())
            } else {
                Err("fora do intervalo")
            }
        })
        .interact_text()?;

    config.aggregate = Confirm::new()
        .with_prompt("Agregar municípios repetidos pela média?")
        .default(config.aggregate)
        .interact()?;

    config.show_map = Confirm::new()
        .with_prompt("Exibir mapa?")
        .default(config.show_map)
        .interact()?;

    let export_labels: Vec<&str> = Export::ALL.iter().map(Export::label).collect();
    let selected = MultiSelect::new()
        .with_prompt("Arquivos a gerar (espaço marca, enter confirma)")
        .items(&export_labels)
        .interact()?;

    let stem = export_file_stem(&variable);
    let mut outputs = Outputs::default();
    for &i in &selected {
        let export = &Export::ALL[i];
        let path = Some(PathBuf::from(format!("{stem}.{}", export.extension())));
        match export {
            Export::Csv => outputs.csv = path,
            Export::Xlsx => outputs.xlsx = path,
            Export::GeoJson => outputs.geojson = path,
        }
    }

    let boundaries = if config.show_map {
        report::boundary_source(&config.boundaries_path)
    } else {
        None
    };

    pipeline.reconfigure(config)?;
    report::run(&mut pipeline, &data, boundaries.as_ref(), &variable, &outputs)
}
