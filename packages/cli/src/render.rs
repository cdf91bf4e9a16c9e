//! Plain-text rendering of an evaluation.

use climate_map_pipeline::{Evaluation, MapOutcome};
use climate_map_ranking::display::format_value;
use climate_map_ranking_models::RankedEntry;

/// Widest bar in the chart, in characters.
const BAR_WIDTH: usize = 40;

/// Prints the summary metrics, the ranking table, the top-N chart and the
/// map status.
pub fn print_evaluation(evaluation: &Evaluation) {
    println!("Variável: {}", evaluation.view.variable());
    println!();

    for (label, value) in evaluation.metrics() {
        println!("{label:<8} {value:>16}");
    }
    println!();

    if evaluation.view.is_empty() {
        println!("Nenhum registro para esta variável.");
        return;
    }

    for line in ranking_lines(evaluation.view.entries()) {
        println!("{line}");
    }
    println!();

    println!("Top {}", evaluation.top_n);
    for line in bar_chart_lines(evaluation.top(), BAR_WIDTH) {
        println!("{line}");
    }
    println!();

    println!("{}", map_status(&evaluation.map));
}

/// Ranking table rows, header first.
#[must_use]
pub fn ranking_lines(entries: &[RankedEntry]) -> Vec<String> {
    let name_width = entries
        .iter()
        .map(|e| e.municipality.chars().count())
        .max()
        .unwrap_or(0)
        .max("Município".chars().count());

    let mut lines = Vec::with_capacity(entries.len() + 2);
    lines.push(format!("{:>4}  {:<name_width$}  {:>16}", "#", "Município", "Valor"));
    lines.push("-".repeat(4 + 2 + name_width + 2 + 16));
    for (i, entry) in entries.iter().enumerate() {
        lines.push(format!(
            "{:>4}  {:<name_width$}  {:>16}",
            i + 1,
            entry.municipality,
            format_value(entry.value)
        ));
    }
    lines
}

/// Horizontal bars scaled so the largest value spans `width` characters.
/// Non-positive values get an empty bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn bar_chart_lines(entries: &[RankedEntry], width: usize) -> Vec<String> {
    let max = entries.iter().map(|e| e.value).fold(0.0_f64, f64::max);
    let name_width = entries
        .iter()
        .map(|e| e.municipality.chars().count())
        .max()
        .unwrap_or(0);

    entries
        .iter()
        .map(|entry| {
            let len = if max > 0.0 && entry.value > 0.0 {
                ((entry.value / max) * width as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:<name_width$} {} {}",
                entry.municipality,
                "█".repeat(len),
                format_value(entry.value)
            )
        })
        .collect()
}

/// One-line description of the map outcome.
#[must_use]
pub fn map_status(map: &MapOutcome) -> String {
    match map {
        MapOutcome::Disabled => "Mapa desativado.".to_string(),
        MapOutcome::Unavailable(reason) => format!("Mapa indisponível: {reason}"),
        MapOutcome::Ready(joined) => format!(
            "Mapa: {} de {} municípios com dados.",
            joined.matched(),
            joined.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use climate_map_dataset_models::CanonicalKey;

    use super::*;

    fn entry(name: &str, value: f64) -> RankedEntry {
        RankedEntry {
            municipality: name.to_string(),
            key: CanonicalKey::from_canonical(name.to_uppercase()),
            variable: "v".to_string(),
            value,
        }
    }

    #[test]
    fn bars_scale_to_largest_value() {
        let lines = bar_chart_lines(&[entry("Belém", 40.0), entry("Macapá", 10.0)], 8);
        assert_eq!(lines[0], "Belém  ████████ 40,00");
        assert_eq!(lines[1], "Macapá ██ 10,00");
    }

    #[test]
    fn negative_values_have_empty_bars() {
        let lines = bar_chart_lines(&[entry("A", -1.0)], 8);
        assert_eq!(lines[0], "A  -1,00");
    }

    #[test]
    fn ranking_table_numbers_rows() {
        let lines = ranking_lines(&[entry("Belém", 1234.5)]);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Município"));
        assert!(lines[2].starts_with("   1  Belém"));
        assert!(lines[2].ends_with("1.234,50"));
    }

    #[test]
    fn map_status_messages() {
        assert_eq!(map_status(&MapOutcome::Disabled), "Mapa desativado.");
        assert_eq!(
            map_status(&MapOutcome::Unavailable("Archive contains no .shp file".to_string())),
            "Mapa indisponível: Archive contains no .shp file"
        );
    }
}
