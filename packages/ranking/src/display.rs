//! pt-BR display formatting for values and summary statistics.

use climate_map_ranking_models::{EmptySelection, SummaryStats};

/// Shown wherever a value cannot be displayed.
pub const PLACEHOLDER: &str = "—";

/// Formats a value with two decimals, `.` thousands grouping and `,` as
/// the decimal separator (`1234.5` → `1.234,50`).
///
/// Non-finite values render as [`PLACEHOLDER`].
#[must_use]
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return PLACEHOLDER.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.chars().any(|c| c != '0' && c != '.');
    let sign = if negative { "-" } else { "" };
    format!("{sign}{grouped},{frac_part}")
}

/// Formats an optional value, using [`PLACEHOLDER`] for `None`.
#[must_use]
pub fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), format_value)
}

/// Labelled summary metrics ready for display: Máximo, Mínimo, Média,
/// Mediana.
///
/// An empty selection yields the same labels with placeholder values.
#[must_use]
pub fn summary_metrics(summary: &Result<SummaryStats, EmptySelection>) -> [(&'static str, String); 4] {
    let stats = summary.as_ref().ok();
    [
        ("Máximo", format_optional(stats.map(|s| s.max))),
        ("Mínimo", format_optional(stats.map(|s| s.min))),
        ("Média", format_optional(stats.map(|s| s.mean))),
        ("Mediana", format_optional(stats.map(|s| s.median))),
    ]
}
