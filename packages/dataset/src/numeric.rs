//! Locale-tolerant numeric coercion for spreadsheet values.
//!
//! Projection spreadsheets mix native numeric cells with text cells in
//! either pt-BR (`1.234,56`) or en-US (`1,234.56`) notation. A value is only
//! rejected when no reading of it yields a finite number.

/// Parses a text cell as a finite `f64`.
///
/// Accepts:
/// - plain numbers (`12.5`, `-3`, `1e3`)
/// - decimal comma (`12,5`)
/// - grouped thousands in either notation (`1.234,56`, `1,234.56`,
///   `1.234.567`, `1 234,5`)
///
/// Returns `None` for blank, non-numeric, or non-finite input.
#[must_use]
pub fn parse_value(raw: &str) -> Option<f64> {
    let compact: String = raw
        .trim()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}' && *c != '\u{202f}')
        .collect();

    if compact.is_empty() {
        return None;
    }

    let normalized = normalize_separators(&compact)?;
    let value = normalized.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// Rewrites grouping/decimal separators into the `.`-decimal form that
/// [`str::parse`] understands.
fn normalize_separators(s: &str) -> Option<String> {
    let commas = s.matches(',').count();
    let dots = s.matches('.').count();

    match (commas, dots) {
        (0, 0 | 1) => Some(s.to_string()),
        // `1.234.567`: dots can only be grouping
        (0, _) => Some(s.replace('.', "")),
        // `12,5`: single decimal comma
        (1, 0) => Some(s.replace(',', ".")),
        // `1,234,567`: commas can only be grouping
        (_, 0) => Some(s.replace(',', "")),
        _ => {
            // Both present: whichever comes last is the decimal separator.
            let last_comma = s.rfind(',')?;
            let last_dot = s.rfind('.')?;
            if last_comma > last_dot {
                if dots > 0 && commas > 1 {
                    return None;
                }
                Some(s.replace('.', "").replace(',', "."))
            } else {
                if dots > 1 {
                    return None;
                }
                Some(s.replace(',', ""))
            }
        }
    }
}
