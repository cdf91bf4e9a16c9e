//! Display ordering for variable labels.
//!
//! Monthly variables ("Média Mensal - Março") come first in calendar order,
//! followed by everything else alphabetically. Ordering never affects which
//! rows are selected.

use climate_map_dataset::canonical::canonical_string;
use climate_map_dataset_models::VariableSet;

/// Month names in calendar order, already canonicalized (accent-free,
/// upper-case).
const MONTHS: [&str; 12] = [
    "JANEIRO",
    "FEVEREIRO",
    "MARCO",
    "ABRIL",
    "MAIO",
    "JUNHO",
    "JULHO",
    "AGOSTO",
    "SETEMBRO",
    "OUTUBRO",
    "NOVEMBRO",
    "DEZEMBRO",
];

/// Sort key for labels without a month; larger than any month index.
const NON_MONTHLY: usize = MONTHS.len();

/// Returns the calendar index (0 = January) of the first month named in
/// `label`, matching whole words only.
#[must_use]
pub fn month_index(label: &str) -> Option<usize> {
    let canonical = canonical_string(label);
    canonical
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|token| !token.is_empty())
        .find_map(|token| MONTHS.iter().position(|m| *m == token))
}

/// Orders variable labels for presentation.
#[must_use]
pub fn order_variables(variables: &VariableSet) -> Vec<String> {
    let mut keyed: Vec<(usize, String, &str)> = variables
        .iter()
        .map(|label| {
            (
                month_index(label).unwrap_or(NON_MONTHLY),
                canonical_string(label),
                label,
            )
        })
        .collect();

    keyed.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)).then_with(|| a.2.cmp(b.2)));

    keyed.into_iter().map(|(_, _, label)| label.to_string()).collect()
}
