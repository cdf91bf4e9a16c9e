//! Filters records to one variable, optionally averages duplicate
//! municipalities, and sorts descending.

use std::collections::HashMap;

use climate_map_dataset::canonicalize;
use climate_map_dataset_models::{CanonicalKey, Record};
use climate_map_ranking_models::{RankedEntry, RankedView};

/// Builds the ranking for `variable`.
///
/// Matching is exact and case-sensitive on the normalized variable label.
/// When `aggregate` is set, rows are grouped by canonical municipality key
/// (so "São Paulo" and "SAO PAULO" land in one group) and reduced by mean;
/// the group keeps the first spelling seen. Sorting is stable, so ties keep
/// source order.
#[must_use]
pub fn rank(records: &[Record], variable: &str, aggregate: bool) -> RankedView {
    let selected = records.iter().filter(|r| r.variable == variable);

    let mut entries: Vec<RankedEntry> = if aggregate {
        mean_by_municipality(selected)
    } else {
        selected
            .map(|r| RankedEntry {
                municipality: r.municipality.clone(),
                key: canonicalize(&r.municipality),
                variable: r.variable.clone(),
                value: r.value,
            })
            .collect()
    };

    entries.sort_by(|a, b| b.value.total_cmp(&a.value));

    log::debug!(
        "Ranked {} entries for {variable:?} (aggregate={aggregate})",
        entries.len()
    );

    RankedView::new(variable.to_string(), aggregate, entries)
}

fn mean_by_municipality<'a>(records: impl Iterator<Item = &'a Record>) -> Vec<RankedEntry> {
    let mut groups: Vec<(RankedEntry, u32)> = Vec::new();
    let mut index: HashMap<CanonicalKey, usize> = HashMap::new();

    for record in records {
        let key = canonicalize(&record.municipality);
        if let Some(&pos) = index.get(&key) {
            let (entry, count) = &mut groups[pos];
            *count += 1;
            // Incremental so values near f64::MAX stay finite.
            entry.value += (record.value - entry.value) / f64::from(*count);
        } else {
            index.insert(key.clone(), groups.len());
            groups.push((
                RankedEntry {
                    municipality: record.municipality.clone(),
                    key,
                    variable: record.variable.clone(),
                    value: record.value,
                },
                1,
            ));
        }
    }

    groups.into_iter().map(|(entry, _)| entry).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(municipality: &str, variable: &str, value: f64) -> Record {
        Record {
            municipality: municipality.to_string(),
            variable: variable.to_string(),
            value,
        }
    }

    fn names(view: &RankedView) -> Vec<&str> {
        view.entries().iter().map(|e| e.municipality.as_str()).collect()
    }

    #[test]
    fn filters_to_exact_variable_and_sorts_descending() {
        let records = [
            record("Belém", "Média Anual", 27.0),
            record("Marabá", "Média Anual", 28.5),
            record("Belém", "média anual", 99.0),
            record("Santarém", "Média Anual", 26.1),
            record("Marabá", "Média Mensal - Março", 30.0),
        ];
        let view = rank(&records, "Média Anual", false);
        assert_eq!(names(&view), ["Marabá", "Belém", "Santarém"]);
        assert_eq!(view.variable(), "Média Anual");
        assert!(!view.aggregated());
    }

    #[test]
    fn length_matches_row_count_without_aggregation() {
        let records = [
            record("A", "x", 1.0),
            record("A", "x", 2.0),
            record("B", "y", 3.0),
            record("C", "x", 4.0),
        ];
        let view = rank(&records, "x", false);
        assert_eq!(view.len(), records.iter().filter(|r| r.variable == "x").count());
    }

    #[test]
    fn ties_keep_source_order() {
        let records = [
            record("Primeiro", "x", 5.0),
            record("Segundo", "x", 7.0),
            record("Terceiro", "x", 5.0),
            record("Quarto", "x", 5.0),
        ];
        let view = rank(&records, "x", false);
        assert_eq!(names(&view), ["Segundo", "Primeiro", "Terceiro", "Quarto"]);
    }

    #[test]
    fn aggregates_by_canonical_key_with_mean() {
        let records = [
            record("São Paulo", "x", 10.0),
            record("Campinas", "x", 12.0),
            record("SAO  PAULO", "x", 20.0),
        ];
        let view = rank(&records, "x", true);
        assert_eq!(view.len(), 2);
        assert_eq!(view.entries()[0].municipality, "São Paulo");
        assert_eq!(view.entries()[0].key.as_str(), "SAO PAULO");
        assert!((view.entries()[0].value - 15.0).abs() < f64::EPSILON);
        assert_eq!(view.entries()[1].municipality, "Campinas");
        assert!(view.aggregated());
    }

    #[test]
    fn aggregate_mean_of_huge_values_is_finite() {
        let records = [record("Belém", "x", 1.5e308), record("BELEM", "x", 1.5e308)];
        let view = rank(&records, "x", true);
        assert_eq!(view.len(), 1);
        assert!(view.entries()[0].value.is_finite());
        assert!((view.entries()[0].value - 1.5e308).abs() <= 1.5e308 * f64::EPSILON);
    }

    #[test]
    fn unknown_variable_yields_empty_view() {
        let records = [record("A", "x", 1.0)];
        let view = rank(&records, "nada", true);
        assert!(view.is_empty());
    }
}
