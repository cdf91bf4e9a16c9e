//! Municipality name canonicalization.
//!
//! Applied symmetrically to spreadsheet municipality names and polygon
//! name attributes. "São Paulo", "sao paulo" and "  SAO   PAULO " all map
//! to `SAO PAULO`.

use climate_map_dataset_models::CanonicalKey;

/// Canonicalizes a display name into a join key.
///
/// The pipeline:
/// 1. Transliterate to ASCII (strips diacritics)
/// 2. Uppercase
/// 3. Collapse whitespace runs and trim
///
/// Idempotent: `canonicalize(canonicalize(x)) == canonicalize(x)`.
#[must_use]
pub fn canonicalize(name: &str) -> CanonicalKey {
    CanonicalKey::from_canonical(canonical_string(name))
}

/// Same as [`canonicalize`] but returns the bare string.
#[must_use]
pub fn canonical_string(name: &str) -> String {
    let ascii = deunicode::deunicode(name);
    let upper = ascii.to_uppercase();
    upper.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_accents_and_uppercases() {
        assert_eq!(canonicalize("São Paulo").as_str(), "SAO PAULO");
    }

    #[test]
    fn variants_share_a_key() {
        let expected = canonicalize("São Paulo");
        for variant in ["sao paulo", "SAO  PAULO", "  São   paulo\t", "SÃO PAULO"] {
            assert_eq!(canonicalize(variant), expected, "variant {variant:?}");
        }
    }

    #[test]
    fn handles_cedilla_and_circumflex() {
        assert_eq!(canonicalize("Conceição do Araguaia").as_str(), "CONCEICAO DO ARAGUAIA");
        assert_eq!(canonicalize("Ji-Paraná").as_str(), "JI-PARANA");
        assert_eq!(canonicalize("Açailândia").as_str(), "ACAILANDIA");
    }

    #[test]
    fn is_idempotent() {
        for name in [
            "São Paulo",
            "  d'Oeste  ",
            "Santa Bárbara d'Oeste",
            "",
            "   ",
            "Ñuñoa",
            "Straße",
            "北京",
            "Itaú de Minas",
        ] {
            let once = canonical_string(name);
            assert_eq!(canonical_string(&once), once, "input {name:?}");
        }
    }

    #[test]
    fn empty_and_blank_become_empty() {
        assert_eq!(canonicalize("").as_str(), "");
        assert_eq!(canonicalize(" \t\n ").as_str(), "");
    }
}
