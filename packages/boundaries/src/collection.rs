//! `GeoJSON` rendering of a joined polygon set.

use geojson::{Feature, FeatureCollection, Geometry, JsonObject, JsonValue};

use climate_map_ranking::display::format_optional;

use crate::choropleth::{PALETTE, color};
use crate::join::JoinedPolygonSet;

/// Legend caption for a variable.
#[must_use]
pub fn legend_name(variable: &str) -> String {
    format!("Valor — {variable}")
}

/// Builds a feature collection with one feature per polygon.
///
/// Each feature carries `name`, `key`, `value` (null when unmatched),
/// `value_label`, `fill` and `highlighted`. The collection carries the
/// `legend` caption and `fit_bounds` as foreign members, plus
/// `legend_breaks` (bucket edges) and `legend_colors` when any polygon
/// matched.
#[must_use]
pub fn to_feature_collection(joined: &JoinedPolygonSet) -> FeatureCollection {
    let features = joined
        .features()
        .iter()
        .map(|f| {
            let mut properties = JsonObject::new();
            properties.insert("name".to_string(), JsonValue::from(f.feature.name.as_str()));
            properties.insert("key".to_string(), JsonValue::from(f.feature.key.as_str()));
            properties.insert(
                "value".to_string(),
                f.feature.value.map_or(JsonValue::Null, JsonValue::from),
            );
            properties.insert(
                "value_label".to_string(),
                JsonValue::from(format_optional(f.feature.value)),
            );
            properties.insert("fill".to_string(), JsonValue::from(color(f.fill)));
            properties.insert("highlighted".to_string(), JsonValue::from(f.highlighted));

            Feature {
                bbox: None,
                geometry: Some(Geometry::new(geojson::Value::from(&f.feature.geometry))),
                id: None,
                properties: Some(properties),
                foreign_members: None,
            }
        })
        .collect();

    let mut foreign = JsonObject::new();
    foreign.insert(
        "legend".to_string(),
        JsonValue::from(legend_name(joined.variable())),
    );
    if let Some(scale) = joined.scale() {
        foreign.insert(
            "legend_breaks".to_string(),
            JsonValue::from(scale.breaks().to_vec()),
        );
        foreign.insert(
            "legend_colors".to_string(),
            JsonValue::from(PALETTE.to_vec()),
        );
    }
    if let Some(extent) = joined.extent() {
        let [[south, west], [north, east]] = extent.fit_bounds();
        foreign.insert(
            "fit_bounds".to_string(),
            serde_json::json!([[south, west], [north, east]]),
        );
    }

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign),
    }
}

/// Serializes [`to_feature_collection`] to a JSON string.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_geojson_string(joined: &JoinedPolygonSet) -> Result<String, serde_json::Error> {
    serde_json::to_string(&to_feature_collection(joined))
}

#[cfg(test)]
mod tests {
    use climate_map_boundaries_models::{BoundarySet, PolygonFeature};
    use climate_map_dataset::canonicalize;
    use climate_map_ranking_models::{RankedEntry, RankedView};
    use geo::{MultiPolygon, polygon};

    use super::*;
    use crate::join::join_with_highlight;

    fn joined() -> JoinedPolygonSet {
        joined_with(&[("BELEM", 1234.5)])
    }

    fn joined_with(values: &[(&str, f64)]) -> JoinedPolygonSet {
        let feature = |name: &str, x: f64| PolygonFeature {
            name: name.to_string(),
            key: canonicalize(name),
            geometry: MultiPolygon(vec![polygon![
                (x: x, y: -2.0),
                (x: x, y: -1.0),
                (x: x + 1.0, y: -1.0),
                (x: x + 1.0, y: -2.0),
            ]]),
            value: None,
        };
        let boundaries = BoundarySet::new(
            "NM_MUN".to_string(),
            vec![feature("Belém", -48.0), feature("Marabá", -49.0)],
        );
        let view = RankedView::new(
            "Janeiro".to_string(),
            false,
            values
                .iter()
                .map(|&(municipality, value)| RankedEntry {
                    municipality: municipality.to_string(),
                    key: canonicalize(municipality),
                    variable: "Janeiro".to_string(),
                    value,
                })
                .collect(),
        );
        join_with_highlight(&boundaries, &view, Some(6))
    }

    #[test]
    fn feature_properties() {
        let fc = to_feature_collection(&joined());
        assert_eq!(fc.features.len(), 2);

        let props = fc.features[0].properties.as_ref().unwrap();
        assert_eq!(props["name"], "Belém");
        assert_eq!(props["key"], "BELEM");
        assert_eq!(props["value"], 1234.5);
        assert_eq!(props["value_label"], "1.234,50");
        assert_eq!(props["highlighted"], true);

        let missing = fc.features[1].properties.as_ref().unwrap();
        assert!(missing["value"].is_null());
        assert_eq!(missing["fill"], "#808080");
        assert_eq!(missing["highlighted"], false);
    }

    #[test]
    fn collection_carries_legend_and_bounds() {
        let fc = to_feature_collection(&joined());
        let foreign = fc.foreign_members.unwrap();
        assert_eq!(foreign["legend"], "Valor — Janeiro");
        assert_eq!(foreign["fit_bounds"], serde_json::json!([[-2.0, -48.0], [-1.0, -47.0]]));
    }

    #[test]
    fn collection_carries_legend_scale() {
        let fc = to_feature_collection(&joined_with(&[("Marabá", 60.0), ("Belém", 0.0)]));
        let foreign = fc.foreign_members.unwrap();
        assert_eq!(
            foreign["legend_breaks"],
            serde_json::json!([0.0, 10.0, 20.0, 30.0, 40.0, 50.0, 60.0])
        );
        assert_eq!(foreign["legend_colors"], serde_json::json!(PALETTE));
    }

    #[test]
    fn unmatched_collection_has_no_legend_scale() {
        let fc = to_feature_collection(&joined_with(&[]));
        let foreign = fc.foreign_members.unwrap();
        assert!(!foreign.contains_key("legend_breaks"));
        assert!(foreign.contains_key("legend"));
    }

    #[test]
    fn serializes_to_json() {
        let json = to_geojson_string(&joined()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "FeatureCollection");
        assert_eq!(value["features"][0]["geometry"]["type"], "MultiPolygon");
    }
}
