//! Left join of boundary polygons against a ranked view.

use std::collections::{HashMap, HashSet};

use climate_map_boundaries_models::{BoundarySet, Extent, Fill, PolygonFeature};
use climate_map_dataset_models::CanonicalKey;
use climate_map_ranking_models::RankedView;

use crate::choropleth::ColorScale;

/// A polygon with its joined value and styling.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedFeature {
    /// The boundary, with `value` set from the view (or `None`).
    pub feature: PolygonFeature,
    /// Choropleth fill.
    pub fill: Fill,
    /// Whether the municipality is in the view's top-N.
    pub highlighted: bool,
}

/// Every boundary polygon, each carrying the view's value for its
/// municipality where one exists.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedPolygonSet {
    variable: String,
    features: Vec<JoinedFeature>,
    scale: Option<ColorScale>,
    extent: Option<Extent>,
    matched: usize,
}

impl JoinedPolygonSet {
    /// Variable the values came from.
    #[must_use]
    pub fn variable(&self) -> &str {
        &self.variable
    }

    /// Features in boundary file order; one per input polygon.
    #[must_use]
    pub fn features(&self) -> &[JoinedFeature] {
        &self.features
    }

    /// Color scale over the matched values, `None` when nothing matched.
    #[must_use]
    pub const fn scale(&self) -> Option<&ColorScale> {
        self.scale.as_ref()
    }

    /// Map extent: matched features, or all features when nothing matched.
    #[must_use]
    pub const fn extent(&self) -> Option<Extent> {
        self.extent
    }

    /// Number of polygons that found a value.
    #[must_use]
    pub const fn matched(&self) -> usize {
        self.matched
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` for an empty boundary set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Joins boundaries to the view on canonical municipality key.
///
/// The result has exactly one feature per polygon. When the view holds a
/// key more than once, the highest-ranked entry supplies the value.
#[must_use]
pub fn join(boundaries: &BoundarySet, view: &RankedView) -> JoinedPolygonSet {
    join_with_highlight(boundaries, view, None)
}

/// Like [`join`], additionally flagging polygons whose municipality is in
/// the view's first `top_n` entries.
#[must_use]
pub fn join_with_highlight(
    boundaries: &BoundarySet,
    view: &RankedView,
    top_n: Option<usize>,
) -> JoinedPolygonSet {
    let mut values: HashMap<&CanonicalKey, f64> = HashMap::with_capacity(view.len());
    for entry in view.entries() {
        values.entry(&entry.key).or_insert(entry.value);
    }

    let highlighted: HashSet<&CanonicalKey> = top_n
        .map(|n| view.top_n(n).iter().map(|e| &e.key).collect())
        .unwrap_or_default();

    let joined: Vec<(PolygonFeature, bool)> = boundaries
        .features()
        .iter()
        .map(|feature| {
            let value = values.get(&feature.key).copied();
            (
                PolygonFeature {
                    value,
                    ..feature.clone()
                },
                highlighted.contains(&feature.key),
            )
        })
        .collect();

    let scale = ColorScale::sequential(joined.iter().filter_map(|(f, _)| f.value));
    let matched = joined.iter().filter(|(f, _)| f.value.is_some()).count();

    let extent = extent_over(joined.iter().map(|(f, _)| f).filter(|f| f.value.is_some()))
        .or_else(|| extent_over(joined.iter().map(|(f, _)| f)));

    log::info!(
        "Joined {matched} of {} polygons to {:?} ({} ranked municipalities)",
        joined.len(),
        view.variable(),
        values.len()
    );

    let features = joined
        .into_iter()
        .map(|(feature, highlighted)| JoinedFeature {
            fill: scale.map_or(Fill::NoData, |s| s.fill(feature.value)),
            feature,
            highlighted,
        })
        .collect();

    JoinedPolygonSet {
        variable: view.variable().to_string(),
        features,
        scale,
        extent,
        matched,
    }
}

fn extent_over<'a>(features: impl Iterator<Item = &'a PolygonFeature>) -> Option<Extent> {
    features
        .filter_map(|f| Extent::of(&f.geometry))
        .reduce(Extent::union)
}
