#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipality boundary types.
//!
//! Boundaries come from a zipped shapefile and are matched to tabular data
//! only through the canonical municipality name; there is no shared
//! identifier between the two sources.

use climate_map_dataset_models::CanonicalKey;
use geo::{BoundingRect, MultiPolygon};
use serde::{Deserialize, Serialize};

/// Default attribute holding the municipality name (IBGE `NM_MUN`).
pub const DEFAULT_NAME_FIELD: &str = "NM_MUN";

/// Default simplification tolerance in projected meters.
pub const DEFAULT_SIMPLIFY_TOLERANCE_M: f64 = 200.0;

/// How a boundary archive is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct BoundaryOptions {
    /// Attribute field holding the municipality name.
    pub name_field: String,
    /// Simplification tolerance in Web Mercator meters; `0` disables it.
    pub simplify_tolerance_m: f64,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            name_field: DEFAULT_NAME_FIELD.to_string(),
            simplify_tolerance_m: DEFAULT_SIMPLIFY_TOLERANCE_M,
        }
    }
}

/// One municipality polygon.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonFeature {
    /// Name attribute as stored in the shapefile.
    pub name: String,
    /// Join key derived from `name`.
    pub key: CanonicalKey,
    /// Boundary in lon/lat.
    pub geometry: MultiPolygon<f64>,
    /// Joined value; `None` until joined, and after a join miss.
    pub value: Option<f64>,
}

/// An immutable set of boundary polygons loaded from one archive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySet {
    name_field: String,
    features: Vec<PolygonFeature>,
}

impl BoundarySet {
    /// Builds a set from features in file order.
    #[must_use]
    pub const fn new(name_field: String, features: Vec<PolygonFeature>) -> Self {
        Self {
            name_field,
            features,
        }
    }

    /// The attribute the names were read from.
    #[must_use]
    pub fn name_field(&self) -> &str {
        &self.name_field
    }

    /// Features in file order.
    #[must_use]
    pub fn features(&self) -> &[PolygonFeature] {
        &self.features
    }

    /// Number of polygons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the archive held no polygons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// An axis-aligned lon/lat bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    /// Western edge (longitude).
    pub min_x: f64,
    /// Southern edge (latitude).
    pub min_y: f64,
    /// Eastern edge (longitude).
    pub max_x: f64,
    /// Northern edge (latitude).
    pub max_y: f64,
}

impl Extent {
    /// Bounding box of a single geometry, `None` when it has no coordinates.
    #[must_use]
    pub fn of(geometry: &MultiPolygon<f64>) -> Option<Self> {
        geometry.bounding_rect().map(|rect| Self {
            min_x: rect.min().x,
            min_y: rect.min().y,
            max_x: rect.max().x,
            max_y: rect.max().y,
        })
    }

    /// Smallest extent covering both.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Leaflet-style fit bounds: `[[south, west], [north, east]]`.
    #[must_use]
    pub const fn fit_bounds(&self) -> [[f64; 2]; 2] {
        [[self.min_y, self.min_x], [self.max_y, self.max_x]]
    }
}

/// How a joined polygon is filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "bucket", rename_all = "snake_case")]
pub enum Fill {
    /// Index into the color scale's palette.
    Bucket(usize),
    /// No matching record; drawn with the no-data color.
    NoData,
}
