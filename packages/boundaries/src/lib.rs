#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Municipality boundaries: archive loading, simplification, the spatial
//! left join against a ranked view, and choropleth output.
//!
//! Boundaries are loaded once per archive (see [`load_boundary_archive`])
//! and simplified at load time. Each evaluation then calls [`join`], which
//! never drops a polygon: municipalities without data are kept with a
//! `None` value and the no-data fill.

pub mod archive;
pub mod choropleth;
pub mod collection;
pub mod join;
pub mod shape;
pub mod simplify;

pub use archive::load_boundary_archive;
pub use choropleth::{ColorScale, NO_DATA_COLOR, PALETTE};
pub use collection::{legend_name, to_feature_collection, to_geojson_string};
pub use join::{JoinedFeature, JoinedPolygonSet, join, join_with_highlight};

use thiserror::Error;

/// Errors raised while reading a boundary archive.
///
/// The pipeline treats all of these as non-fatal: the map becomes
/// unavailable while tables and exports keep working.
#[derive(Debug, Error)]
pub enum GeometrySourceError {
    /// The bytes are not a readable zip archive.
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// The archive holds no `.shp` entry.
    #[error("Archive contains no .shp file")]
    NoShapefile,

    /// A required companion file is missing next to the `.shp`.
    #[error("Shapefile {shapefile} has no .{extension} companion file")]
    MissingSidecar {
        /// Archive path of the `.shp` entry.
        shapefile: String,
        /// Missing extension, without the dot.
        extension: &'static str,
    },

    /// The name attribute is absent or not a text field.
    #[error("Attribute table has no text field {field:?}")]
    MissingAttribute {
        /// Configured attribute name.
        field: String,
    },

    /// The shapefile reader rejected the data.
    #[error("Shapefile error: {0}")]
    Shapefile(#[from] shapefile::Error),

    /// Extracting to the temporary directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
