#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Variable ordering, ranking, aggregation and summary statistics.
//!
//! Everything here is a pure function of an immutable dataset: selecting a
//! variable produces a fresh [`RankedView`](climate_map_ranking_models::RankedView)
//! and its [`SummaryStats`](climate_map_ranking_models::SummaryStats).

pub mod display;
pub mod rank;
pub mod stats;
pub mod variables;

pub use rank::rank;
pub use stats::summarize;
pub use variables::order_variables;
