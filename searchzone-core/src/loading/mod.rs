//! This module is responsible for loading externally supplied inputs: the
//! road network produced by the graph provider and reachable-area polygons
//! produced by an isochrone provider.

mod area;
mod builder;
pub mod raw_types;

pub use area::{load_reachable_area, reachable_area_from_geojson};
pub use builder::{load_road_graph, road_graph_from_raw, road_graph_from_str};
