//! Pedestrian and street network model

pub mod components;
pub mod network;

pub use components::{RoadClass, RoadEdge, RoadNode};
pub use network::{IndexedPoint, RoadGraph};
