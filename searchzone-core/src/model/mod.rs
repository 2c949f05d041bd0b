//! Data model for pedestrian search-area estimation
//!
//! Contains the road network and the walker profile the simulation runs on.

pub mod profile;
pub mod projection;
pub mod streets;

pub use profile::{AgeGroup, Demographics, Gender, Preference, TransitionWeights};
pub use projection::LocalProjection;
pub use streets::network::RoadGraph;
pub use streets::{RoadClass, RoadEdge, RoadNode};
