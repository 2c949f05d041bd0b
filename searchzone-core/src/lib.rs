//! Probabilistic search-area estimation over pedestrian road networks.
//!
//! The crate simulates where a walking subject is likely to be after a given
//! time, aggregates the simulations into a probability surface, partitions
//! that surface into search cells and finds the choke points a searcher has
//! to pass to cover a reachable area.

pub mod algo;
pub mod error;
pub mod loading;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod prelude;
pub mod routing;
pub mod simulation;

pub use error::Error;
pub use model::{RoadClass, RoadEdge, RoadGraph, RoadNode, TransitionWeights};

/// External (OSM) node identifier
pub type NodeId = i64;

/// Duration of one simulation step in seconds
pub const STEP_SECONDS: u32 = 30;

/// Probability that the walker stays in place during a step
pub const STALL_PROBABILITY: f64 = 0.5;

/// Population size of a regular simulation request
pub const DEFAULT_TRIALS: usize = 500;

/// Population size of one golden-time candidate batch
pub const GOLDEN_TIME_BATCH_TRIALS: usize = 300;

/// Maximum number of Voronoi generator points
pub const MAX_CLUSTERS: usize = 5;

/// Radius (metres) of the synthetic far vertices closing unbounded cells
pub const FAR_VERTEX_RADIUS: f64 = 3000.0;

/// Betweenness threshold above which an articulation point is reported
pub const CENTRALITY_THRESHOLD: f64 = 0.02;

/// Radius (metres) of the road network region around the origin
pub const DEFAULT_CLIP_RADIUS: f64 = 1000.0;
