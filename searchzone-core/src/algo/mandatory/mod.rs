//! Nodes a searcher is likely to pass on the way from the origin to any
//! point of a reachable area.
//!
//! Two analyses share the reachable-node filter: counting how many
//! shortest paths run through each node, and finding cut vertices of the
//! reachable subnetwork with high betweenness centrality.

mod criticality;
mod path_frequency;
mod reachable;

pub use criticality::{CriticalNode, CriticalityResult, critical_nodes};
pub use path_frequency::{PathImportance, path_frequency};
pub use reachable::reachable_nodes;
