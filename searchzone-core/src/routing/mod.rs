//! Unweighted shortest paths over the road network

mod bfs;

pub use bfs::{ShortestPathTree, bfs_tree};
