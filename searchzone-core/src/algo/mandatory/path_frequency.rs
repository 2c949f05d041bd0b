use hashbrown::HashMap;
use log::{debug, info};
use petgraph::graph::NodeIndex;

use crate::Error;
use crate::model::RoadGraph;
use crate::routing::bfs_tree;

/// How many origin-to-target shortest paths pass through each node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathImportance {
    counts: HashMap<NodeIndex, usize>,
    paths: usize,
    unreachable: Vec<NodeIndex>,
}

impl PathImportance {
    /// Paths through `node`; zero for nodes on no path
    pub fn count(&self, node: NodeIndex) -> usize {
        self.counts.get(&node).copied().unwrap_or(0)
    }

    pub fn max_count(&self) -> usize {
        self.counts.values().copied().max().unwrap_or(0)
    }

    /// Count relative to the busiest node, in `[0, 1]`
    #[allow(clippy::cast_precision_loss)]
    pub fn normalized(&self, node: NodeIndex) -> f64 {
        match self.max_count() {
            0 => 0.0,
            max => self.count(node) as f64 / max as f64,
        }
    }

    /// Number of targets a path was found for
    pub fn path_count(&self) -> usize {
        self.paths
    }

    /// Targets without a path from the origin
    pub fn unreachable(&self) -> &[NodeIndex] {
        &self.unreachable
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Nodes on at least one path, ordered by index
    pub fn sorted(&self) -> Vec<(NodeIndex, usize)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(&n, &c)| (n, c)).collect();
        entries.sort_unstable_by_key(|(node, _)| *node);
        entries
    }
}

/// Counts, for every node, the shortest paths (by edge count) from `start`
/// to each of `targets` that include it.
///
/// Targets that cannot be reached along edge direction are skipped and
/// listed in [`PathImportance::unreachable`].
///
/// # Errors
///
/// Returns `Error::InvalidNodeIndex` if `start` is not in the graph
pub fn path_frequency(
    graph: &RoadGraph,
    start: NodeIndex,
    targets: &[NodeIndex],
) -> Result<PathImportance, Error> {
    graph.validate_node(start)?;
    let tree = bfs_tree(graph, start);

    let mut importance = PathImportance::default();
    for &target in targets {
        let Some(path) = tree.path_to(target) else {
            debug!("No path from {start:?} to {target:?}, skipping");
            importance.unreachable.push(target);
            continue;
        };
        importance.paths += 1;
        for node in path {
            *importance.counts.entry(node).or_insert(0) += 1;
        }
    }

    info!(
        "Traced {} paths through {} nodes ({} targets unreachable)",
        importance.paths,
        importance.counts.len(),
        importance.unreachable.len()
    );

    Ok(importance)
}
