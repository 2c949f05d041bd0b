use std::collections::VecDeque;

use fixedbitset::FixedBitSet;
use hashbrown::HashMap;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;

use crate::model::RoadGraph;

/// Breadth-first search tree rooted at one node.
///
/// Paths follow edge direction and are shortest by edge count. Neighbours
/// are expanded in ascending index order, so ties always resolve the same
/// way for a given graph.
#[derive(Debug, Clone)]
pub struct ShortestPathTree {
    start: NodeIndex,
    predecessors: HashMap<NodeIndex, NodeIndex>,
    visited: FixedBitSet,
}

impl ShortestPathTree {
    pub fn start(&self) -> NodeIndex {
        self.start
    }

    pub fn reaches(&self, node: NodeIndex) -> bool {
        self.visited.contains(node.index())
    }

    /// Number of nodes reachable from the root, root included
    pub fn reached_count(&self) -> usize {
        self.visited.count_ones(..)
    }

    /// Nodes from the root to `target`, both inclusive; `None` if
    /// `target` cannot be reached
    pub fn path_to(&self, target: NodeIndex) -> Option<Vec<NodeIndex>> {
        if !self.reaches(target) {
            return None;
        }

        let mut path = Vec::new();
        let mut current = target;
        while current != self.start {
            path.push(current);
            current = *self.predecessors.get(&current)?;
        }
        path.push(self.start);
        path.reverse();
        Some(path)
    }
}

/// Builds the BFS tree of `graph` rooted at `start`
pub fn bfs_tree(graph: &RoadGraph, start: NodeIndex) -> ShortestPathTree {
    let node_count = graph.node_count();
    let mut visited = FixedBitSet::with_capacity(node_count);
    let mut predecessors = HashMap::with_capacity(node_count.min(1024));
    let mut queue = VecDeque::new();
    let mut neighbors: Vec<NodeIndex> = Vec::new();

    if start.index() < node_count {
        visited.insert(start.index());
        queue.push_back(start);
    }

    while let Some(node) = queue.pop_front() {
        neighbors.clear();
        neighbors.extend(graph.edges(node).map(|edge| edge.target()));
        neighbors.sort_unstable();
        neighbors.dedup();

        for &next in &neighbors {
            if visited.put(next.index()) {
                continue;
            }
            predecessors.insert(next, node);
            queue.push_back(next);
        }
    }

    ShortestPathTree {
        start,
        predecessors,
        visited,
    }
}
