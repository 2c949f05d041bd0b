use fixedbitset::FixedBitSet;
use hashbrown::{HashMap, HashSet};
use log::info;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rustworkx_core::centrality::betweenness_centrality;
use rustworkx_core::connectivity::articulation_points;

use crate::Error;
use crate::model::RoadGraph;

/// Graphs at least this large compute betweenness in parallel
const PARALLEL_THRESHOLD: usize = 50;

/// Cut vertex of the reachable network
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalNode {
    pub node: NodeIndex,
    /// Normalized betweenness centrality
    pub centrality: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CriticalityResult {
    /// Ordered by decreasing centrality
    pub critical: Vec<CriticalNode>,
    /// Nodes in the largest connected component that was analysed
    pub component_size: usize,
    /// Cut vertices before the centrality threshold was applied
    pub articulation_points: usize,
    pub threshold: f64,
}

impl CriticalityResult {
    fn empty(threshold: f64) -> Self {
        Self {
            critical: Vec::new(),
            component_size: 0,
            articulation_points: 0,
            threshold,
        }
    }
}

/// Finds articulation points of the largest connected part of the
/// undirected subnetwork induced by `reachable`, keeping those whose
/// betweenness centrality exceeds `threshold`
/// (see [`crate::CENTRALITY_THRESHOLD`]).
///
/// # Errors
///
/// Returns an error for unknown nodes or a non-finite threshold
pub fn critical_nodes(
    graph: &RoadGraph,
    reachable: &[NodeIndex],
    threshold: f64,
) -> Result<CriticalityResult, Error> {
    if !threshold.is_finite() {
        return Err(Error::InvalidParameter(format!(
            "Centrality threshold must be finite, got {threshold}"
        )));
    }

    let mut members = FixedBitSet::with_capacity(graph.node_count());
    for &node in reachable {
        graph.validate_node(node)?;
        members.insert(node.index());
    }

    let component = largest_component(graph, &members);
    if component.node_count() < 3 {
        return Ok(CriticalityResult {
            component_size: component.node_count(),
            ..CriticalityResult::empty(threshold)
        });
    }

    let centrality = betweenness_centrality(&component, false, true, PARALLEL_THRESHOLD);
    let cut_vertices = articulation_points(&component, None);

    let mut critical: Vec<CriticalNode> = cut_vertices
        .iter()
        .filter_map(|&local| {
            let score = centrality.get(local.index()).copied().flatten()?;
            (score > threshold).then(|| CriticalNode {
                node: component[local],
                centrality: score,
            })
        })
        .collect();
    critical.sort_by(|a, b| {
        b.centrality
            .total_cmp(&a.centrality)
            .then(a.node.cmp(&b.node))
    });

    info!(
        "{} of {} articulation points exceed centrality {threshold} ({} nodes analysed)",
        critical.len(),
        cut_vertices.len(),
        component.node_count()
    );

    Ok(CriticalityResult {
        critical,
        component_size: component.node_count(),
        articulation_points: cut_vertices.len(),
        threshold,
    })
}

/// Undirected graph of the largest connected component among `members`.
/// Node weights are the indices in the full road graph.
fn largest_component(graph: &RoadGraph, members: &FixedBitSet) -> UnGraph<NodeIndex, ()> {
    let nodes: Vec<NodeIndex> = members.ones().map(NodeIndex::new).collect();
    let local: HashMap<NodeIndex, usize> = nodes.iter().enumerate().map(|(i, &n)| (n, i)).collect();

    let mut pairs: HashSet<(usize, usize)> = HashSet::new();
    for &node in &nodes {
        for edge in graph.edges(node) {
            let target = edge.target();
            if target == node || !members.contains(target.index()) {
                continue;
            }
            let (a, b) = (local[&node], local[&target]);
            pairs.insert((a.min(b), a.max(b)));
        }
    }

    let mut components = UnionFind::<usize>::new(nodes.len());
    for &(a, b) in &pairs {
        components.union(a, b);
    }

    let mut sizes: HashMap<usize, usize> = HashMap::new();
    for i in 0..nodes.len() {
        *sizes.entry(components.find(i)).or_insert(0) += 1;
    }
    // Ties go to the component holding the lowest node index
    let Some(root) = (0..nodes.len())
        .map(|i| components.find(i))
        .max_by(|&a, &b| sizes[&a].cmp(&sizes[&b]).then(b.cmp(&a)))
    else {
        return UnGraph::default();
    };

    let mut component = UnGraph::<NodeIndex, ()>::default();
    let mut compact: HashMap<usize, NodeIndex> = HashMap::new();
    for (i, &node) in nodes.iter().enumerate() {
        if components.find(i) == root {
            compact.insert(i, component.add_node(node));
        }
    }

    let mut edges: Vec<(usize, usize)> = pairs
        .into_iter()
        .filter(|(a, _)| compact.contains_key(a))
        .collect();
    edges.sort_unstable();
    for (a, b) in edges {
        component.add_edge(compact[&a], compact[&b], ());
    }

    component
}
