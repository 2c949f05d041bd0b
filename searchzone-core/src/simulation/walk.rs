use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};

use super::WalkParameters;
use crate::model::RoadGraph;

/// Simulates one walk and returns the node where it ends.
///
/// Every step the walker either stalls (with `stall_probability`) or moves
/// to a neighbour chosen proportionally to the road-class weight of the
/// connecting edge. A node without outgoing edges ends the walk early.
pub fn simulate_walk<R: Rng + ?Sized>(
    graph: &RoadGraph,
    start: NodeIndex,
    params: &WalkParameters,
    rng: &mut R,
) -> NodeIndex {
    let mut current = start;
    let mut neighbors: Vec<NodeIndex> = Vec::new();
    let mut weights: Vec<f64> = Vec::new();

    for _ in 0..params.total_steps() {
        neighbors.clear();
        weights.clear();
        for edge in graph.edges(current) {
            neighbors.push(edge.target());
            weights.push(params.weights.weight(&edge.weight().road_class));
        }

        if neighbors.is_empty() {
            break;
        }

        if rng.r#gen::<f64>() < params.stall_probability {
            continue;
        }

        current = neighbors[sample_neighbor(&weights, rng)];
    }

    current
}

/// Index drawn proportionally to `weights`; uniform if the weights are
/// unusable (all zero or non-finite).
fn sample_neighbor<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    if weights.len() == 1 {
        return 0;
    }
    match WeightedIndex::new(weights) {
        Ok(distribution) => distribution.sample(rng),
        Err(_) => rng.gen_range(0..weights.len()),
    }
}
