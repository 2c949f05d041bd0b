use hashbrown::HashMap;
use log::info;
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use super::{WalkParameters, simulate_walk};
use crate::Error;
use crate::model::RoadGraph;

/// Upper bounds on the work one request may ask for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialBudget {
    pub max_trials: usize,
    pub max_minutes: u32,
}

impl Default for TrialBudget {
    fn default() -> Self {
        Self {
            max_trials: 20_000,
            max_minutes: 24 * 60,
        }
    }
}

impl TrialBudget {
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the request exceeds the budget
    pub fn check(&self, trials: usize, minutes: u32) -> Result<(), Error> {
        if trials == 0 || trials > self.max_trials {
            return Err(Error::InvalidParameter(format!(
                "Trial count must be within 1..={}, got {trials}",
                self.max_trials
            )));
        }
        if minutes > self.max_minutes {
            return Err(Error::InvalidParameter(format!(
                "Time budget of {minutes} min exceeds the limit of {} min",
                self.max_minutes
            )));
        }
        Ok(())
    }
}

/// Number of walks that ended on each node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyDistribution {
    counts: HashMap<NodeIndex, usize>,
}

impl FrequencyDistribution {
    pub fn from_counts(counts: HashMap<NodeIndex, usize>) -> Self {
        Self { counts }
    }

    /// Number of walks ending on `node`
    pub fn count(&self, node: NodeIndex) -> usize {
        self.counts.get(&node).copied().unwrap_or(0)
    }

    /// Total number of walks; equals the population size
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn distinct_nodes(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn probability(&self, node: NodeIndex) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.count(node) as f64 / total as f64
        }
    }

    /// Node with the highest count; ties go to the lowest node index
    pub fn most_visited(&self) -> Option<(NodeIndex, usize)> {
        self.counts
            .iter()
            .map(|(&node, &count)| (node, count))
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, usize)> + '_ {
        self.counts.iter().map(|(&node, &count)| (node, count))
    }

    /// Entries ordered by node index
    pub fn sorted(&self) -> Vec<(NodeIndex, usize)> {
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_unstable_by_key(|(node, _)| *node);
        entries
    }

    fn merge(mut self, other: Self) -> Self {
        for (node, count) in other.counts {
            *self.counts.entry(node).or_insert(0) += count;
        }
        self
    }
}

/// Runs `trials` independent walks from `start` in parallel.
///
/// A master generator seeded with `seed` hands every trial its own seed, so
/// the result does not depend on how rayon schedules the work.
///
/// # Errors
///
/// Returns an error if `start` is not a node of `graph` or the parameters
/// are invalid
pub fn run_monte_carlo(
    graph: &RoadGraph,
    start: NodeIndex,
    params: &WalkParameters,
    trials: usize,
    seed: u64,
) -> Result<FrequencyDistribution, Error> {
    graph.validate_node(start)?;
    params.validate()?;

    let seeds = trial_seeds(seed, trials);

    let distribution = seeds
        .par_iter()
        .fold(FrequencyDistribution::default, |mut partial, &trial_seed| {
            let mut rng = StdRng::seed_from_u64(trial_seed);
            let terminal = simulate_walk(graph, start, params, &mut rng);
            *partial.counts.entry(terminal).or_insert(0) += 1;
            partial
        })
        .reduce(FrequencyDistribution::default, FrequencyDistribution::merge);

    info!(
        "Simulated {trials} walks of {} min ({} steps): {} distinct end nodes",
        params.minutes,
        params.total_steps(),
        distribution.distinct_nodes()
    );

    Ok(distribution)
}

fn trial_seeds(seed: u64, trials: usize) -> Vec<u64> {
    let mut master = StdRng::seed_from_u64(seed);
    (0..trials).map(|_| master.r#gen::<u64>()).collect()
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use petgraph::graph::DiGraph;

    use super::*;
    use crate::model::{LocalProjection, RoadClass, RoadEdge, RoadNode, TransitionWeights};

    fn grid(size: u32) -> RoadGraph {
        let projection = LocalProjection::equirectangular(Point::new(127.0, 37.5));
        let mut graph = DiGraph::new();
        let mut ids = Vec::new();
        for row in 0..size {
            for col in 0..size {
                let projected = Point::new(f64::from(col) * 50.0, f64::from(row) * 50.0);
                ids.push(graph.add_node(RoadNode {
                    id: i64::from(row * size + col),
                    geometry: projection.to_geographic(&projected),
                    projected,
                }));
            }
        }
        let edge = RoadEdge {
            road_class: RoadClass::Footway,
            length: 50.0,
        };
        for row in 0..size {
            for col in 0..size {
                let here = ids[(row * size + col) as usize];
                if col + 1 < size {
                    let right = ids[(row * size + col + 1) as usize];
                    graph.add_edge(here, right, edge.clone());
                    graph.add_edge(right, here, edge.clone());
                }
                if row + 1 < size {
                    let down = ids[((row + 1) * size + col) as usize];
                    graph.add_edge(here, down, edge.clone());
                    graph.add_edge(down, here, edge.clone());
                }
            }
        }
        RoadGraph::new(graph, projection)
    }

    #[test]
    fn counts_sum_to_population() {
        let graph = grid(6);
        let params = WalkParameters::new(1.0, 15, TransitionWeights::default());
        for trials in [1, 17, 500] {
            let dist = run_monte_carlo(&graph, NodeIndex::new(14), &params, trials, 9).unwrap();
            assert_eq!(dist.total(), trials);
        }
    }

    #[test]
    fn fixed_seed_is_reproducible() {
        let graph = grid(5);
        let params = WalkParameters::new(1.2, 20, TransitionWeights::nature_preferring());
        let a = run_monte_carlo(&graph, NodeIndex::new(12), &params, 300, 123).unwrap();
        let b = run_monte_carlo(&graph, NodeIndex::new(12), &params, 300, 123).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn isolated_start_collapses_onto_itself() {
        let projection = LocalProjection::equirectangular(Point::new(0.0, 0.0));
        let mut graph = DiGraph::new();
        let lone = graph.add_node(RoadNode {
            id: 1,
            geometry: Point::new(0.0, 0.0),
            projected: Point::new(0.0, 0.0),
        });
        let graph = RoadGraph::new(graph, projection);
        let params = WalkParameters::new(1.0, 30, TransitionWeights::default());
        let dist = run_monte_carlo(&graph, lone, &params, 50, 0).unwrap();
        assert_eq!(dist.count(lone), 50);
        assert_eq!(dist.most_visited(), Some((lone, 50)));
        assert!((dist.probability(lone) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_start_is_rejected() {
        let graph = grid(2);
        let params = WalkParameters::new(1.0, 5, TransitionWeights::default());
        assert!(matches!(
            run_monte_carlo(&graph, NodeIndex::new(99), &params, 10, 0),
            Err(Error::InvalidNodeIndex)
        ));
    }

    #[test]
    fn budget_limits_trials_and_minutes() {
        let budget = TrialBudget {
            max_trials: 1000,
            max_minutes: 120,
        };
        assert!(budget.check(500, 60).is_ok());
        assert!(budget.check(0, 60).is_err());
        assert!(budget.check(1001, 60).is_err());
        assert!(budget.check(500, 121).is_err());
    }

    #[test]
    fn most_visited_breaks_ties_by_index() {
        let mut counts = HashMap::new();
        counts.insert(NodeIndex::new(4), 3);
        counts.insert(NodeIndex::new(2), 3);
        counts.insert(NodeIndex::new(7), 1);
        let dist = FrequencyDistribution::from_counts(counts);
        assert_eq!(dist.most_visited(), Some((NodeIndex::new(2), 3)));
        assert_eq!(dist.sorted().first().map(|e| e.0), Some(NodeIndex::new(2)));
    }
}
