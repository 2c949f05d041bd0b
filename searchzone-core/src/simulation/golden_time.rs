use log::{debug, info};
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{WalkParameters, run_monte_carlo};
use crate::model::RoadGraph;
use crate::{Error, GOLDEN_TIME_BATCH_TRIALS};

/// Search capacity and candidate schedule of the golden-time search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldenTimeConfig {
    pub searchers: usize,
    /// Nodes one searcher can cover
    pub capacity_per_searcher: usize,
    pub max_minutes: u32,
    pub step_minutes: u32,
    /// Trials per candidate
    pub batch_trials: usize,
}

impl Default for GoldenTimeConfig {
    fn default() -> Self {
        Self {
            searchers: 3,
            capacity_per_searcher: 20,
            max_minutes: 180,
            step_minutes: 10,
            batch_trials: GOLDEN_TIME_BATCH_TRIALS,
        }
    }
}

impl GoldenTimeConfig {
    pub fn capacity_threshold(&self) -> usize {
        self.searchers.saturating_mul(self.capacity_per_searcher)
    }
}

/// Finds the shortest elapsed time at which walkers spread over more nodes
/// than the searchers can cover.
///
/// Candidates `step, 2*step, ..` up to `max_minutes` are tried in order and
/// the first one whose batch ends on more than
/// [`GoldenTimeConfig::capacity_threshold`] distinct nodes is returned.
/// `None` means the capacity is never exceeded within `max_minutes`.
///
/// # Errors
///
/// Returns `Error::InvalidParameter` if the step is zero or the batch is
/// empty, and propagates simulation errors
pub fn estimate_golden_time(
    graph: &RoadGraph,
    start: NodeIndex,
    params: &WalkParameters,
    config: &GoldenTimeConfig,
    seed: u64,
) -> Result<Option<u32>, Error> {
    if config.step_minutes == 0 {
        return Err(Error::InvalidParameter(
            "Golden-time step must be positive".to_string(),
        ));
    }
    if config.batch_trials == 0 {
        return Err(Error::InvalidParameter(
            "Golden-time batch must contain at least one trial".to_string(),
        ));
    }
    graph.validate_node(start)?;

    let threshold = config.capacity_threshold();
    let mut master = StdRng::seed_from_u64(seed);

    let step = config.step_minutes as usize;
    for minutes in (config.step_minutes..=config.max_minutes).step_by(step) {
        let candidate = params.with_minutes(minutes);
        let batch = run_monte_carlo(
            graph,
            start,
            &candidate,
            config.batch_trials,
            master.r#gen::<u64>(),
        )?;
        let spread = batch.distinct_nodes();
        debug!("Golden time candidate {minutes} min: {spread} distinct nodes");

        if spread > threshold {
            info!("Golden time is {minutes} min ({spread} nodes > capacity {threshold})");
            return Ok(Some(minutes));
        }
    }

    info!(
        "Capacity of {threshold} nodes not exceeded within {} min",
        config.max_minutes
    );
    Ok(None)
}

#[cfg(test)]
mod tests {
    use geo::Point;
    use petgraph::graph::DiGraph;

    use super::*;
    use crate::model::{LocalProjection, RoadClass, RoadEdge, RoadNode, TransitionWeights};

    /// Bidirectional chain of `len` nodes spaced 40 m apart
    fn chain(len: usize) -> RoadGraph {
        let projection = LocalProjection::equirectangular(Point::new(126.9, 37.4));
        let mut graph = DiGraph::new();
        let nodes: Vec<_> = (0..len)
            .map(|i| {
                let projected = Point::new(i as f64 * 40.0, 0.0);
                graph.add_node(RoadNode {
                    id: i as i64,
                    geometry: projection.to_geographic(&projected),
                    projected,
                })
            })
            .collect();
        for pair in nodes.windows(2) {
            let edge = RoadEdge {
                road_class: RoadClass::Path,
                length: 40.0,
            };
            graph.add_edge(pair[0], pair[1], edge.clone());
            graph.add_edge(pair[1], pair[0], edge);
        }
        RoadGraph::new(graph, projection)
    }

    fn config(threshold: usize) -> GoldenTimeConfig {
        GoldenTimeConfig {
            searchers: 1,
            capacity_per_searcher: threshold,
            ..GoldenTimeConfig::default()
        }
    }

    #[test]
    fn zero_capacity_returns_first_candidate() {
        let graph = chain(10);
        let params = WalkParameters::new(1.0, 60, TransitionWeights::default());
        let golden = estimate_golden_time(&graph, NodeIndex::new(5), &params, &config(0), 1);
        assert_eq!(golden.unwrap(), Some(10));
    }

    #[test]
    fn capacity_above_node_count_returns_none() {
        let graph = chain(10);
        let params = WalkParameters::new(1.0, 60, TransitionWeights::default());
        let mut cfg = config(11);
        cfg.max_minutes = 40;
        let golden = estimate_golden_time(&graph, NodeIndex::new(5), &params, &cfg, 1);
        assert_eq!(golden.unwrap(), None);
    }

    #[test]
    fn zero_step_is_rejected() {
        let graph = chain(3);
        let params = WalkParameters::new(1.0, 60, TransitionWeights::default());
        let cfg = GoldenTimeConfig {
            step_minutes: 0,
            ..GoldenTimeConfig::default()
        };
        assert!(matches!(
            estimate_golden_time(&graph, NodeIndex::new(0), &params, &cfg, 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn default_threshold_is_sixty_nodes() {
        assert_eq!(GoldenTimeConfig::default().capacity_threshold(), 60);
    }

    #[test]
    fn oversized_capacity_saturates() {
        let cfg = GoldenTimeConfig {
            searchers: usize::MAX,
            capacity_per_searcher: 2,
            ..GoldenTimeConfig::default()
        };
        assert_eq!(cfg.capacity_threshold(), usize::MAX);
    }
}
