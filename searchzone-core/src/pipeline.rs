//! Request pipelines of the two analysis modes.
//!
//! Both modes clip the road network to a region around the origin and snap
//! the origin to its nearest node before any analysis runs.

use geo::{Point, Polygon};
use log::info;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::algo::mandatory::{critical_nodes, path_frequency, reachable_nodes};
use crate::algo::partition::{PartitionConfig, partition};
use crate::model::{Demographics, Preference, RoadGraph};
use crate::output::{
    MandatoryFindings, MandatoryReport, NodeMarker, SimulationReport, SimulationRun,
};
use crate::simulation::{
    GoldenTimeConfig, TrialBudget, WalkParameters, estimate_golden_time, run_monte_carlo,
};
use crate::{CENTRALITY_THRESHOLD, DEFAULT_CLIP_RADIUS, DEFAULT_TRIALS, Error};

/// Who is walking and which roads they favour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProfile {
    #[serde(flatten)]
    pub demographics: Demographics,
    #[serde(default)]
    pub preference: Preference,
}

impl SearchProfile {
    pub fn walk_parameters(&self, minutes: u32) -> WalkParameters {
        WalkParameters::from_profile(&self.demographics, self.preference, minutes)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRequest {
    /// Last known position (lon, lat)
    pub origin: Point<f64>,
    pub profile: SearchProfile,
    pub minutes: u32,
    pub trials: usize,
    pub seed: u64,
    /// Search for the golden time and simulate with it when found
    pub golden_time: Option<GoldenTimeConfig>,
    pub partition: PartitionConfig,
    pub budget: TrialBudget,
    /// Radius of the road network region around the origin, in metres
    pub clip_radius: f64,
}

impl SimulationRequest {
    pub fn new(origin: Point<f64>, profile: SearchProfile, minutes: u32) -> Self {
        Self {
            origin,
            profile,
            minutes,
            trials: DEFAULT_TRIALS,
            seed: 0,
            golden_time: None,
            partition: PartitionConfig::default(),
            budget: TrialBudget::default(),
            clip_radius: DEFAULT_CLIP_RADIUS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MandatoryAlgorithm {
    #[default]
    PathFrequency,
    Criticality,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MandatoryRequest {
    /// Last known position (lon, lat)
    pub origin: Point<f64>,
    pub minutes: u32,
    /// Area reachable from the origin within `minutes`, in lon/lat
    pub area: Polygon<f64>,
    pub algorithm: MandatoryAlgorithm,
    pub centrality_threshold: f64,
    pub clip_radius: f64,
}

impl MandatoryRequest {
    pub fn new(origin: Point<f64>, minutes: u32, area: Polygon<f64>) -> Self {
        Self {
            origin,
            minutes,
            area,
            algorithm: MandatoryAlgorithm::default(),
            centrality_threshold: CENTRALITY_THRESHOLD,
            clip_radius: DEFAULT_CLIP_RADIUS,
        }
    }
}

/// Simulates where the subject may be and partitions the result into
/// search cells.
///
/// # Errors
///
/// Returns an error if the request exceeds its budget, the origin cannot be
/// snapped to the network or any parameter is invalid
pub fn run_simulation(
    graph: &RoadGraph,
    request: &SimulationRequest,
) -> Result<SimulationReport, Error> {
    let budget = &request.budget;
    budget.check(request.trials, request.minutes)?;
    if let Some(golden) = &request.golden_time {
        budget.check(golden.batch_trials, golden.max_minutes)?;
    }
    request.partition.validate()?;

    let (area, start) = local_network(graph, &request.origin, request.clip_radius)?;
    let params = request.profile.walk_parameters(request.minutes);
    params.validate()?;

    let golden_time_minutes = match &request.golden_time {
        Some(config) => estimate_golden_time(&area, start, &params, config, request.seed)?,
        None => None,
    };
    let minutes = golden_time_minutes.unwrap_or(request.minutes);

    let distribution = run_monte_carlo(
        &area,
        start,
        &params.with_minutes(minutes),
        request.trials,
        request.seed,
    )?;
    let outcome = partition(&distribution, &area, &request.partition)?;

    let run = SimulationRun {
        requested_minutes: request.minutes,
        golden_time_minutes,
        simulated_minutes: minutes,
        trials: request.trials,
        seed: request.seed,
    };
    SimulationReport::build(&area, start, run, &distribution, &outcome)
}

/// Finds the nodes a searcher is likely to pass to reach the area.
///
/// # Errors
///
/// Returns an error if the origin cannot be snapped to the network or the
/// threshold is invalid
pub fn run_mandatory(
    graph: &RoadGraph,
    request: &MandatoryRequest,
) -> Result<MandatoryReport, Error> {
    let (area, start) = local_network(graph, &request.origin, request.clip_radius)?;
    let reachable = reachable_nodes(&area, &request.area);
    info!(
        "{} of {} nodes lie inside the reachable area",
        reachable.len(),
        area.node_count()
    );

    let findings = match request.algorithm {
        MandatoryAlgorithm::PathFrequency => {
            let importance = path_frequency(&area, start, &reachable)?;
            MandatoryFindings::from_paths(&area, &importance)?
        }
        MandatoryAlgorithm::Criticality => {
            let result = critical_nodes(&area, &reachable, request.centrality_threshold)?;
            MandatoryFindings::from_criticality(&area, &result)?
        }
    };

    Ok(MandatoryReport {
        origin: NodeMarker::new(&area, start)?,
        minutes: request.minutes,
        reachable_nodes: reachable.len(),
        findings,
    })
}

/// Road network within `radius` of `origin` and the origin's node in it
fn local_network(
    graph: &RoadGraph,
    origin: &Point<f64>,
    radius: f64,
) -> Result<(RoadGraph, NodeIndex), Error> {
    if !radius.is_finite() || radius <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "Clip radius must be positive, got {radius}"
        )));
    }
    let area = graph.clip_to_radius(origin, radius);
    let start = area.snap(origin, radius)?;
    Ok((area, start))
}
