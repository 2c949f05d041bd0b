//! Structured reports for the visualization layer.
//!
//! Reports only carry geographic coordinates (longitude/latitude) and
//! serialize with serde; [`SimulationReport::to_geojson`] and
//! [`MandatoryReport::to_geojson`] export them as `GeoJSON`.

mod to_geojson;

use geo::{Coord, Point};
use petgraph::graph::NodeIndex;
use serde::Serialize;

use crate::algo::mandatory::{CriticalityResult, PathImportance};
use crate::algo::partition::PartitionOutcome;
use crate::model::RoadGraph;
use crate::simulation::FrequencyDistribution;
use crate::{Error, NodeId};

/// Road network node at a geographic position
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeMarker {
    pub node_id: NodeId,
    pub lat: f64,
    pub lon: f64,
}

impl NodeMarker {
    pub(crate) fn new(graph: &RoadGraph, node: NodeIndex) -> Result<Self, Error> {
        let road_node = graph.node(node).ok_or(Error::InvalidNodeIndex)?;
        Ok(Self {
            node_id: road_node.id,
            lat: road_node.geometry.y(),
            lon: road_node.geometry.x(),
        })
    }
}

/// Number of walks that ended on a node
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatPoint {
    #[serde(flatten)]
    pub location: NodeMarker,
    pub count: usize,
}

/// Search cell as a closed longitude/latitude ring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellRing {
    pub generator: usize,
    pub ring: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PartitionSummary {
    Cells {
        /// Generator points as `[lon, lat]`
        generators: Vec<[f64; 2]>,
        cells: Vec<CellRing>,
        /// Generators whose cell was dropped
        skipped: Vec<usize>,
    },
    InsufficientData {
        distinct: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationReport {
    pub origin: NodeMarker,
    pub requested_minutes: u32,
    /// Golden time, when one was searched for and found
    pub golden_time_minutes: Option<u32>,
    /// Time budget the heat map was simulated with
    pub simulated_minutes: u32,
    pub trials: usize,
    pub seed: u64,
    pub heat_points: Vec<HeatPoint>,
    pub most_visited: Option<HeatPoint>,
    pub partition: PartitionSummary,
}

/// Simulation parameters echoed in the report
#[derive(Debug, Clone, Copy)]
pub(crate) struct SimulationRun {
    pub requested_minutes: u32,
    pub golden_time_minutes: Option<u32>,
    pub simulated_minutes: u32,
    pub trials: usize,
    pub seed: u64,
}

impl SimulationReport {
    pub(crate) fn build(
        graph: &RoadGraph,
        start: NodeIndex,
        run: SimulationRun,
        distribution: &FrequencyDistribution,
        outcome: &PartitionOutcome,
    ) -> Result<Self, Error> {
        let heat_point = |(node, count): (NodeIndex, usize)| -> Result<HeatPoint, Error> {
            Ok(HeatPoint {
                location: NodeMarker::new(graph, node)?,
                count,
            })
        };

        let heat_points = distribution
            .sorted()
            .into_iter()
            .map(heat_point)
            .collect::<Result<Vec<_>, _>>()?;
        let most_visited = distribution.most_visited().map(heat_point).transpose()?;

        Ok(Self {
            origin: NodeMarker::new(graph, start)?,
            requested_minutes: run.requested_minutes,
            golden_time_minutes: run.golden_time_minutes,
            simulated_minutes: run.simulated_minutes,
            trials: run.trials,
            seed: run.seed,
            heat_points,
            most_visited,
            partition: PartitionSummary::new(graph, outcome),
        })
    }
}

impl PartitionSummary {
    fn new(graph: &RoadGraph, outcome: &PartitionOutcome) -> Self {
        let partition = match outcome {
            PartitionOutcome::Cells(partition) => partition,
            PartitionOutcome::InsufficientData { distinct } => {
                return Self::InsufficientData {
                    distinct: *distinct,
                };
            }
        };

        let projection = graph.projection();
        let to_lon_lat = |coord: Coord<f64>| {
            let point = projection.to_geographic(&Point::from(coord));
            [point.x(), point.y()]
        };

        Self::Cells {
            generators: partition
                .generators
                .iter()
                .map(|p| to_lon_lat(p.0))
                .collect(),
            cells: partition
                .cells
                .iter()
                .map(|cell| CellRing {
                    generator: cell.generator,
                    ring: cell
                        .polygon
                        .exterior()
                        .coords()
                        .map(|c| to_lon_lat(*c))
                        .collect(),
                })
                .collect(),
            skipped: partition.skipped.iter().map(|s| s.generator).collect(),
        }
    }
}

fn node_id(graph: &RoadGraph, node: NodeIndex) -> Result<NodeId, Error> {
    let road_node = graph.node(node).ok_or(Error::InvalidNodeIndex)?;
    Ok(road_node.id)
}

/// Node on at least one origin-to-area shortest path
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PathMarker {
    #[serde(flatten)]
    pub location: NodeMarker,
    pub count: usize,
    /// `count` relative to the busiest node
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CriticalMarker {
    #[serde(flatten)]
    pub location: NodeMarker,
    pub centrality: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum MandatoryFindings {
    PathFrequency {
        markers: Vec<PathMarker>,
        paths: usize,
        /// External ids of reachable nodes without a path from the origin
        unreachable: Vec<NodeId>,
    },
    Criticality {
        markers: Vec<CriticalMarker>,
        component_size: usize,
        articulation_points: usize,
        threshold: f64,
    },
}

impl MandatoryFindings {
    pub(crate) fn from_paths(
        graph: &RoadGraph,
        importance: &PathImportance,
    ) -> Result<Self, Error> {
        let markers = importance
            .sorted()
            .into_iter()
            .map(|(node, count)| {
                Ok(PathMarker {
                    location: NodeMarker::new(graph, node)?,
                    count,
                    weight: importance.normalized(node),
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;
        let unreachable = importance
            .unreachable()
            .iter()
            .map(|&node| node_id(graph, node))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::PathFrequency {
            markers,
            paths: importance.path_count(),
            unreachable,
        })
    }

    pub(crate) fn from_criticality(
        graph: &RoadGraph,
        result: &CriticalityResult,
    ) -> Result<Self, Error> {
        let markers = result
            .critical
            .iter()
            .map(|critical| {
                Ok(CriticalMarker {
                    location: NodeMarker::new(graph, critical.node)?,
                    centrality: critical.centrality,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        Ok(Self::Criticality {
            markers,
            component_size: result.component_size,
            articulation_points: result.articulation_points,
            threshold: result.threshold,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MandatoryReport {
    pub origin: NodeMarker,
    pub minutes: u32,
    /// Nodes inside the reachable area
    pub reachable_nodes: usize,
    pub findings: MandatoryFindings,
}
