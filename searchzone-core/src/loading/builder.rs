use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use geo::Point;
use hashbrown::{HashMap, HashSet};
use log::{debug, info, warn};
use petgraph::graph::{DiGraph, NodeIndex};

use super::raw_types::{HighwayTag, RawNode, RawRoadGraph};
use crate::model::{LocalProjection, RoadEdge, RoadGraph, RoadNode};
use crate::{Error, NodeId};

/// Loads a road graph from a JSON file
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a
/// valid road network
pub fn load_road_graph(path: &Path) -> Result<RoadGraph, Error> {
    info!("Loading road network: {}", path.display());

    let file = File::open(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    let raw: RawRoadGraph = serde_json::from_reader(BufReader::new(file))?;
    road_graph_from_raw(raw)
}

/// Parses a road graph from a JSON string
///
/// # Errors
///
/// Returns an error if the JSON is malformed or the network is invalid
pub fn road_graph_from_str(json: &str) -> Result<RoadGraph, Error> {
    let raw: RawRoadGraph = serde_json::from_str(json)?;
    road_graph_from_raw(raw)
}

/// Builds the in-memory road graph.
///
/// Road-class tags are normalized here once, parallel edges keep the first
/// occurrence and edges referencing unknown nodes are dropped with a warning.
///
/// # Errors
///
/// Returns `Error::InvalidData` for empty graphs, duplicate node ids or
/// non-finite coordinates
pub fn road_graph_from_raw(raw: RawRoadGraph) -> Result<RoadGraph, Error> {
    validate_nodes(&raw.nodes)?;

    let projection = select_projection(&raw.nodes)?;
    let provider_projected = matches!(projection, LocalProjection::Affine { .. });

    let mut graph = DiGraph::with_capacity(raw.nodes.len(), raw.edges.len() * 2);
    let mut node_map: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(raw.nodes.len());

    for node in &raw.nodes {
        let geometry = Point::new(node.lon, node.lat);
        let projected = match (provider_projected, node.x, node.y) {
            (true, Some(x), Some(y)) => Point::new(x, y),
            _ => projection.to_planar(&geometry),
        };
        let idx = graph.add_node(RoadNode {
            id: node.id,
            geometry,
            projected,
        });
        node_map.insert(node.id, idx);
    }

    let mut seen: HashSet<(NodeIndex, NodeIndex)> = HashSet::with_capacity(raw.edges.len() * 2);
    let mut dangling = 0usize;
    let mut parallel = 0usize;

    for edge in &raw.edges {
        let endpoints = (node_map.get(&edge.source), node_map.get(&edge.target));
        let (Some(&source), Some(&target)) = endpoints else {
            dangling += 1;
            continue;
        };

        let road_edge = RoadEdge {
            road_class: HighwayTag::road_class(edge.highway.as_ref()),
            length: edge.length,
        };

        let mut directions = vec![(source, target)];
        if !raw.directed && source != target {
            directions.push((target, source));
        }
        for (a, b) in directions {
            if seen.insert((a, b)) {
                graph.add_edge(a, b, road_edge.clone());
            } else {
                parallel += 1;
            }
        }
    }

    if dangling > 0 {
        warn!("{dangling} edges reference unknown nodes and were skipped");
    }
    if parallel > 0 {
        debug!("{parallel} parallel edges ignored, first occurrence kept");
    }

    info!(
        "Road network ready: {} nodes, {} edges",
        graph.node_count(),
        graph.edge_count()
    );

    Ok(RoadGraph::new(graph, projection))
}

fn validate_nodes(nodes: &[RawNode]) -> Result<(), Error> {
    if nodes.is_empty() {
        return Err(Error::InvalidData(
            "Road network contains no nodes".to_string(),
        ));
    }

    let mut ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(node.id) {
            return Err(Error::InvalidData(format!("Duplicate node id {}", node.id)));
        }
        if !node.lon.is_finite() || !node.lat.is_finite() {
            return Err(Error::InvalidData(format!(
                "Node {} has invalid coordinates",
                node.id
            )));
        }
    }

    Ok(())
}

/// Provider coordinates are used only when every node carries them
fn select_projection(nodes: &[RawNode]) -> Result<LocalProjection, Error> {
    let projected = nodes
        .iter()
        .filter(|n| has_projected(n))
        .count();

    if projected == nodes.len() && nodes.len() >= 3 {
        let pairs: Vec<_> = nodes
            .iter()
            .filter_map(|n| Some((Point::new(n.lon, n.lat), Point::new(n.x?, n.y?))))
            .collect();
        return LocalProjection::fit_affine(&pairs);
    }

    if projected > 0 {
        warn!(
            "{projected} of {} nodes carry projected coordinates; projecting all nodes locally",
            nodes.len()
        );
    }

    Ok(LocalProjection::centered_on(
        nodes.iter().map(|n| Point::new(n.lon, n.lat)),
    ))
}

fn has_projected(node: &RawNode) -> bool {
    node.x.is_some_and(f64::is_finite) && node.y.is_some_and(f64::is_finite)
}
