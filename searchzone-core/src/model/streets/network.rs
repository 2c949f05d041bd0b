//! Road network graph with spatial index

use std::fmt;

use geo::Point;
use hashbrown::HashMap;
use log::debug;
use petgraph::Directed;
use petgraph::graph::{DiGraph, Edges, NodeIndex};
use petgraph::visit::EdgeRef;
use rstar::RTree;
use rstar::primitives::GeomWithData;

use super::components::{RoadEdge, RoadNode};
use crate::model::LocalProjection;
use crate::{Error, NodeId};

/// Planar node position stored in the R-tree
pub type IndexedPoint = GeomWithData<[f64; 2], NodeIndex>;

/// Read-only pedestrian road network.
///
/// Edges are directed; undirected sources are stored with both directions.
/// At most one edge is kept per ordered node pair.
#[derive(Clone)]
pub struct RoadGraph {
    pub(crate) graph: DiGraph<RoadNode, RoadEdge>,
    pub(crate) rtree: RTree<IndexedPoint>,
    projection: LocalProjection,
    id_index: HashMap<NodeId, NodeIndex>,
}

impl RoadGraph {
    pub fn new(graph: DiGraph<RoadNode, RoadEdge>, projection: LocalProjection) -> Self {
        let rtree = build_rtree(&graph);
        let id_index = graph
            .node_indices()
            .map(|idx| (graph[idx].id, idx))
            .collect();

        Self {
            graph,
            rtree,
            projection,
            id_index,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn projection(&self) -> &LocalProjection {
        &self.projection
    }

    pub fn node(&self, node: NodeIndex) -> Option<&RoadNode> {
        self.graph.node_weight(node)
    }

    pub fn node_indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Graph index of an external node id
    pub fn node_index(&self, id: NodeId) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Outgoing edges of `node`
    pub fn edges(&self, node: NodeIndex) -> Edges<'_, RoadEdge, Directed> {
        self.graph.edges(node)
    }

    /// Check if such node exists
    pub fn validate_node(&self, node: NodeIndex) -> Result<(), Error> {
        if node.index() < self.graph.node_count() {
            Ok(())
        } else {
            Err(Error::InvalidNodeIndex)
        }
    }

    /// Planar coordinates of a node in metres
    pub fn planar(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.graph.node_weight(node).map(|n| n.projected)
    }

    /// Geographic coordinates (lon, lat) of a node
    pub fn geographic(&self, node: NodeIndex) -> Option<Point<f64>> {
        self.graph.node_weight(node).map(|n| n.geometry)
    }

    /// Nearest node to a geographic point and its planar distance in metres
    pub fn nearest_node(&self, point: &Point<f64>) -> Option<(NodeIndex, f64)> {
        let planar = self.projection.to_planar(point);
        let query = [planar.x(), planar.y()];
        self.rtree.nearest_neighbor(&query).map(|found| {
            let [x, y] = *found.geom();
            (found.data, (x - query[0]).hypot(y - query[1]))
        })
    }

    /// Snaps a geographic point to the road network.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoPointsFound` if the graph is empty or the nearest
    /// node is farther than `max_distance` metres.
    pub fn snap(&self, point: &Point<f64>, max_distance: f64) -> Result<NodeIndex, Error> {
        match self.nearest_node(point) {
            Some((node, distance)) if distance <= max_distance => Ok(node),
            Some((_, distance)) => {
                debug!("Nearest node is {distance:.1} m away (max: {max_distance:.1} m)");
                Err(Error::NoPointsFound)
            }
            None => Err(Error::NoPointsFound),
        }
    }

    /// Extracts the subgraph of nodes within `radius` metres of `center`.
    ///
    /// The planar frame of the source graph is kept so coordinates of both
    /// graphs stay comparable.
    pub fn clip_to_radius(&self, center: &Point<f64>, radius: f64) -> RoadGraph {
        let planar = self.projection.to_planar(center);
        let inside = self
            .rtree
            .locate_within_distance([planar.x(), planar.y()], radius * radius)
            .map(|p| p.data);

        let mut clipped = DiGraph::new();
        let mut mapping: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut kept: Vec<NodeIndex> = inside.collect();
        kept.sort_unstable();
        for old in kept {
            mapping.insert(old, clipped.add_node(self.graph[old].clone()));
        }

        for edge in self.graph.edge_references() {
            let endpoints = (mapping.get(&edge.source()), mapping.get(&edge.target()));
            if let (Some(&a), Some(&b)) = endpoints {
                clipped.add_edge(a, b, edge.weight().clone());
            }
        }

        debug!(
            "Clipped road graph to {} of {} nodes within {radius:.0} m",
            clipped.node_count(),
            self.graph.node_count()
        );

        RoadGraph::new(clipped, self.projection.clone())
    }
}

impl fmt::Debug for RoadGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoadGraph")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("projection", &self.projection)
            .finish_non_exhaustive()
    }
}

pub(crate) fn build_rtree(graph: &DiGraph<RoadNode, RoadEdge>) -> RTree<IndexedPoint> {
    let points = graph
        .node_indices()
        .map(|idx| {
            let p = graph[idx].projected;
            IndexedPoint::new([p.x(), p.y()], idx)
        })
        .collect();
    RTree::bulk_load(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RoadClass;

    fn line_graph() -> RoadGraph {
        let projection = LocalProjection::equirectangular(Point::new(127.0, 37.5));
        let mut graph = DiGraph::new();
        let nodes: Vec<_> = (0..4)
            .map(|i| {
                let projected = Point::new(f64::from(i) * 400.0, 0.0);
                graph.add_node(RoadNode {
                    id: 100 + i64::from(i),
                    geometry: projection.to_geographic(&projected),
                    projected,
                })
            })
            .collect();
        for pair in nodes.windows(2) {
            let edge = RoadEdge {
                road_class: RoadClass::Footway,
                length: 400.0,
            };
            graph.add_edge(pair[0], pair[1], edge.clone());
            graph.add_edge(pair[1], pair[0], edge);
        }
        RoadGraph::new(graph, projection)
    }

    #[test]
    fn nearest_node_uses_planar_distance() {
        let graph = line_graph();
        let query = graph
            .projection()
            .to_geographic(&Point::new(850.0, 30.0));
        let (node, distance) = graph.nearest_node(&query).unwrap();
        assert_eq!(graph.node(node).unwrap().id, 102);
        assert!((distance - 58.3).abs() < 0.5);
        assert!(graph.snap(&query, 10.0).is_err());
        assert_eq!(graph.snap(&query, 100.0).unwrap(), node);
    }

    #[test]
    fn clip_keeps_only_nodes_inside_radius() {
        let graph = line_graph();
        let center = graph.projection().to_geographic(&Point::new(0.0, 0.0));
        let clipped = graph.clip_to_radius(&center, 500.0);
        assert_eq!(clipped.node_count(), 2);
        assert_eq!(clipped.edge_count(), 2);
        assert!(clipped.node_index(100).is_some());
        assert!(clipped.node_index(102).is_none());
    }

    #[test]
    fn validate_node_rejects_out_of_range() {
        let graph = line_graph();
        assert!(graph.validate_node(NodeIndex::new(3)).is_ok());
        assert!(matches!(
            graph.validate_node(NodeIndex::new(4)),
            Err(Error::InvalidNodeIndex)
        ));
    }
}
