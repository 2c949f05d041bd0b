use geo::{Contains, Polygon};
use petgraph::graph::NodeIndex;

use crate::model::RoadGraph;

/// Nodes whose longitude/latitude lies strictly inside `area`, in index
/// order
pub fn reachable_nodes(graph: &RoadGraph, area: &Polygon<f64>) -> Vec<NodeIndex> {
    graph
        .node_indices()
        .filter(|&idx| {
            graph
                .node(idx)
                .is_some_and(|node| area.contains(&node.geometry))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{Point, polygon};
    use petgraph::graph::DiGraph;

    use super::*;
    use crate::model::{LocalProjection, RoadNode};

    #[test]
    fn keeps_nodes_inside_polygon() {
        let projection = LocalProjection::equirectangular(Point::new(127.0, 37.5));
        let mut graph = DiGraph::new();
        for (id, (lon, lat)) in [(127.0, 37.5), (127.003, 37.5), (127.02, 37.5)]
            .into_iter()
            .enumerate()
        {
            let geometry = Point::new(lon, lat);
            graph.add_node(RoadNode {
                id: id as i64,
                geometry,
                projected: projection.to_planar(&geometry),
            });
        }
        let graph = RoadGraph::new(graph, projection);
        let area = polygon![
            (x: 126.99, y: 37.49),
            (x: 127.01, y: 37.49),
            (x: 127.01, y: 37.51),
            (x: 126.99, y: 37.51),
        ];

        assert_eq!(
            reachable_nodes(&graph, &area),
            vec![NodeIndex::new(0), NodeIndex::new(1)]
        );
    }
}
