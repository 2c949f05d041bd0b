//! Spatial partition of a walk distribution into search sectors.
//!
//! End points of the walks are clustered into a few generator points and
//! every generator receives a finite Voronoi cell. All geometry here is in
//! the graph's planar coordinates (metres).

mod kmeans;
mod voronoi;

use geo::{Area, Coord, LineString, Point, Polygon, Validation};
use hashbrown::HashMap;
use log::{info, warn};

use crate::model::RoadGraph;
use crate::simulation::FrequencyDistribution;
use crate::{Error, FAR_VERTEX_RADIUS, MAX_CLUSTERS};

/// Fewest distinct end points a partition is attempted for
pub const MIN_DISTINCT_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansConfig {
    pub restarts: usize,
    pub max_iterations: usize,
    /// Largest centroid movement (metres) still counted as converged
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            restarts: 10,
            max_iterations: 300,
            tolerance: 1e-4,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PartitionConfig {
    pub max_clusters: usize,
    /// Distance at which unbounded cells are closed
    pub far_vertex_radius: f64,
    pub kmeans: KMeansConfig,
}

impl Default for PartitionConfig {
    fn default() -> Self {
        Self {
            max_clusters: MAX_CLUSTERS,
            far_vertex_radius: FAR_VERTEX_RADIUS,
            kmeans: KMeansConfig::default(),
        }
    }
}

impl PartitionConfig {
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` for fewer than three clusters or a
    /// non-positive closing radius
    pub fn validate(&self) -> Result<(), Error> {
        if self.max_clusters < MIN_DISTINCT_POINTS {
            return Err(Error::InvalidParameter(format!(
                "At least {MIN_DISTINCT_POINTS} clusters are required, got {}",
                self.max_clusters
            )));
        }
        if !self.far_vertex_radius.is_finite() || self.far_vertex_radius <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "Far vertex radius must be positive, got {}",
                self.far_vertex_radius
            )));
        }
        Ok(())
    }
}

/// Finite cell around one generator
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    /// Index into [`Partition::generators`]
    pub generator: usize,
    /// Counter-clockwise, in planar coordinates
    pub polygon: Polygon<f64>,
}

/// Generator whose cell could not be closed into a valid polygon
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCell {
    pub generator: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    pub generators: Vec<Point<f64>>,
    pub cells: Vec<Cell>,
    pub skipped: Vec<SkippedCell>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartitionOutcome {
    Cells(Partition),
    /// Too few distinct end points to cluster
    InsufficientData { distinct: usize },
}

impl PartitionOutcome {
    pub fn partition(&self) -> Option<&Partition> {
        match self {
            PartitionOutcome::Cells(partition) => Some(partition),
            PartitionOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Splits the walk distribution into at most `config.max_clusters` cells.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the distribution
/// refers to nodes missing from `graph`
pub fn partition(
    distribution: &FrequencyDistribution,
    graph: &RoadGraph,
    config: &PartitionConfig,
) -> Result<PartitionOutcome, Error> {
    config.validate()?;

    let samples = weighted_samples(distribution, graph)?;
    let distinct = samples.len();
    if distinct < MIN_DISTINCT_POINTS {
        info!("Only {distinct} distinct end points, skipping partition");
        return Ok(PartitionOutcome::InsufficientData { distinct });
    }

    let k = config.max_clusters.min(distinct);
    let mut generators: Vec<Coord<f64>> = Vec::with_capacity(k);
    for centroid in kmeans::weighted_kmeans(&samples, k, &config.kmeans) {
        if !generators.contains(&centroid) {
            generators.push(centroid);
        }
    }
    if generators.len() < 2 {
        return Ok(PartitionOutcome::InsufficientData { distinct });
    }

    let mut cells = Vec::with_capacity(generators.len());
    let mut skipped = Vec::new();
    for (generator, vertices) in voronoi::finite_cells(&generators, config.far_vertex_radius)
        .into_iter()
        .enumerate()
    {
        match close_cell(vertices) {
            Ok(polygon) => cells.push(Cell { generator, polygon }),
            Err(reason) => {
                warn!("Dropping cell of generator {generator}: {reason}");
                skipped.push(SkippedCell { generator, reason });
            }
        }
    }

    info!(
        "Partitioned {distinct} end points into {} cells ({} skipped)",
        cells.len(),
        skipped.len()
    );

    Ok(PartitionOutcome::Cells(Partition {
        generators: generators.into_iter().map(Point::from).collect(),
        cells,
        skipped,
    }))
}

/// Distinct planar end points weighted by how many walks ended there
#[allow(clippy::cast_precision_loss)]
fn weighted_samples(
    distribution: &FrequencyDistribution,
    graph: &RoadGraph,
) -> Result<Vec<kmeans::WeightedPoint>, Error> {
    let mut samples: Vec<kmeans::WeightedPoint> = Vec::new();
    let mut seen: HashMap<(u64, u64), usize> = HashMap::new();

    for (node, count) in distribution.sorted() {
        let point = graph.planar(node).ok_or(Error::InvalidNodeIndex)?;
        let key = (point.x().to_bits(), point.y().to_bits());
        match seen.get(&key) {
            Some(&slot) => samples[slot].1 += count as f64,
            None => {
                seen.insert(key, samples.len());
                samples.push((point.0, count as f64));
            }
        }
    }

    Ok(samples)
}

fn close_cell(vertices: Vec<Coord<f64>>) -> Result<Polygon<f64>, String> {
    if vertices.len() < 3 {
        return Err(format!("only {} vertices", vertices.len()));
    }

    let center = voronoi::mean(&vertices);
    let mut ring = vertices;
    ring.sort_by(|a, b| {
        let angle = |c: &Coord<f64>| (c.y - center.y).atan2(c.x - center.x);
        angle(a).total_cmp(&angle(b))
    });

    let polygon = Polygon::new(LineString::from(ring), vec![]);
    if !polygon.is_valid() {
        return Err("polygon is not valid".to_string());
    }
    if polygon.unsigned_area() <= f64::EPSILON {
        return Err("polygon has no area".to_string());
    }
    Ok(polygon)
}

#[cfg(test)]
mod tests {
    use geo::{Contains, Point};
    use petgraph::graph::{DiGraph, NodeIndex};

    use super::*;
    use crate::model::{LocalProjection, RoadNode};

    fn graph_with(points: &[(f64, f64)]) -> RoadGraph {
        let projection = LocalProjection::equirectangular(Point::new(127.0, 37.5));
        let mut graph = DiGraph::new();
        for (i, &(x, y)) in points.iter().enumerate() {
            let projected = Point::new(x, y);
            graph.add_node(RoadNode {
                id: i as i64,
                geometry: projection.to_geographic(&projected),
                projected,
            });
        }
        RoadGraph::new(graph, projection)
    }

    fn distribution(counts: &[(usize, usize)]) -> FrequencyDistribution {
        FrequencyDistribution::from_counts(
            counts
                .iter()
                .map(|&(node, count)| (NodeIndex::new(node), count))
                .collect(),
        )
    }

    #[test]
    fn two_distinct_points_are_insufficient() {
        // nodes 0 and 2 share a position
        let graph = graph_with(&[(0.0, 0.0), (50.0, 0.0), (0.0, 0.0)]);
        let dist = distribution(&[(0, 10), (1, 5), (2, 7)]);
        let outcome = partition(&dist, &graph, &PartitionConfig::default()).unwrap();
        assert_eq!(outcome, PartitionOutcome::InsufficientData { distinct: 2 });
    }

    #[test]
    fn generator_count_is_capped() {
        let positions: Vec<(f64, f64)> = (0..12)
            .map(|i| {
                let angle = f64::from(i) * 0.5;
                (angle.cos() * 200.0 + f64::from(i) * 13.0, angle.sin() * 150.0)
            })
            .collect();
        let graph = graph_with(&positions);
        let dist = distribution(&(0..12).map(|i| (i, i + 1)).collect::<Vec<_>>());

        let outcome = partition(&dist, &graph, &PartitionConfig::default()).unwrap();
        let partition = outcome.partition().unwrap();
        assert_eq!(partition.generators.len(), 5);
        assert_eq!(partition.cells.len() + partition.skipped.len(), 5);
        for cell in &partition.cells {
            assert!(cell.polygon.exterior().0.len() >= 4);
            assert!(cell.polygon.is_valid());
        }
    }

    #[test]
    fn three_points_give_three_cells_containing_their_generators() {
        let graph = graph_with(&[(0.0, 0.0), (300.0, 0.0), (0.0, 300.0)]);
        let dist = distribution(&[(0, 4), (1, 4), (2, 4)]);
        let outcome = partition(&dist, &graph, &PartitionConfig::default()).unwrap();
        let partition = outcome.partition().unwrap();

        assert_eq!(partition.generators.len(), 3);
        assert_eq!(partition.cells.len(), 3);
        assert!(partition.skipped.is_empty());
        for cell in &partition.cells {
            let generator = partition.generators[cell.generator];
            assert!(cell.polygon.contains(&generator));
        }
    }

    #[test]
    fn collinear_end_points_give_strips() {
        let graph = graph_with(&[(0.0, 0.0), (100.0, 0.0), (200.0, 0.0)]);
        let dist = distribution(&[(0, 1), (1, 1), (2, 1)]);
        let outcome = partition(&dist, &graph, &PartitionConfig::default()).unwrap();
        let partition = outcome.partition().unwrap();
        assert_eq!(partition.cells.len(), 3);
        for cell in &partition.cells {
            assert_eq!(cell.polygon.exterior().0.len(), 5);
        }
    }

    #[test]
    fn unknown_node_is_an_error() {
        let graph = graph_with(&[(0.0, 0.0)]);
        let dist = distribution(&[(0, 1), (5, 1), (6, 1)]);
        assert!(matches!(
            partition(&dist, &graph, &PartitionConfig::default()),
            Err(Error::InvalidNodeIndex)
        ));
    }

    #[test]
    fn degenerate_cell_is_skipped() {
        let flat = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 0.0 },
            Coord { x: 2.0, y: 0.0 },
        ];
        assert!(close_cell(flat).is_err());
        assert!(close_cell(vec![Coord { x: 0.0, y: 0.0 }]).is_err());
    }
}
