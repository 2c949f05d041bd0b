//! Voronoi tessellation of a handful of generator points with the
//! unbounded cells closed at a fixed radius.
//!
//! The Delaunay triangles are found by testing every triple for an empty
//! circumcircle, which is only reasonable for a few generators.

use geo::Coord;
use itertools::Itertools;

use super::kmeans::distance_squared;

const RELATIVE_EPSILON: f64 = 1e-9;

/// Delaunay triangle and its circumcentre (a Voronoi vertex)
struct Triangle {
    corners: [usize; 3],
    center: Coord<f64>,
}

impl Triangle {
    fn has(&self, generator: usize) -> bool {
        self.corners.contains(&generator)
    }
}

/// Vertex list of every generator's cell, in generator order. Vertices are
/// not ordered around the cell.
pub(crate) fn finite_cells(generators: &[Coord<f64>], radius: f64) -> Vec<Vec<Coord<f64>>> {
    if generators.len() < 2 {
        return vec![Vec::new(); generators.len()];
    }

    let (a, b) = farthest_pair(generators);
    let span = distance_squared(generators[a], generators[b]).sqrt();
    let scale = span.max(1.0);
    let eps = RELATIVE_EPSILON * scale * scale;

    let collinear = generators
        .iter()
        .all(|p| cross(generators[a], generators[b], *p).abs() <= eps);

    if collinear {
        strip_cells(generators, (a, b), radius)
    } else {
        delaunay_cells(generators, eps, radius)
    }
}

fn delaunay_cells(points: &[Coord<f64>], eps: f64, radius: f64) -> Vec<Vec<Coord<f64>>> {
    let n = points.len();
    let triangles: Vec<Triangle> = (0..n)
        .tuple_combinations()
        .filter_map(|(i, j, k)| {
            let center = circumcenter(points[i], points[j], points[k], eps)?;
            let bound = distance_squared(center, points[i]) * (1.0 - RELATIVE_EPSILON);
            (0..n)
                .filter(|m| ![i, j, k].contains(m))
                .all(|m| distance_squared(center, points[m]) >= bound)
                .then_some(Triangle {
                    corners: [i, j, k],
                    center,
                })
        })
        .collect();

    let centroid = mean(points);
    let mut cells: Vec<Vec<Coord<f64>>> = (0..n)
        .map(|g| {
            let mut vertices = Vec::new();
            for triangle in triangles.iter().filter(|t| t.has(g)) {
                push_distinct(&mut vertices, triangle.center, eps.sqrt());
            }
            vertices
        })
        .collect();

    // Every hull edge carries an infinite ridge; close it with a far vertex
    for (p1, p2) in hull_edges(points, eps) {
        let Some(ridge_vertex) = triangles
            .iter()
            .find(|t| t.has(p1) && t.has(p2))
            .map(|t| t.center)
        else {
            continue;
        };

        let t = unit(points[p2] - points[p1]);
        let normal = Coord { x: -t.y, y: t.x };
        let midpoint = (points[p1] + points[p2]) / 2.0;
        let side = dot(midpoint - centroid, normal);
        let direction = normal * sign(side);
        let far = ridge_vertex + direction * radius;

        cells[p1].push(far);
        cells[p2].push(far);
    }

    cells
}

/// Pairs `(i, j)` with every other point on one side of the line through
/// them and none strictly between them
fn hull_edges(points: &[Coord<f64>], eps: f64) -> Vec<(usize, usize)> {
    let n = points.len();
    (0..n)
        .tuple_combinations()
        .filter(|&(i, j)| {
            let (a, b) = (points[i], points[j]);
            let others = || (0..n).filter(move |&m| m != i && m != j);
            let one_side = others().all(|m| cross(a, b, points[m]) >= -eps)
                || others().all(|m| cross(a, b, points[m]) <= eps);
            let blocked = others().any(|m| {
                let p = points[m];
                cross(a, b, p).abs() <= eps && dot(p - a, b - a) > 0.0 && dot(p - b, a - b) > 0.0
            });
            one_side && !blocked
        })
        .collect()
}

/// Cells of generators lying on one line: slabs between consecutive
/// perpendicular bisectors, `radius` wide on both sides of the line
fn strip_cells(points: &[Coord<f64>], (a, b): (usize, usize), radius: f64) -> Vec<Vec<Coord<f64>>> {
    let along = unit(points[b] - points[a]);
    let across = Coord {
        x: -along.y,
        y: along.x,
    };

    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&i, &j| {
        dot(points[i] - points[a], along).total_cmp(&dot(points[j] - points[a], along))
    });

    let mut cells = vec![Vec::new(); points.len()];
    for (pos, &g) in order.iter().enumerate() {
        let lower_ridge = (pos > 0).then(|| (points[order[pos - 1]] + points[g]) / 2.0);
        let upper_ridge = order
            .get(pos + 1)
            .map(|&next| (points[g] + points[next]) / 2.0);

        let (lower, upper) = match (lower_ridge, upper_ridge) {
            (Some(lower), Some(upper)) => (lower, upper),
            (None, Some(upper)) => (upper - along * radius, upper),
            (Some(lower), None) => (lower, lower + along * radius),
            (None, None) => continue,
        };

        cells[g] = vec![
            lower - across * radius,
            upper - across * radius,
            upper + across * radius,
            lower + across * radius,
        ];
    }
    cells
}

fn circumcenter(a: Coord<f64>, b: Coord<f64>, c: Coord<f64>, eps: f64) -> Option<Coord<f64>> {
    let area = cross(a, b, c);
    if area.abs() <= eps {
        return None;
    }
    let (ab, ac) = (b - a, c - a);
    let (ab_sq, ac_sq) = (dot(ab, ab), dot(ac, ac));
    let d = 2.0 * area;
    Some(Coord {
        x: a.x + (ac.y * ab_sq - ab.y * ac_sq) / d,
        y: a.y + (ab.x * ac_sq - ac.x * ab_sq) / d,
    })
}

fn farthest_pair(points: &[Coord<f64>]) -> (usize, usize) {
    (0..points.len())
        .tuple_combinations()
        .max_by(|&(i, j), &(k, l)| {
            let first = distance_squared(points[i], points[j]);
            first.total_cmp(&distance_squared(points[k], points[l]))
        })
        .unwrap_or((0, 0))
}

fn push_distinct(vertices: &mut Vec<Coord<f64>>, vertex: Coord<f64>, tolerance: f64) {
    let tolerance_sq = tolerance * tolerance;
    if vertices
        .iter()
        .all(|v| distance_squared(*v, vertex) > tolerance_sq)
    {
        vertices.push(vertex);
    }
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn mean(points: &[Coord<f64>]) -> Coord<f64> {
    let sum = points
        .iter()
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, p| acc + *p);
    sum / points.len().max(1) as f64
}

fn cross(o: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

fn unit(v: Coord<f64>) -> Coord<f64> {
    let norm = dot(v, v).sqrt();
    if norm > 0.0 { v / norm } else { v }
}

fn sign(value: f64) -> f64 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn circumcenter_of_right_triangle_is_hypotenuse_midpoint() {
        let center = circumcenter(c(0.0, 0.0), c(4.0, 0.0), c(0.0, 2.0), 1e-9).unwrap();
        assert_abs_diff_eq!(center.x, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(center.y, 1.0, epsilon = 1e-12);
        let degenerate = circumcenter(c(0.0, 0.0), c(1.0, 1.0), c(2.0, 2.0), 1e-9);
        assert!(degenerate.is_none());
    }

    #[test]
    fn triangle_cells_share_one_vertex_and_two_far_points() {
        let cells = finite_cells(&[c(0.0, 0.0), c(100.0, 0.0), c(0.0, 100.0)], 3000.0);
        assert_eq!(cells.len(), 3);
        for cell in &cells {
            assert_eq!(cell.len(), 3);
            assert!(cell.contains(&c(50.0, 50.0)));
        }
        // ridge between the generators on the x axis points down
        assert!(cells[0].contains(&c(50.0, -2950.0)));
        assert!(cells[1].contains(&c(50.0, -2950.0)));
    }

    #[test]
    fn interior_generator_gets_bounded_cell() {
        let generators = [
            c(-100.0, -100.0),
            c(100.0, -100.0),
            c(0.0, 120.0),
            c(5.0, 0.0),
        ];
        let cells = finite_cells(&generators, 3000.0);
        // interior cell has one vertex per incident triangle and no far points
        assert_eq!(cells[3].len(), 3);
        for vertex in &cells[3] {
            assert!(vertex.x.abs() < 500.0 && vertex.y.abs() < 500.0);
        }
    }

    #[test]
    fn cocircular_generators_merge_vertices() {
        let square = [c(0.0, 0.0), c(10.0, 0.0), c(10.0, 10.0), c(0.0, 10.0)];
        let cells = finite_cells(&square, 100.0);
        for cell in &cells {
            // shared centre plus two far points
            assert_eq!(cell.len(), 3);
        }
    }

    #[test]
    fn collinear_generators_get_strips() {
        let cells = finite_cells(&[c(0.0, 0.0), c(20.0, 0.0), c(10.0, 0.0)], 50.0);
        let middle = [c(5.0, -50.0), c(15.0, -50.0), c(15.0, 50.0), c(5.0, 50.0)];
        assert_eq!(cells[2], middle);
        assert_eq!(cells[0][0], c(-45.0, -50.0));
        assert_eq!(cells[1][1], c(65.0, -50.0));
    }

    #[test]
    fn hull_skips_edges_through_points() {
        let points = [c(0.0, 0.0), c(10.0, 0.0), c(20.0, 0.0), c(10.0, 10.0)];
        let edges = hull_edges(&points, 1e-9);
        assert!(edges.contains(&(0, 1)));
        assert!(edges.contains(&(1, 2)));
        assert!(!edges.contains(&(0, 2)));
        assert!(edges.contains(&(0, 3)));
        assert!(edges.contains(&(2, 3)));
    }
}
