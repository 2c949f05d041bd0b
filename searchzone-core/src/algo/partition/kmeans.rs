//! Frequency-weighted k-means (Lloyd iterations with k-means++ seeding)

use geo::Coord;
use rand::Rng;
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;

use super::KMeansConfig;

/// Point with the number of walks that ended on it
pub(crate) type WeightedPoint = (Coord<f64>, f64);

struct Clustering {
    centroids: Vec<Coord<f64>>,
    inertia: f64,
}

/// Clusters `points` into `k` groups and returns the centroids ordered by
/// `(x, y)`.
///
/// Every restart draws its seeds from one generator seeded with
/// `config.seed`; the run with the lowest weighted inertia wins. `k` must
/// not exceed the number of points.
pub(crate) fn weighted_kmeans(
    points: &[WeightedPoint],
    k: usize,
    config: &KMeansConfig,
) -> Vec<Coord<f64>> {
    if k == 0 || points.is_empty() {
        return Vec::new();
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut best: Option<Clustering> = None;

    for _ in 0..config.restarts.max(1) {
        let initial = seed_centroids(points, k, &mut rng);
        let candidate = lloyd(points, initial, config);
        if best
            .as_ref()
            .is_none_or(|current| candidate.inertia < current.inertia)
        {
            best = Some(candidate);
        }
    }

    let mut centroids = best.map(|c| c.centroids).unwrap_or_default();
    centroids.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    centroids
}

/// k-means++: the first centroid proportional to weight, the rest
/// proportional to weight times squared distance to the closest centroid
fn seed_centroids<R: Rng + ?Sized>(
    points: &[WeightedPoint],
    k: usize,
    rng: &mut R,
) -> Vec<Coord<f64>> {
    let mut centroids = Vec::with_capacity(k);
    let weights: Vec<f64> = points.iter().map(|(_, w)| *w).collect();
    centroids.push(points[pick(&weights, rng)].0);

    let mut closest: Vec<f64> = points
        .iter()
        .map(|(p, _)| distance_squared(*p, centroids[0]))
        .collect();

    while centroids.len() < k {
        let scores: Vec<f64> = points
            .iter()
            .zip(&closest)
            .map(|((_, w), d)| w * d)
            .collect();
        let next = points[pick(&scores, rng)].0;
        for ((p, _), d) in points.iter().zip(closest.iter_mut()) {
            *d = d.min(distance_squared(*p, next));
        }
        centroids.push(next);
    }

    centroids
}

fn pick<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    match WeightedIndex::new(weights) {
        Ok(distribution) => distribution.sample(rng),
        Err(_) => rng.gen_range(0..weights.len()),
    }
}

fn lloyd(
    points: &[WeightedPoint],
    mut centroids: Vec<Coord<f64>>,
    config: &KMeansConfig,
) -> Clustering {
    let k = centroids.len();
    let mut labels = vec![0usize; points.len()];

    for _ in 0..config.max_iterations {
        assign(points, &centroids, &mut labels);

        let mut sums = vec![Coord { x: 0.0, y: 0.0 }; k];
        let mut totals = vec![0.0; k];
        for ((p, w), &label) in points.iter().zip(&labels) {
            sums[label] = sums[label] + *p * *w;
            totals[label] += w;
        }

        let mut shift: f64 = 0.0;
        for cluster in 0..k {
            let updated = if totals[cluster] > 0.0 {
                sums[cluster] / totals[cluster]
            } else {
                farthest_point(points, &centroids, &labels)
            };
            shift = shift.max(distance_squared(updated, centroids[cluster]));
            centroids[cluster] = updated;
        }

        if shift <= config.tolerance * config.tolerance {
            break;
        }
    }

    assign(points, &centroids, &mut labels);
    let inertia = points
        .iter()
        .zip(&labels)
        .map(|((p, w), &l)| w * distance_squared(*p, centroids[l]))
        .sum();

    Clustering { centroids, inertia }
}

fn assign(points: &[WeightedPoint], centroids: &[Coord<f64>], labels: &mut [usize]) {
    for ((p, _), label) in points.iter().zip(labels.iter_mut()) {
        *label = nearest(*p, centroids);
    }
}

fn nearest(point: Coord<f64>, centroids: &[Coord<f64>]) -> usize {
    centroids
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            distance_squared(point, **a).total_cmp(&distance_squared(point, **b))
        })
        .map_or(0, |(i, _)| i)
}

// Relocation target for an empty cluster
fn farthest_point(
    points: &[WeightedPoint],
    centroids: &[Coord<f64>],
    labels: &[usize],
) -> Coord<f64> {
    points
        .iter()
        .zip(labels)
        .max_by(|((a, _), la), ((b, _), lb)| {
            distance_squared(*a, centroids[**la]).total_cmp(&distance_squared(*b, centroids[**lb]))
        })
        .map_or(Coord { x: 0.0, y: 0.0 }, |((p, _), _)| *p)
}

pub(crate) fn distance_squared(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let d = a - b;
    d.x * d.x + d.y * d.y
}
