mod common;

use approx::assert_abs_diff_eq;
use geo::Point;
use serde_json::json;

use searchzone_core::Error;
use searchzone_core::output::PartitionSummary;
use searchzone_core::prelude::*;

/// Junction with one footway and one residential leaf
fn junction() -> RoadGraph {
    let document = json!({
        "directed": false,
        "nodes": [
            {"id": 10, "lon": 127.0, "lat": 37.5},
            {"id": 11, "lon": 127.001, "lat": 37.5},
            {"id": 12, "lon": 126.999, "lat": 37.5}
        ],
        "edges": [
            {"source": 10, "target": 11, "highway": "footway", "length": 88.0},
            {"source": 10, "target": 12, "highway": "residential", "length": 88.0}
        ]
    });
    road_graph_from_str(&document.to_string()).unwrap()
}

#[test]
fn one_step_distribution_matches_weights() {
    let graph = junction();
    let start = graph.node_index(10).unwrap();
    // 0.8 speed for one minute is a single 30 s step
    let profile = SearchProfile {
        demographics: Demographics {
            gender: Gender::Female,
            age_group: AgeGroup::Child,
        },
        preference: Preference::Nature,
    };
    let params = profile.walk_parameters(1);
    assert_eq!(params.total_steps(), 1);

    let trials = 100_000;
    let dist = run_monte_carlo(&graph, start, &params, trials, 2024).unwrap();
    assert_eq!(dist.total(), trials);

    let footway = graph.node_index(11).unwrap();
    let residential = graph.node_index(12).unwrap();
    assert_abs_diff_eq!(dist.probability(start), 0.5, epsilon = 0.01);
    assert_abs_diff_eq!(dist.probability(footway), 0.3, epsilon = 0.01);
    assert_abs_diff_eq!(dist.probability(residential), 0.2, epsilon = 0.01);
}

#[test]
fn simulation_report_accounts_for_every_trial() {
    let graph = common::grid(31);
    let profile = common::profile(Preference::Road);
    let mut request = SimulationRequest::new(common::origin(), profile, 20);
    request.trials = 800;
    request.seed = 5;

    let report = run_simulation(&graph, &request).unwrap();
    let total: usize = report.heat_points.iter().map(|h| h.count).sum();
    assert_eq!(total, 800);
    assert_eq!(report.simulated_minutes, 20);
    assert_eq!(report.golden_time_minutes, None);
    assert_eq!(report.origin.node_id, 15 * 31 + 15);

    let most = report.most_visited.unwrap();
    assert!(report.heat_points.iter().all(|h| h.count <= most.count));

    match &report.partition {
        PartitionSummary::Cells {
            generators, cells, ..
        } => {
            assert_eq!(generators.len(), MAX_CLUSTERS);
            assert!(!cells.is_empty());
            for cell in cells {
                assert!(cell.ring.len() >= 4);
                assert_eq!(cell.ring.first(), cell.ring.last());
            }
        }
        PartitionSummary::InsufficientData { .. } => panic!("expected cells"),
    }

    let geojson = report.to_geojson_string().unwrap();
    assert!(geojson.contains("\"FeatureCollection\""));
}

#[test]
fn same_seed_same_report() {
    let graph = common::grid(21);
    let profile = common::profile(Preference::Nature);
    let mut request = SimulationRequest::new(common::origin(), profile, 15);
    request.trials = 300;
    request.seed = 77;
    assert_eq!(
        run_simulation(&graph, &request).unwrap(),
        run_simulation(&graph, &request).unwrap()
    );
}

#[test]
fn golden_time_replaces_requested_minutes() {
    let graph = common::grid(31);
    let profile = common::profile(Preference::Road);
    let mut request = SimulationRequest::new(common::origin(), profile, 90);
    request.trials = 200;
    request.golden_time = Some(GoldenTimeConfig {
        searchers: 1,
        capacity_per_searcher: 0,
        ..GoldenTimeConfig::default()
    });

    let report = run_simulation(&graph, &request).unwrap();
    assert_eq!(report.requested_minutes, 90);
    assert_eq!(report.golden_time_minutes, Some(10));
    assert_eq!(report.simulated_minutes, 10);
}

#[test]
fn stalled_walker_gives_insufficient_data() {
    let graph = common::grid(11);
    let profile = common::profile(Preference::Road);
    let request = SimulationRequest::new(common::origin(), profile, 0);

    let report = run_simulation(&graph, &request).unwrap();
    assert_eq!(report.heat_points.len(), 1);
    assert_eq!(
        report.partition,
        PartitionSummary::InsufficientData { distinct: 1 }
    );
}

#[test]
fn oversized_request_is_rejected() {
    let graph = common::grid(5);
    let profile = common::profile(Preference::Road);
    let mut request = SimulationRequest::new(common::origin(), profile, 10);
    request.trials = request.budget.max_trials + 1;
    assert!(matches!(
        run_simulation(&graph, &request),
        Err(Error::InvalidParameter(_))
    ));
}

#[test]
fn far_origin_cannot_be_snapped() {
    let graph = common::grid(5);
    let profile = common::profile(Preference::Road);
    let request = SimulationRequest::new(Point::new(128.0, 36.0), profile, 10);
    assert!(matches!(
        run_simulation(&graph, &request),
        Err(Error::NoPointsFound)
    ));
}
