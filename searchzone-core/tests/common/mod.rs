#![allow(dead_code)]

use geo::Point;
use serde_json::{Value, json};

use searchzone_core::prelude::*;

pub const ORIGIN: (f64, f64) = (127.0, 37.5);
pub const SPACING: f64 = 0.0004;

pub fn origin() -> Point<f64> {
    Point::new(ORIGIN.0, ORIGIN.1)
}

/// Undirected `size` x `size` grid centred on [`ORIGIN`]; ids are
/// `row * size + col`
pub fn grid_document(size: i64) -> Value {
    let half = size / 2;
    let mut nodes = Vec::new();
    let mut edges = Vec::new();
    for row in 0..size {
        for col in 0..size {
            let id = row * size + col;
            nodes.push(json!({
                "id": id,
                "lon": ORIGIN.0 + (col - half) as f64 * SPACING,
                "lat": ORIGIN.1 + (row - half) as f64 * SPACING,
            }));
            if col + 1 < size {
                edges.push(json!({
                    "source": id,
                    "target": id + 1,
                    "highway": "residential",
                    "length": 35.0,
                }));
            }
            if row + 1 < size {
                edges.push(json!({
                    "source": id,
                    "target": id + size,
                    "highway": ["footway", "steps"],
                    "length": 44.0,
                }));
            }
        }
    }
    json!({"directed": false, "nodes": nodes, "edges": edges})
}

pub fn grid(size: i64) -> RoadGraph {
    road_graph_from_str(&grid_document(size).to_string()).unwrap()
}

pub fn profile(preference: Preference) -> SearchProfile {
    SearchProfile {
        demographics: Demographics {
            gender: Gender::Female,
            age_group: AgeGroup::Adult,
        },
        preference,
    }
}
