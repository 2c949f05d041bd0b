use geo::{LineString, Point, Polygon};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::{Value, json};

use super::{MandatoryFindings, MandatoryReport, NodeMarker, PartitionSummary, SimulationReport};
use crate::Error;

impl SimulationReport {
    /// Converts the report to a `GeoJSON` `FeatureCollection`: the origin,
    /// one point per heat point, the generators and the cell polygons.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = vec![marker_feature(
            &self.origin,
            json!({
                "kind": "origin",
                "requested_minutes": self.requested_minutes,
                "golden_time_minutes": self.golden_time_minutes,
                "simulated_minutes": self.simulated_minutes,
                "trials": self.trials,
            }),
        )?];

        for heat in &self.heat_points {
            let most_visited = self
                .most_visited
                .is_some_and(|top| top.location.node_id == heat.location.node_id);
            features.push(marker_feature(
                &heat.location,
                json!({
                    "kind": "heat",
                    "count": heat.count,
                    "most_visited": most_visited,
                }),
            )?);
        }

        match &self.partition {
            PartitionSummary::Cells {
                generators, cells, ..
            } => {
                for (idx, &[lon, lat]) in generators.iter().enumerate() {
                    let geometry = Geometry::new(GeoJsonValue::from(&Point::new(lon, lat)));
                    features.push(feature(
                        geometry,
                        json!({ "kind": "generator", "generator": idx }),
                    )?);
                }
                for cell in cells {
                    let polygon = Polygon::new(LineString::from(cell.ring.clone()), vec![]);
                    let geometry = Geometry::new(GeoJsonValue::from(&polygon));
                    features.push(feature(
                        geometry,
                        json!({ "kind": "cell", "generator": cell.generator }),
                    )?);
                }
            }
            PartitionSummary::InsufficientData { .. } => {}
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: partition_status(&self.partition),
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

impl MandatoryReport {
    /// Converts the report to a `GeoJSON` `FeatureCollection` of node
    /// markers
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = vec![marker_feature(
            &self.origin,
            json!({
                "kind": "origin",
                "minutes": self.minutes,
                "reachable_nodes": self.reachable_nodes,
            }),
        )?];

        match &self.findings {
            MandatoryFindings::PathFrequency { markers, .. } => {
                for marker in markers {
                    features.push(marker_feature(
                        &marker.location,
                        json!({
                            "kind": "path_node",
                            "count": marker.count,
                            "weight": marker.weight,
                        }),
                    )?);
                }
            }
            MandatoryFindings::Criticality { markers, .. } => {
                for marker in markers {
                    features.push(marker_feature(
                        &marker.location,
                        json!({
                            "kind": "critical_node",
                            "centrality": marker.centrality,
                        }),
                    )?);
                }
            }
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn marker_feature(marker: &NodeMarker, mut properties: Value) -> Result<Feature, Error> {
    if let Value::Object(map) = &mut properties {
        map.insert("node_id".to_string(), json!(marker.node_id));
    }
    let geometry = Geometry::new(GeoJsonValue::from(&Point::new(marker.lon, marker.lat)));
    feature(geometry, properties)
}

fn feature(geometry: Geometry, properties: Value) -> Result<Feature, Error> {
    let value = json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": properties,
    });

    Feature::from_json_value(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

// Marks collections without cells so clients can tell them from empty ones
fn partition_status(summary: &PartitionSummary) -> Option<serde_json::Map<String, Value>> {
    match summary {
        PartitionSummary::Cells { .. } => None,
        PartitionSummary::InsufficientData { distinct } => {
            let mut members = serde_json::Map::new();
            members.insert("partition".to_string(), json!("insufficient_data"));
            members.insert("distinct_points".to_string(), json!(distinct));
            Some(members)
        }
    }
}
