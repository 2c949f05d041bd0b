//! Raw road network file format produced by the graph provider

use serde::Deserialize;

use crate::{NodeId, RoadClass};

#[derive(Debug, Deserialize)]
pub struct RawRoadGraph {
    /// Undirected graphs are stored with both edge directions
    #[serde(default = "default_directed")]
    pub directed: bool,
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

fn default_directed() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct RawNode {
    pub id: NodeId,
    pub lon: f64,
    pub lat: f64,
    /// Provider-projected coordinates in metres
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawEdge {
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default)]
    pub highway: Option<HighwayTag>,
    #[serde(default)]
    pub length: f64,
}

/// OSM `highway` value: a single tag or a list of candidate tags
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum HighwayTag {
    Single(String),
    Many(Vec<String>),
}

impl HighwayTag {
    /// The first tag is authoritative; absent tags mean a residential street.
    pub fn road_class(tag: Option<&HighwayTag>) -> RoadClass {
        match tag {
            Some(HighwayTag::Single(tag)) => RoadClass::from(tag.as_str()),
            Some(HighwayTag::Many(tags)) => tags
                .first()
                .map(|t| RoadClass::from(t.as_str()))
                .unwrap_or_default(),
            None => RoadClass::default(),
        }
    }
}
