//! Street network components - nodes, edges and road classes

use std::fmt;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::NodeId;

/// Road graph node
#[derive(Debug, Clone)]
pub struct RoadNode {
    /// OSM ID of the node
    pub id: NodeId,
    /// Geographic coordinates (x = longitude, y = latitude)
    pub geometry: Point<f64>,
    /// Planar coordinates in metres
    pub projected: Point<f64>,
}

/// Road graph edge (street segment)
#[derive(Debug, Clone)]
pub struct RoadEdge {
    /// Authoritative road class of the segment
    pub road_class: RoadClass,
    /// Segment length in metres
    pub length: f64,
}

/// OSM `highway` class of a street segment.
///
/// Segments without a tag are treated as residential streets.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RoadClass {
    #[default]
    Residential,
    Footway,
    Path,
    Service,
    Other(String),
}

impl RoadClass {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Residential => "residential",
            Self::Footway => "footway",
            Self::Path => "path",
            Self::Service => "service",
            Self::Other(tag) => tag,
        }
    }
}

impl From<&str> for RoadClass {
    fn from(tag: &str) -> Self {
        match tag.trim() {
            "residential" => Self::Residential,
            "footway" => Self::Footway,
            "path" => Self::Path,
            "service" => Self::Service,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for RoadClass {
    fn from(tag: String) -> Self {
        Self::from(tag.as_str())
    }
}

impl From<RoadClass> for String {
    fn from(class: RoadClass) -> Self {
        class.as_str().to_string()
    }
}

impl fmt::Display for RoadClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
