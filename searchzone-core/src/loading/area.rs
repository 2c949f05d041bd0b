//! Reachable-area (isochrone) polygons from `GeoJSON`

use std::path::Path;
use std::str::FromStr;

use geo::Polygon;
use geojson::{GeoJson, Geometry, Value};

use crate::Error;

/// Loads a reachable-area polygon from a `GeoJSON` file
///
/// # Errors
///
/// Returns an error if the file cannot be read or holds no polygon
pub fn load_reachable_area(path: &Path) -> Result<Polygon<f64>, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        std::io::Error::new(
            e.kind(),
            format!("Failed to open file '{}': {}", path.display(), e),
        )
    })?;
    reachable_area_from_geojson(&content)
}

/// Extracts the reachable-area polygon from a `GeoJSON` document.
///
/// Accepts a bare geometry, a feature, or a feature collection (isochrone
/// services answer with a collection whose first feature is the area).
///
/// # Errors
///
/// Returns `Error::GeoJsonError` if the document is malformed or its first
/// geometry is not a single polygon
pub fn reachable_area_from_geojson(document: &str) -> Result<Polygon<f64>, Error> {
    let geojson = GeoJson::from_str(document).map_err(|e| Error::GeoJsonError(e.to_string()))?;

    let geometry = match geojson {
        GeoJson::Geometry(geometry) => Some(geometry),
        GeoJson::Feature(feature) => feature.geometry,
        GeoJson::FeatureCollection(collection) => collection
            .features
            .into_iter()
            .next()
            .and_then(|feature| feature.geometry),
    }
    .ok_or_else(|| Error::GeoJsonError("Document contains no geometry".to_string()))?;

    polygon_from_geometry(geometry)
}

fn polygon_from_geometry(geometry: Geometry) -> Result<Polygon<f64>, Error> {
    match geometry.value {
        value @ Value::Polygon(_) => {
            Polygon::try_from(value).map_err(|e| Error::GeoJsonError(e.to_string()))
        }
        Value::MultiPolygon(parts) if parts.len() == 1 => {
            let single = parts.into_iter().next().map(Value::Polygon).ok_or_else(|| {
                Error::GeoJsonError("Empty multipolygon".to_string())
            })?;
            Polygon::try_from(single).map_err(|e| Error::GeoJsonError(e.to_string()))
        }
        _ => Err(Error::GeoJsonError(
            "Reachable area must be a single polygon".to_string(),
        )),
    }
}
