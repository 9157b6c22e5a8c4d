//! Region boundary geometry.
//!
//! A boundary document is GeoJSON, normally a FeatureCollection of Polygon
//! and MultiPolygon features. Rings are returned in document order; outer
//! rings and holes are not distinguished.

use geojson::{GeoJson, Geometry, Value};

use crate::error::FormatError;

/// `(longitude, latitude)` pair in degrees.
pub type LonLat = [f64; 2];

/// Ordered, implicitly closed boundary ring.
pub type Ring = Vec<LonLat>;

pub fn parse_boundary(text: &str) -> Result<GeoJson, FormatError> {
    Ok(text.parse::<GeoJson>()?)
}

/// Parse a boundary document and extract every polygon ring from it.
pub fn rings_from_str(text: &str) -> Result<Vec<Ring>, FormatError> {
    extract_rings(&parse_boundary(text)?)
}

/// Walk each feature's geometry and collect polygon rings.
///
/// A Polygon contributes all of its rings, a MultiPolygon every ring of every
/// member polygon. Other geometry types are ignored. A position with fewer
/// than two coordinates is an error: a truncated ring must not be drawn.
pub fn extract_rings(geojson: &GeoJson) -> Result<Vec<Ring>, FormatError> {
    let mut rings = Vec::new();
    match geojson {
        GeoJson::FeatureCollection(fc) => {
            for feature in &fc.features {
                if let Some(geometry) = &feature.geometry {
                    collect_geometry_rings(geometry, &mut rings)?;
                }
            }
        }
        GeoJson::Feature(f) => {
            if let Some(geometry) = &f.geometry {
                collect_geometry_rings(geometry, &mut rings)?;
            }
        }
        GeoJson::Geometry(geometry) => collect_geometry_rings(geometry, &mut rings)?,
    }
    Ok(rings)
}

fn collect_geometry_rings(geometry: &Geometry, out: &mut Vec<Ring>) -> Result<(), FormatError> {
    match &geometry.value {
        Value::Polygon(polygon) => {
            for ring in polygon {
                out.push(to_ring(ring)?);
            }
        }
        Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    out.push(to_ring(ring)?);
                }
            }
        }
        _ => {}
    }
    Ok(())
}

fn to_ring(positions: &[Vec<f64>]) -> Result<Ring, FormatError> {
    positions
        .iter()
        .map(|p| match p.as_slice() {
            [lon, lat, ..] => Ok([*lon, *lat]),
            _ => Err(FormatError::Geometry(format!(
                "position has {} coordinate(s), expected at least 2",
                p.len()
            ))),
        })
        .collect()
}
