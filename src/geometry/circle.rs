use std::f64::consts::PI;

use geo::HaversineDestination;
use serde::Deserialize;

use crate::error::ConversionError;

/// Number of segments per quarter circle used when nothing else is configured.
pub const DEFAULT_CIRCLE_RESOLUTION: usize = 64;

/// Unit in which the radius of a circular zone is interpreted.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RadiusUnit {
    /// The radius is used as-is in the units of the coordinates, i.e. degrees for WGS84 data. Zones
    /// away from the equator come out as stretched circles.
    #[default]
    CoordinateUnits,
    /// The radius is in meters, vertices are placed at that great-circle distance from the center.
    Meters,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default)]
pub struct CircleParams {
    pub resolution: usize,
    pub radius_unit: RadiusUnit,
}

impl Default for CircleParams {
    fn default() -> Self {
        Self {
            resolution: DEFAULT_CIRCLE_RESOLUTION,
            radius_unit: RadiusUnit::default(),
        }
    }
}

/// Approximate a disk by a polygon, the way a point buffer does.
///
/// # Arguments
/// * center - center of the disk as (longitude, latitude).
/// * radius - radius of the disk, see `RadiusUnit` for how it is interpreted.
/// * params - `resolution` is the number of segments per quarter circle, so the exterior ring has
///     `4 * resolution` segments and `4 * resolution + 1` coordinates, the first and last coinciding.
///
/// # Returns
/// A polygon without interiors. Its exterior starts due east of the center and runs clockwise.
pub fn circle_to_polygon(
    center: geo::Point,
    radius: f64,
    params: &CircleParams,
) -> Result<geo::Polygon, ConversionError> {
    if params.resolution == 0 {
        return Err(ConversionError::invalid_field(
            "resolution",
            "a circle needs at least one segment per quarter",
        ));
    }
    let segment_count = 4 * params.resolution;
    let coords: Vec<geo::Coord> = (0..segment_count)
        .map(|index| {
            let fraction = index as f64 / segment_count as f64;
            match params.radius_unit {
                RadiusUnit::CoordinateUnits => {
                    let angle = -2.0 * PI * fraction;
                    geo::Coord {
                        x: center.x() + radius * angle.cos(),
                        y: center.y() + radius * angle.sin(),
                    }
                }
                RadiusUnit::Meters => {
                    // Bearings are clockwise from north, start at east.
                    let bearing = 90.0 + 360.0 * fraction;
                    center.haversine_destination(bearing, radius).into()
                }
            }
        })
        .collect();
    // Polygon::new closes the exterior ring.
    Ok(geo::Polygon::new(geo::LineString::from(coords), vec![]))
}

/// Render a polygon as a GeoJSON geometry object: `{"type": "Polygon", "coordinates": [...]}`.
pub fn polygon_to_geojson_value(polygon: &geo::Polygon) -> serde_json::Value {
    let geometry = geojson::Geometry::from(polygon);
    serde_json::Value::Object(geojson::JsonObject::from(&geometry))
}
