use serde_json::Value;

use crate::error::ConversionError;

use super::circle::{circle_to_polygon, polygon_to_geojson_value, CircleParams};

const CONTEXT: &str = "horizontalProjection";

/// The ground-plane shape of a zone. Circles need converting, every other shape is assumed to be
/// a valid GeoJSON geometry already.
#[derive(Debug, Clone, PartialEq)]
pub enum HorizontalProjection {
    Circle { center: geo::Point, radius: f64 },
    Passthrough(Value),
}

impl HorizontalProjection {
    pub fn from_value(value: Value) -> Result<Self, ConversionError> {
        let object = value
            .as_object()
            .ok_or_else(|| ConversionError::invalid_field(CONTEXT, "expected an object"))?;
        let projection_type = object
            .get("type")
            .ok_or_else(|| ConversionError::missing_field("type", CONTEXT))?;
        if projection_type != "Circle" {
            return Ok(Self::Passthrough(value));
        }

        let center = object
            .get("center")
            .ok_or_else(|| ConversionError::missing_field("center", CONTEXT))?;
        let [lon, lat]: [f64; 2] = serde_json::from_value(center.clone()).map_err(|err| {
            ConversionError::invalid_field("center", format!("expected [longitude, latitude], {}", err))
        })?;
        let radius = object
            .get("radius")
            .ok_or_else(|| ConversionError::missing_field("radius", CONTEXT))?
            .as_f64()
            .ok_or_else(|| ConversionError::invalid_field("radius", "expected a number"))?;

        Ok(Self::Circle {
            center: geo::Point::new(lon, lat),
            radius,
        })
    }

    /// Convert into a GeoJSON geometry object.
    pub fn into_geojson_value(self, circle_params: &CircleParams) -> Result<Value, ConversionError> {
        match self {
            HorizontalProjection::Circle { center, radius } => {
                log::debug!(
                    "Approximating circle at ({}, {}) with radius {}",
                    center.x(),
                    center.y(),
                    radius
                );
                let polygon = circle_to_polygon(center, radius, circle_params)?;
                Ok(polygon_to_geojson_value(&polygon))
            }
            HorizontalProjection::Passthrough(value) => Ok(value),
        }
    }
}
