use std::path::Path;

use serde_json::Value;

use crate::{
    error::ConversionError,
    geofile::{
        feature::{
            as_object_mut, display_value, ensure_keys_present, take_required_properties,
            JsonObject, REQUIRED_PROPERTY_KEYS,
        },
        geojson::{read_json_document, write_json_document},
    },
    geometry::{circle::CircleParams, horizontal_projection::HorizontalProjection},
};

const GEOMETRY_KEY: &str = "geometry";

/// Turn a raw zone collection into a GeoJSON FeatureCollection.
///
/// Aborts on the first malformed zone, there is no per-zone recovery.
pub fn normalize_zones(
    mut document: Value,
    circle_params: &CircleParams,
) -> Result<Value, ConversionError> {
    let collection = as_object_mut(&mut document, "document")?;
    collection.insert("type".to_string(), Value::from("FeatureCollection"));
    let features = collection
        .get_mut("features")
        .ok_or_else(|| ConversionError::missing_field("features", "document"))?
        .as_array_mut()
        .ok_or_else(|| ConversionError::invalid_field("features", "expected a list of zones"))?;

    log::info!("Normalizing {} zones", features.len());
    for raw_feature in features.iter_mut() {
        normalize_feature(as_object_mut(raw_feature, "features")?, circle_params)?;
    }
    Ok(document)
}

/// Rewrite one raw zone in place into a GeoJSON Feature.
///
/// Returns the number of geometries that were discarded because only the first one is used, a
/// warning is logged whenever it is not zero.
pub fn normalize_feature(
    raw_feature: &mut JsonObject,
    circle_params: &CircleParams,
) -> Result<usize, ConversionError> {
    ensure_keys_present(raw_feature, &REQUIRED_PROPERTY_KEYS, "feature")?;
    ensure_keys_present(raw_feature, &[GEOMETRY_KEY], "feature")?;
    let properties = take_required_properties(raw_feature)?;

    // Take the geometry list out but leave the key in place, so the converted geometry keeps its
    // position in the output.
    let geometries = match raw_feature.get_mut(GEOMETRY_KEY).map(Value::take) {
        Some(Value::Array(geometries)) => geometries,
        Some(_) => {
            return Err(ConversionError::invalid_field(
                GEOMETRY_KEY,
                "expected a list of geometries",
            ))
        }
        None => return Err(ConversionError::missing_field(GEOMETRY_KEY, "feature")),
    };
    let discarded_count = geometries.len().saturating_sub(1);
    let mut first_geometry = geometries
        .into_iter()
        .next()
        .ok_or_else(|| ConversionError::missing_field(GEOMETRY_KEY, "feature"))?;
    if discarded_count > 0 {
        log::warn!(
            "Feature {} has {} geometries, only the first one will be used",
            display_value(&properties["identifier"]),
            discarded_count + 1
        );
    }

    let projection = first_geometry
        .get_mut("horizontalProjection")
        .map(Value::take)
        .ok_or_else(|| ConversionError::missing_field("horizontalProjection", "geometry"))?;
    let geometry = HorizontalProjection::from_value(projection)?.into_geojson_value(circle_params)?;

    raw_feature.insert("type".to_string(), Value::from("Feature"));
    raw_feature.insert(GEOMETRY_KEY.to_string(), geometry);
    raw_feature.insert("properties".to_string(), Value::Object(properties));
    Ok(discarded_count)
}

/// Read a raw zone file, normalize it and write the FeatureCollection. Nothing is written when the
/// conversion fails.
pub fn normalize_zones_file(
    input_filepath: &Path,
    output_filepath: &Path,
    circle_params: &CircleParams,
) -> anyhow::Result<()> {
    log::info!("Reading zones from {:?}", input_filepath);
    let document = read_json_document(input_filepath)?;
    let document = normalize_zones(document, circle_params)?;
    log::info!("Writing FeatureCollection to {:?}", output_filepath);
    write_json_document(&document, output_filepath)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use rstest::{fixture, rstest};
    use serde_json::{json, Value};
    use testdir::testdir;

    use super::{normalize_feature, normalize_zones, normalize_zones_file};
    use crate::{
        error::ConversionError,
        geofile::{
            feature::REQUIRED_PROPERTY_KEYS,
            geojson::{read_json_document, write_json_document},
        },
        geometry::circle::CircleParams,
    };

    fn polygon_projection() -> Value {
        json!({
            "type": "Polygon",
            "coordinates": [[[5.0, 52.0], [5.1, 52.0], [5.1, 52.1], [5.0, 52.0]]]
        })
    }

    fn raw_zone(identifier: &str, geometry: Value) -> Value {
        json!({
            "identifier": identifier,
            "country": "NLD",
            "name": format!("Zone {}", identifier),
            "type": "USPACE",
            "restriction": "REQ_AUTHORISATION",
            "reason": ["AIR_TRAFFIC"],
            "applicability": [{"permanent": "YES"}],
            "zoneAuthority": [{"name": "ILT", "email": "info@ilent.nl"}],
            "message": "Flying is restricted",
            "geometry": geometry
        })
    }

    #[fixture]
    fn raw_collection() -> Value {
        json!({
            "title": "open category zones",
            "features": [
                raw_zone("NL-1", json!([{"uomDimensions": "M", "horizontalProjection": polygon_projection()}])),
                raw_zone("NL-2", json!([{"horizontalProjection": {"type": "Circle", "center": [4.76, 52.31], "radius": 0.05}}])),
            ]
        })
    }

    #[rstest]
    fn test_passthrough_feature(raw_collection: Value) {
        let output = normalize_zones(raw_collection.clone(), &CircleParams::default()).unwrap();
        assert_eq!("FeatureCollection", output["type"]);
        assert_eq!("open category zones", output["title"]);

        let feature = &output["features"][0];
        let input_feature = &raw_collection["features"][0];
        assert_eq!("Feature", feature["type"]);
        assert_eq!(polygon_projection(), feature["geometry"]);

        let properties = feature["properties"].as_object().unwrap();
        assert_eq!(REQUIRED_PROPERTY_KEYS.len(), properties.len());
        for key in REQUIRED_PROPERTY_KEYS {
            assert_eq!(input_feature[key], properties[key]);
        }
        // The zone type is a property now, the feature type is GeoJSON's.
        assert_eq!("USPACE", properties["type"]);

        let keys: Vec<&str> = feature
            .as_object()
            .unwrap()
            .keys()
            .map(|key| key.as_str())
            .collect();
        assert_eq!(vec!["geometry", "type", "properties"], keys);
    }

    #[rstest]
    fn test_circle_feature_becomes_polygon(raw_collection: Value) {
        let output = normalize_zones(raw_collection, &CircleParams::default()).unwrap();
        let geometry = &output["features"][1]["geometry"];
        assert_eq!("Polygon", geometry["type"]);

        let ring = geometry["coordinates"][0].as_array().unwrap();
        assert_eq!(4 * 64 + 1, ring.len());
        assert_eq!(ring.first(), ring.last());
        for vertex in ring {
            let dx = vertex[0].as_f64().unwrap() - 4.76;
            let dy = vertex[1].as_f64().unwrap() - 52.31;
            assert_abs_diff_eq!((dx * dx + dy * dy).sqrt(), 0.05, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_only_first_geometry_is_used() {
        let single = json!({"features": [raw_zone(
            "NL-3",
            json!([{"horizontalProjection": polygon_projection()}])
        )]});
        let multiple = json!({"features": [raw_zone(
            "NL-3",
            json!([
                {"horizontalProjection": polygon_projection()},
                {"horizontalProjection": {"type": "Circle", "center": [0.0, 0.0], "radius": 1.0}},
                {"no projection": true}
            ])
        )]});
        assert_eq!(
            normalize_zones(single, &CircleParams::default()).unwrap(),
            normalize_zones(multiple, &CircleParams::default()).unwrap()
        );
    }

    #[rstest]
    #[case(json!([{"horizontalProjection": polygon_projection()}]), 0)]
    #[case(json!([
        {"horizontalProjection": polygon_projection()},
        {"horizontalProjection": polygon_projection()}
    ]), 1)]
    #[case(json!([
        {"horizontalProjection": polygon_projection()},
        {"horizontalProjection": polygon_projection()},
        {"no projection": true}
    ]), 2)]
    fn test_discarded_geometries_are_reported(
        #[case] geometry: Value,
        #[case] expected_discarded: usize,
    ) {
        let mut zone = raw_zone("NL-6", geometry);
        let discarded =
            normalize_feature(zone.as_object_mut().unwrap(), &CircleParams::default()).unwrap();
        assert_eq!(expected_discarded, discarded);
        assert_eq!(polygon_projection(), zone["geometry"]);
    }

    #[rstest]
    #[case("identifier")]
    #[case("country")]
    #[case("name")]
    #[case("type")]
    #[case("restriction")]
    #[case("reason")]
    #[case("applicability")]
    #[case("zoneAuthority")]
    #[case("message")]
    #[case("geometry")]
    fn test_missing_key_aborts(raw_collection: Value, #[case] missing_key: &str) {
        let mut input = raw_collection;
        input["features"][1]
            .as_object_mut()
            .unwrap()
            .shift_remove(missing_key);
        assert_eq!(
            ConversionError::missing_field(missing_key, "feature"),
            normalize_zones(input, &CircleParams::default()).unwrap_err()
        );
    }

    #[test]
    fn test_first_missing_key_in_declared_order_is_reported() {
        let mut zone = raw_zone("NL-4", json!([{"horizontalProjection": polygon_projection()}]));
        let zone_object = zone.as_object_mut().unwrap();
        zone_object.shift_remove("geometry");
        zone_object.shift_remove("message");
        zone_object.shift_remove("restriction");
        let err = normalize_zones(json!({"features": [zone]}), &CircleParams::default()).unwrap_err();
        assert_eq!(ConversionError::missing_field("restriction", "feature"), err);
    }

    #[rstest]
    #[case(json!([]), ConversionError::missing_field("geometry", "feature"))]
    #[case(json!([{"verticalLimits": {}}]), ConversionError::missing_field("horizontalProjection", "geometry"))]
    #[case(json!({"horizontalProjection": {}}), ConversionError::invalid_field("geometry", "expected a list of geometries"))]
    fn test_unusable_geometry_aborts(#[case] geometry: Value, #[case] expected: ConversionError) {
        let input = json!({"features": [raw_zone("NL-5", geometry)]});
        assert_eq!(
            expected,
            normalize_zones(input, &CircleParams::default()).unwrap_err()
        );
    }

    #[test]
    fn test_missing_features_key_is_an_error() {
        assert_eq!(
            ConversionError::missing_field("features", "document"),
            normalize_zones(json!({"type": "FeatureCollection"}), &CircleParams::default())
                .unwrap_err()
        );
    }

    #[rstest]
    fn test_normalize_zones_file(raw_collection: Value) {
        let test_dir = testdir!();
        let input_filepath = test_dir.join("open-category.json");
        let output_filepath = test_dir.join("open-category.geojson");
        write_json_document(&raw_collection, &input_filepath).unwrap();

        normalize_zones_file(&input_filepath, &output_filepath, &CircleParams::default()).unwrap();

        let output = read_json_document(&output_filepath).unwrap();
        assert_eq!(2, output["features"].as_array().unwrap().len());
        assert_eq!(
            normalize_zones(raw_collection, &CircleParams::default()).unwrap(),
            output
        );
    }

    #[rstest]
    fn test_failed_conversion_writes_nothing(raw_collection: Value) {
        let test_dir = testdir!();
        let input_filepath = test_dir.join("open-category.json");
        let output_filepath = test_dir.join("open-category.geojson");
        let mut input = raw_collection;
        input["features"][0]
            .as_object_mut()
            .unwrap()
            .shift_remove("zoneAuthority");
        write_json_document(&input, &input_filepath).unwrap();

        let err = normalize_zones_file(&input_filepath, &output_filepath, &CircleParams::default())
            .unwrap_err();
        assert_eq!(
            Some(&ConversionError::missing_field("zoneAuthority", "feature")),
            err.downcast_ref::<ConversionError>()
        );
        assert!(!output_filepath.exists());
    }
}
