use serde_json::{Map, Value};

use crate::error::ConversionError;

pub type JsonObject = Map<String, Value>;

/// Keys of a raw zone that become GeoJSON properties, in the order they are checked.
pub const REQUIRED_PROPERTY_KEYS: [&str; 9] = [
    "identifier",
    "country",
    "name",
    "type",
    "restriction",
    "reason",
    "applicability",
    "zoneAuthority",
    "message",
];

/// Borrow a value as a JSON object, failing with `InvalidField` naming `key` otherwise.
pub fn as_object_mut<'a>(
    value: &'a mut Value,
    key: &str,
) -> Result<&'a mut JsonObject, ConversionError> {
    value
        .as_object_mut()
        .ok_or_else(|| ConversionError::invalid_field(key, "expected a JSON object"))
}

/// Fail on the first of `keys` missing from `object`.
pub fn ensure_keys_present(
    object: &JsonObject,
    keys: &[&str],
    context: &str,
) -> Result<(), ConversionError> {
    match keys.iter().find(|key| !object.contains_key(**key)) {
        Some(key) => Err(ConversionError::missing_field(*key, context)),
        None => Ok(()),
    }
}

/// Move the required property keys out of a raw zone into a new properties object.
///
/// Nothing is moved unless all keys are present, the error names the first absent key in the
/// order of `REQUIRED_PROPERTY_KEYS`. Other keys of the raw zone stay where they are.
pub fn take_required_properties(raw_feature: &mut JsonObject) -> Result<JsonObject, ConversionError> {
    ensure_keys_present(raw_feature, &REQUIRED_PROPERTY_KEYS, "feature")?;
    let mut properties = JsonObject::new();
    for key in REQUIRED_PROPERTY_KEYS {
        if let Some(value) = raw_feature.shift_remove(key) {
            properties.insert(key.to_string(), value);
        }
    }
    Ok(properties)
}

/// Render a value for log lines, strings without their quotes.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Look up `properties.<key>` of a GeoJSON feature.
pub fn property<'a>(feature: &'a Value, key: &str) -> Result<&'a Value, ConversionError> {
    feature
        .get("properties")
        .ok_or_else(|| ConversionError::missing_field("properties", "feature"))?
        .get(key)
        .ok_or_else(|| ConversionError::missing_field(key, "feature properties"))
}
