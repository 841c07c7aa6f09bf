use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use serde_json::Value;

use crate::{
    error::ConversionError,
    geofile::{
        feature::{as_object_mut, display_value, property},
        geojson::{read_json_document, write_json_document},
    },
};

const LOCALTYPE_KEY: &str = "localtype";
const NUMBER_RETURNED_KEY: &str = "numberReturned";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct FilterParams {
    /// Features whose `properties.localtype` equals this value are kept, all others are dropped.
    pub localtype: String,
    /// When set, only the first feature with a given value of this property is kept.
    pub dedup_property: Option<String>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            localtype: "Natura2000".to_string(),
            dedup_property: None,
        }
    }
}

/// What the filter removed. Values are rendered as in the log lines.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterReport {
    pub initial_count: usize,
    /// Values of the dedup property of dropped duplicates, in input order.
    pub duplicates: Vec<String>,
    /// `localtype` of each feature dropped for having the wrong type, in input order.
    pub wrong_types: Vec<String>,
}

impl FilterReport {
    pub fn duplicate_count(&self) -> usize {
        self.duplicates.len()
    }

    pub fn wrong_type_count(&self) -> usize {
        self.wrong_types.len()
    }

    pub fn removed_count(&self) -> usize {
        self.duplicate_count() + self.wrong_type_count()
    }

    pub fn remaining_count(&self) -> usize {
        self.initial_count - self.removed_count()
    }

    pub fn log_summary(&self) {
        log::info!("Removed: {} duplicates", self.duplicate_count());
        log::info!("Removed: {} wrong type", self.wrong_type_count());
        log::info!("Total removed: {}", self.removed_count());
        log::info!("Remaining features: {}", self.remaining_count());
    }
}

/// Keep only the features of the configured `localtype`, drop `numberReturned` and recompute
/// `total`.
///
/// Fails with `KeyMissing` when the collection has no `numberReturned`, which is also the case
/// for a collection this function already processed.
pub fn filter_by_localtype(
    mut document: Value,
    params: &FilterParams,
) -> Result<(Value, FilterReport), ConversionError> {
    let collection = as_object_mut(&mut document, "document")?;
    let features = match collection.get_mut("features").map(Value::take) {
        Some(Value::Array(features)) => features,
        Some(_) => {
            return Err(ConversionError::invalid_field(
                "features",
                "expected a list of features",
            ))
        }
        None => return Err(ConversionError::missing_field("features", "document")),
    };

    let mut report = FilterReport {
        initial_count: features.len(),
        ..Default::default()
    };
    let mut seen_values = HashSet::new();
    let mut retained = Vec::with_capacity(features.len());
    for feature in features {
        if let Some(dedup_property) = &params.dedup_property {
            let value = property(&feature, dedup_property)?;
            // Keyed on the serialized JSON, so 1 and "1" stay distinct.
            if !seen_values.insert(value.to_string()) {
                let value = display_value(value);
                log::info!(
                    "Duplicate feature with {} {} found and removed",
                    dedup_property,
                    value
                );
                report.duplicates.push(value);
                continue;
            }
        }

        let localtype = property(&feature, LOCALTYPE_KEY)?;
        if *localtype != params.localtype {
            let localtype = display_value(localtype);
            log::info!(
                "Non {} feature {} found and removed",
                params.localtype,
                localtype
            );
            report.wrong_types.push(localtype);
            continue;
        }
        retained.push(feature);
    }
    report.log_summary();

    collection
        .shift_remove(NUMBER_RETURNED_KEY)
        .ok_or_else(|| ConversionError::key_missing(NUMBER_RETURNED_KEY))?;
    collection.insert("total".to_string(), Value::from(report.remaining_count()));
    collection.insert("features".to_string(), Value::Array(retained));
    Ok((document, report))
}

/// Read a feature collection, filter it and write the result. Nothing is written when filtering
/// fails.
pub fn filter_by_localtype_file(
    input_filepath: &Path,
    output_filepath: &Path,
    params: &FilterParams,
) -> anyhow::Result<FilterReport> {
    log::info!("Reading features from {:?}", input_filepath);
    let document = read_json_document(input_filepath)?;
    let (document, report) = filter_by_localtype(document, params)?;
    log::info!(
        "Writing {} features to {:?}",
        report.remaining_count(),
        output_filepath
    );
    write_json_document(&document, output_filepath)?;
    Ok(report)
}
