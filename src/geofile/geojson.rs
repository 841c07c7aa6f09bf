use anyhow::Context;
use std::{fs, path::Path};

/// Read a whole JSON document into memory.
pub fn read_json_document(input_filepath: &Path) -> anyhow::Result<serde_json::Value> {
    let contents = fs::read_to_string(input_filepath)
        .with_context(|| format!("Reading {:?}", input_filepath))?;
    serde_json::from_str(&contents).with_context(|| format!("Parsing JSON from {:?}", input_filepath))
}

/// Write a JSON document pretty-printed with 2-space indentation, replacing any existing file.
pub fn write_json_document(
    document: &serde_json::Value,
    output_filepath: &Path,
) -> anyhow::Result<()> {
    let contents = serde_json::to_string_pretty(document)?;
    fs::write(output_filepath, contents).with_context(|| format!("Writing {:?}", output_filepath))
}
