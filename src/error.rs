use thiserror::Error;

/// Errors raised while transforming a no-fly-zone document. All of them are fatal for the run.
#[derive(Debug, Error, PartialEq)]
pub enum ConversionError {
    /// A required key is absent from a feature, geometry or collection.
    #[error("Invalid GeoJSON: missing '{key}' key in {context}")]
    MissingField { key: String, context: String },

    /// A top-level key that must be removed is not there.
    #[error("Cannot remove '{key}': key not present in document")]
    KeyMissing { key: String },

    /// A key is present but its value has an unusable shape.
    #[error("Invalid value for '{key}': {reason}")]
    InvalidField { key: String, reason: String },
}

impl ConversionError {
    pub fn missing_field(key: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            key: key.into(),
            context: context.into(),
        }
    }

    pub fn key_missing(key: impl Into<String>) -> Self {
        Self::KeyMissing { key: key.into() }
    }

    pub fn invalid_field(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
