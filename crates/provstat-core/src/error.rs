// crates/provstat-core/src/error.rs

use thiserror::Error;

/// Errors surfaced by the harmonizer.
///
/// Only structural failures live here. Unparseable cells and unmapped
/// province names degrade to missing values or dropped rows instead.
#[derive(Debug, Error)]
pub enum StatError {
    /// A source file is missing. Aborts the whole load.
    #[error("source not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// A province mapping that cannot be inverted.
    #[error("invalid province mapping: {0}")]
    Mapping(String),

    /// A caller-supplied name (region, metric, province) that is not known.
    #[error("unknown {kind}: {value}")]
    Unknown { kind: &'static str, value: String },
}

impl From<geojson::Error> for StatError {
    fn from(e: geojson::Error) -> Self {
        StatError::GeoJson(Box::new(e))
    }
}

impl StatError {
    pub(crate) fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        StatError::Unknown {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatError>;
