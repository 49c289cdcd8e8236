use std::path::PathBuf;

use deal_etl_catalog::{Dataset, LinkIdError};
use deal_etl_db::{SchemaError, SinkError};
use thiserror::Error;

/// Errors that abort a pipeline run.
///
/// Unparseable dates and join misses are not errors; they never reach this
/// type.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("{path}: record {index} is not a JSON object")]
    NotAnObject { path: PathBuf, index: usize },
    #[error("Malformed link in {dataset} record {index}: {source}")]
    MalformedLink {
        dataset: Dataset,
        index: usize,
        source: LinkIdError,
    },
    #[error("Invalid {dataset} record {index}: {source}")]
    InvalidRecord {
        dataset: Dataset,
        index: usize,
        source: serde_json::Error,
    },
    #[error("Store error: {0}")]
    Sink(#[from] SinkError),
    #[error("Store error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Settings error: {0}")]
    Settings(String),
}
