use deal_etl_db::{SchemaError, SinkError};
use deal_etl_import::ImportError;
use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Pipeline failure (bad input, malformed link, store error)
    #[error("{0}")]
    Import(#[from] ImportError),

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Unknown table name
    #[error("Unknown table: {0}")]
    UnknownTable(String),
}

impl CliError {
    pub(crate) fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }
}

impl From<SinkError> for CliError {
    fn from(e: SinkError) -> Self {
        Self::database(e.to_string())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        Self::database(e.to_string())
    }
}
