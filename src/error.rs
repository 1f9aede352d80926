use std::path::PathBuf;
use thiserror::Error;

/// Failures at the crate's outer surfaces: configuration, sheet files and
/// exports. Parsing and aggregation never fail; they degrade to empty or
/// zeroed values instead.
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("CSV export error: {source}")]
    Csv {
        #[from]
        source: csv::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("No dataset registered for sheet '{0}'")]
    UnknownSheet(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
