// Error types for the analytics engine.
//
// An empty filtered view is never an error, and an infeasible scenario is
// reported through `SimulationOutcome` rather than through this enum.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Schema error at row {row}, column '{column}': {reason}")]
    Schema {
        row: usize,
        column: String,
        reason: String,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub fn schema(row: usize, column: &str, reason: impl Into<String>) -> Self {
        Error::Schema {
            row,
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
