use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the file-facing parts of the tool (loaders, collectors,
/// writers). The ranking core itself never fails.
#[derive(Debug, Error)]
pub enum DemandError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),
}

pub type Result<T> = std::result::Result<T, DemandError>;
