use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MvnlockError {
    #[error("Invalid coordinates {value:?}: {reason}")]
    CoordinateParse { value: String, reason: String },

    #[error("Cannot reconcile coordinates {coordinates} against file {file:?}: {reason}")]
    Reconcile {
        coordinates: String,
        file: String,
        reason: String,
    },

    #[error("Failed to read file {path:?}: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },

    #[error("Failed to parse JSON in {path:?}: {source}")]
    ParseJson { path: PathBuf, source: serde_json::Error },

    #[error("Failed to write file {path:?}: {source}")]
    WriteFile { path: PathBuf, source: std::io::Error },

    #[error("Failed to render lock file: {source}")]
    RenderJson { source: serde_json::Error },

    #[error("Resolution failed in {resolver}: {reason}")]
    ResolutionFailed { resolver: String, reason: String },
}
