use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by analysis, aggregation, mixing and the vocal backends.
#[derive(Error, Debug)]
pub enum Error {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Inconsistent data: {0}")]
    InconsistentData(String),

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Fails with `NotFound` unless `path` points at an existing file.
pub(crate) fn ensure_exists(path: &std::path::Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::NotFound(path.to_path_buf()));
    }
    Ok(())
}
