use crate::services::chunking::MAX_CHUNKS;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Thread count must be between 1 and {max}", max = MAX_CHUNKS)]
    InvalidThreadCount,

    #[error("Not an uploadable file: {0}")]
    InvalidSourcePath(PathBuf),

    #[error("File not found: {0}")]
    SourceNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, UploadError>;
