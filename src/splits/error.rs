use std::path::PathBuf;

use crate::formats::IoError;
use crate::planes::PlaneError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SplitError>;

#[derive(Debug, Error)]
pub enum SplitError {
    #[error("split resolver used before initialize")]
    NotInitialized,

    #[error("invalid metadata table at line {line}: {reason}")]
    InvalidMetadata { line: usize, reason: String },

    #[error("split {start}+{length} of {path} exceeds the file's {total} planes")]
    OutOfBounds {
        path: PathBuf,
        start: usize,
        length: usize,
        total: usize,
    },

    #[error("{path}: {series_count} series of {planes_per_series} planes overflow the plane index")]
    TooManyPlanes {
        path: PathBuf,
        series_count: usize,
        planes_per_series: usize,
    },

    #[error("{path} reports no planes per series")]
    EmptySeries { path: PathBuf },

    #[error("plane construction failed: {0}")]
    Plane(#[from] PlaneError),

    #[error("image access failed: {0}")]
    Io(#[from] IoError),

    #[error("metadata file I/O failure: {0}")]
    File(#[from] std::io::Error),
}
