use crate::formats::IoError;
use crate::model::CoreError;
use crate::planes::PlaneError;
use crate::splits::SplitError;
use crate::workflow::JobError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("record error: {0}")]
    Core(#[from] CoreError),

    #[error("I/O service error: {0}")]
    Io(#[from] IoError),

    #[error("plane service error: {0}")]
    Plane(#[from] PlaneError),

    #[error("split service error: {0}")]
    Split(#[from] SplitError),

    #[error("job service error: {0}")]
    Job(#[from] JobError),

    #[error("file system error: {0}")]
    File(#[from] std::io::Error),

    #[error("record {index} not found; container holds {count}")]
    RecordNotFound { index: usize, count: usize },
}
