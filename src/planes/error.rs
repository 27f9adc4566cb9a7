use crate::formats::IoError;
use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlaneError>;

#[derive(Debug, Error)]
pub enum PlaneError {
    #[error("unsupported image layout: {0}")]
    UnsupportedLayout(String),

    #[error("invalid plane region: {0}")]
    InvalidRect(String),

    #[error("plane {plane} out of range for {count} planes in series {series}")]
    PlaneOutOfRange {
        plane: usize,
        count: usize,
        series: usize,
    },

    #[error("decoder failure: {0}")]
    Decode(#[from] IoError),

    #[error("container write failure: {0}")]
    Container(#[source] IoError),

    #[error("core slice/metadata failure: {0}")]
    Core(#[from] CoreError),
}
