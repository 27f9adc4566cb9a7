use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid dimension order `{order}`: {reason}")]
    InvalidAxisOrder { order: String, reason: String },

    #[error("unknown pixel type: {0}")]
    UnknownPixelType(String),

    #[error("invalid plane coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("invalid array slice: {0}")]
    InvalidSlice(String),
}
