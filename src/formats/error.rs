use crate::model::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, IoError>;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("unsupported image layout: {0}")]
    UnsupportedLayout(String),

    #[error("decode failure: {0}")]
    Decode(String),

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encode failure: {0}")]
    Image(#[from] image::ImageError),

    #[error("TIFF decode failure: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("malformed container: {0}")]
    Container(String),

    #[error("container header serialization failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("core slice/metadata failure: {0}")]
    Core(#[from] CoreError),
}
