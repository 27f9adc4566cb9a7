use std::path::PathBuf;

use crate::formats::IoError;
use crate::splits::SplitError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobError>;

#[derive(Debug, Error)]
pub enum JobError {
    #[error("job specification parse failure: {0}")]
    Parse(String),

    #[error("inputs {first} and {second} would both write records named `{name}`")]
    DuplicateName {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("job I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("job serialization failure: {0}")]
    SerdeJson(#[from] serde_json::Error),

    #[error("job YAML serialization failure: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),

    #[error("split {path}@{start} failed: {source}")]
    Split {
        path: PathBuf,
        start: usize,
        #[source]
        source: SplitError,
    },

    #[error("split planning failed: {0}")]
    Planning(#[from] SplitError),

    #[error("container write failed: {0}")]
    Container(#[from] IoError),
}
