use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::planes::PlaneRect;

use super::{JobError, Result};

/// A batch conversion: every input is planned into splits and each split
/// written to its own container under `output_dir`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobSpec {
    pub name: Option<String>,
    #[serde(default)]
    pub inputs: Vec<PathBuf>,
    /// Planes per split; 0 means one split per series.
    #[serde(default)]
    pub planes_per_split: usize,
    /// Optional tab-separated metadata table, as written by `get-meta`.
    #[serde(default)]
    pub metadata: Option<PathBuf>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub rect: Option<PlaneRect>,
}

impl JobSpec {
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(JobError::Parse(
                "job must list at least one input".to_string(),
            ));
        }
        for (index, input) in self.inputs.iter().enumerate() {
            if input.as_os_str().is_empty() {
                return Err(JobError::Parse(format!("input at index {index} is empty")));
            }
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err(JobError::Parse("output_dir must not be empty".to_string()));
        }
        if self
            .metadata
            .as_ref()
            .is_some_and(|metadata| metadata.as_os_str().is_empty())
        {
            return Err(JobError::Parse("metadata path must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn rect(&self) -> PlaneRect {
        self.rect.unwrap_or_default()
    }
}
