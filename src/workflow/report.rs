use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::model::SplitDescriptor;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SplitReport {
    pub split: SplitDescriptor,
    /// `None` for a zero-length split, which writes no container.
    pub container: Option<PathBuf>,
    pub records: usize,
    pub duration_ms: u128,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobReport {
    pub job_name: Option<String>,
    pub inputs: usize,
    pub splits: Vec<SplitReport>,
    pub total_records: usize,
}
