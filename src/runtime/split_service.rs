use std::path::{Path, PathBuf};

use crate::formats::{DecoderOpener, TiffOpener};
use crate::model::SplitDescriptor;
use crate::splits::{MetadataTable, SplitPlanner, collect_metadata};

use super::Result;

#[derive(Debug, Clone, Default)]
pub struct SplitService<O = TiffOpener> {
    opener: O,
}

impl<O: DecoderOpener> SplitService<O> {
    pub fn with_opener(opener: O) -> Self {
        Self { opener }
    }

    /// Plans `paths` into splits of `planes_per_split` planes (0: one per series).
    pub fn plan(
        &self,
        paths: &[PathBuf],
        planes_per_split: usize,
        metadata: Option<&Path>,
    ) -> Result<Vec<SplitDescriptor>> {
        let mut planner = SplitPlanner::new(&self.opener, planes_per_split);
        if let Some(metadata) = metadata {
            planner = planner.with_metadata(MetadataTable::load(metadata)?);
        }
        Ok(planner.plan_files(paths)?)
    }

    pub fn collect_metadata(&self, paths: &[PathBuf]) -> Result<MetadataTable> {
        Ok(collect_metadata(&self.opener, paths)?)
    }
}
