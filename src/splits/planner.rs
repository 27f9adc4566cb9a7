use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::formats::{DecoderOpener, ImageDecoder};
use crate::model::{SeriesMetadata, SplitDescriptor};

use super::{MetadataTable, Result, SplitError, probe_metadata};

/// Partitions a file's global plane space into contiguous splits.
///
/// Every split holds `target_split_size` planes except the last, which holds
/// the remainder. A `target_split_size` of zero means one split per series.
/// Fails when the plane total does not fit in `usize`.
pub fn plan(
    path: &Path,
    series_count: usize,
    planes_per_series: usize,
    target_split_size: usize,
) -> Result<Vec<SplitDescriptor>> {
    let total = SeriesMetadata::new(series_count, planes_per_series)
        .total_planes()
        .ok_or_else(|| SplitError::TooManyPlanes {
            path: path.to_path_buf(),
            series_count,
            planes_per_series,
        })?;
    let split_size = if target_split_size == 0 {
        planes_per_series
    } else {
        target_split_size
    };
    if total == 0 || split_size == 0 {
        return Ok(Vec::new());
    }
    let splits = (0..total)
        .step_by(split_size)
        .map(|start| {
            let length = split_size.min(total - start);
            debug!(path = %path.display(), start, length, "adding split");
            SplitDescriptor::new(path, start, length)
        })
        .collect();
    Ok(splits)
}

/// Plans splits for whole files, preferring a metadata table over opening images.
pub struct SplitPlanner<'a, O> {
    opener: &'a O,
    metadata: Option<MetadataTable>,
    target_split_size: usize,
}

impl<'a, O: DecoderOpener> SplitPlanner<'a, O> {
    pub fn new(opener: &'a O, target_split_size: usize) -> Self {
        Self {
            opener,
            metadata: None,
            target_split_size,
        }
    }

    pub fn with_metadata(mut self, metadata: MetadataTable) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn target_split_size(&self) -> usize {
        self.target_split_size
    }

    /// Plane counts for `path`, from the table when possible, otherwise from the image itself.
    pub fn metadata_for(&self, path: &Path) -> Result<SeriesMetadata> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        match &self.metadata {
            Some(table) if !table.is_empty() => {
                if let Some(metadata) = table.get(&path) {
                    return Ok(metadata);
                }
                warn!(
                    path = %path.display(),
                    "no metadata entry for file, opening it to count planes"
                );
            }
            _ => {}
        }
        let mut decoder = self.opener.open(&path)?;
        let metadata = probe_metadata(&mut decoder, &path);
        decoder.close()?;
        metadata
    }

    pub fn plan_file(&self, path: &Path) -> Result<Vec<SplitDescriptor>> {
        let path = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
        let metadata = self.metadata_for(&path)?;
        let splits = plan(
            &path,
            metadata.series_count,
            metadata.planes_per_series,
            self.target_split_size,
        )?;
        debug!(
            path = %path.display(),
            planes = ?metadata.total_planes(),
            splits = splits.len(),
            "planned file"
        );
        Ok(splits)
    }

    /// Concatenates the plans of `paths`, in input order.
    pub fn plan_files(&self, paths: &[PathBuf]) -> Result<Vec<SplitDescriptor>> {
        let mut splits = Vec::new();
        for path in paths {
            splits.extend(self.plan_file(path)?);
        }
        Ok(splits)
    }
}
