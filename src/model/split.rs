use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Plane counts of one image file, assuming every series has the same number of planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    pub series_count: usize,
    pub planes_per_series: usize,
}

impl SeriesMetadata {
    pub fn new(series_count: usize, planes_per_series: usize) -> Self {
        Self {
            series_count,
            planes_per_series,
        }
    }

    /// `series_count × planes_per_series`, or `None` when it does not fit in `usize`.
    pub fn total_planes(&self) -> Option<usize> {
        self.series_count.checked_mul(self.planes_per_series)
    }
}

/// A contiguous range of global plane indices within one file.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SplitDescriptor {
    pub path: PathBuf,
    pub start: usize,
    pub length: usize,
}

impl SplitDescriptor {
    pub fn new(path: impl Into<PathBuf>, start: usize, length: usize) -> Self {
        Self {
            path: path.into(),
            start,
            length,
        }
    }

    /// One past the last global plane index covered by this split, or `None` on overflow.
    pub fn end(&self) -> Option<usize> {
        self.start.checked_add(self.length)
    }
}
