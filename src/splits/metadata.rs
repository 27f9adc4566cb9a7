use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::formats::{DecoderOpener, ImageDecoder};
use crate::model::SeriesMetadata;

use super::{Result, SplitError};

/// Out-of-band plane counts keyed by absolute image path.
///
/// Text form: one `path<TAB>series_count<TAB>planes_per_series` line per file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataTable {
    entries: BTreeMap<PathBuf, SeriesMetadata>,
}

fn absolute_key(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

impl MetadataTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, metadata: SeriesMetadata) {
        self.entries.insert(absolute_key(path.as_ref()), metadata);
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<SeriesMetadata> {
        self.entries.get(&absolute_key(path.as_ref())).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Path, SeriesMetadata)> {
        self.entries
            .iter()
            .map(|(path, metadata)| (path.as_path(), *metadata))
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut table = Self::new();
        for (index, line) in text.lines().enumerate() {
            let line_no = index + 1;
            let fields = line
                .trim()
                .split('\t')
                .map(str::trim)
                .filter(|field| !field.is_empty())
                .collect::<Vec<_>>();
            if fields.is_empty() {
                continue;
            }
            let [path, series_count, planes_per_series] = fields[..] else {
                return Err(SplitError::InvalidMetadata {
                    line: line_no,
                    reason: format!("expected 3 tab-separated fields, found {}", fields.len()),
                });
            };
            let count = |field: &str| {
                field.parse::<usize>().map_err(|error| SplitError::InvalidMetadata {
                    line: line_no,
                    reason: format!("`{field}` is not a plane count: {error}"),
                })
            };
            let metadata = SeriesMetadata::new(count(series_count)?, count(planes_per_series)?);
            if metadata.total_planes().is_none() {
                return Err(SplitError::InvalidMetadata {
                    line: line_no,
                    reason: format!(
                        "{series_count} series of {planes_per_series} planes overflow the plane index"
                    ),
                });
            }
            table.insert(path, metadata);
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn to_tsv(&self) -> String {
        self.iter()
            .map(|(path, metadata)| {
                format!(
                    "{}\t{}\t{}\n",
                    path.display(),
                    metadata.series_count,
                    metadata.planes_per_series
                )
            })
            .collect()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, self.to_tsv())?;
        Ok(())
    }
}

/// Reads series and plane counts from an open decoder, leaving its active series unchanged.
///
/// Plane counts are taken from series 0; a warning is logged when another
/// series disagrees, since splits assume a uniform count.
pub fn probe_metadata<D: ImageDecoder>(decoder: &mut D, path: &Path) -> Result<SeriesMetadata> {
    let series_count = decoder.series_count();
    let active = decoder.series();
    decoder.set_series(0)?;
    let planes_per_series = decoder.image_count();
    for series in 1..series_count {
        decoder.set_series(series)?;
        let count = decoder.image_count();
        if count != planes_per_series {
            warn!(
                path = %path.display(),
                series,
                count,
                planes_per_series,
                "series plane counts differ; split resolution assumes uniform series"
            );
        }
    }
    decoder.set_series(active)?;
    debug!(
        path = %path.display(),
        series_count,
        planes_per_series,
        "probed image metadata"
    );
    Ok(SeriesMetadata::new(series_count, planes_per_series))
}

/// Opens each image once (in parallel) and records its plane counts.
pub fn collect_metadata<O: DecoderOpener>(opener: &O, paths: &[PathBuf]) -> Result<MetadataTable> {
    let entries = paths
        .par_iter()
        .map(|path| -> Result<(PathBuf, SeriesMetadata)> {
            let path = absolute_key(path);
            let mut decoder = opener.open(&path)?;
            let metadata = probe_metadata(&mut decoder, &path);
            decoder.close()?;
            Ok((path, metadata?))
        })
        .collect::<Result<Vec<_>>>()?;
    let mut table = MetadataTable::new();
    for (path, metadata) in entries {
        table.insert(path, metadata);
    }
    Ok(table)
}
