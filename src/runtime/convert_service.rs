use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::formats::{
    DecoderOpener, ImageDecoder, IoError, TiffOpener, container_path, record_name, series_name,
};
use crate::model::{Axis, PixelType};
use crate::planes::{PlaneFilter, PlaneRect, SliceBuilder, write_series};

use super::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesInfo {
    pub series: usize,
    pub dimension_order: String,
    /// Axis extents in `dimension_order`.
    pub shape: Vec<usize>,
    pub pixel_type: PixelType,
    pub little_endian: bool,
    pub rgb: bool,
    pub planes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub path: PathBuf,
    pub name: String,
    pub series: Vec<SeriesInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConvertReport {
    pub input: PathBuf,
    /// Containers written, with their record counts. Fully filtered series are absent.
    pub containers: Vec<(PathBuf, usize)>,
}

impl ConvertReport {
    pub fn total_records(&self) -> usize {
        self.containers.iter().map(|(_, records)| records).sum()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConvertService<O = TiffOpener> {
    opener: O,
}

impl<O: DecoderOpener> ConvertService<O> {
    pub fn with_opener(opener: O) -> Self {
        Self { opener }
    }

    pub fn info(&self, path: impl AsRef<Path>) -> Result<ImageInfo> {
        let path = path.as_ref();
        let mut decoder = self.opener.open(path)?;
        let mut series = Vec::with_capacity(decoder.series_count());
        for index in 0..decoder.series_count() {
            decoder.set_series(index)?;
            let order = decoder.dimension_order();
            let shape = order
                .chars()
                .map(|symbol| Axis::from_symbol(symbol).map_or(0, |axis| decoder.size(axis)))
                .collect();
            series.push(SeriesInfo {
                series: index,
                dimension_order: order,
                shape,
                pixel_type: decoder.pixel_type()?,
                little_endian: decoder.is_little_endian(),
                rgb: decoder.is_rgb() || decoder.is_interleaved(),
                planes: decoder.image_count(),
            });
        }
        decoder.close()?;
        Ok(ImageInfo {
            path: path.to_path_buf(),
            name: record_name(path),
            series,
        })
    }

    /// Converts every series of `path` into `{name}_{series}.bimg` under `output_dir`.
    pub fn convert(
        &self,
        path: impl AsRef<Path>,
        output_dir: impl AsRef<Path>,
        rect: PlaneRect,
        filter: &PlaneFilter,
    ) -> Result<ConvertReport> {
        let (path, output_dir) = (path.as_ref(), output_dir.as_ref());
        info!("Reading from {}", path.display());
        let name = record_name(path);
        let mut builder = SliceBuilder::new(self.opener.open(path)?)?;
        fs::create_dir_all(output_dir)?;
        let mut containers = Vec::new();
        for series in 0..builder.series_count() {
            let record = series_name(&name, series);
            let target = container_path(output_dir, &record);
            let written = write_series(&mut builder, series, &record, &target, rect, filter)?;
            if written > 0 {
                containers.push((target, written));
            }
        }
        builder.close()?;
        info!("All done");
        Ok(ConvertReport {
            input: path.to_path_buf(),
            containers,
        })
    }

    /// Converts a single-series image into the container at `output`.
    ///
    /// Multi-series, RGB and interleaved images are rejected before any output exists.
    pub fn convert_single(
        &self,
        path: impl AsRef<Path>,
        output: impl AsRef<Path>,
        rect: PlaneRect,
        filter: &PlaneFilter,
    ) -> Result<usize> {
        let (path, output) = (path.as_ref(), output.as_ref());
        info!("Reading from {}", path.display());
        let mut decoder = self.opener.open(path)?;
        let series_count = decoder.series_count();
        if series_count != 1 {
            decoder.close()?;
            return Err(IoError::UnsupportedLayout(format!(
                "{} holds {series_count} series; single-series conversion needs exactly one",
                path.display()
            ))
            .into());
        }
        if decoder.is_rgb() || decoder.is_interleaved() {
            decoder.close()?;
            return Err(IoError::UnsupportedLayout(format!(
                "{} has RGB or interleaved samples",
                path.display()
            ))
            .into());
        }
        if let Some(parent) = output.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut builder = SliceBuilder::new(decoder)?;
        let name = series_name(&record_name(path), 0);
        let written = write_series(&mut builder, 0, &name, output, rect, filter)?;
        builder.close()?;
        info!("All done");
        Ok(written)
    }
}
