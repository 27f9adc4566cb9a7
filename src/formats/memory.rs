use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::{Axis, PixelType, normalize};

use super::util::check_rect;
use super::{DecoderOpener, ImageDecoder, IoError, Result};

/// Shape and sample layout of one in-memory series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntheticSeries {
    pub dimension_order: String,
    pub size_x: usize,
    pub size_y: usize,
    pub size_z: usize,
    pub size_c: usize,
    pub size_t: usize,
    pub pixel_type: PixelType,
    pub little_endian: bool,
}

impl SyntheticSeries {
    pub fn new(dimension_order: &str, [x, y, z, c, t]: [usize; 5], pixel_type: PixelType) -> Self {
        Self {
            dimension_order: dimension_order.to_string(),
            size_x: x,
            size_y: y,
            size_z: z,
            size_c: c,
            size_t: t,
            pixel_type,
            little_endian: true,
        }
    }

    pub fn image_count(&self) -> usize {
        self.size_z * self.size_c * self.size_t
    }

    fn size(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.size_x,
            Axis::Y => self.size_y,
            Axis::Z => self.size_z,
            Axis::Channel => self.size_c,
            Axis::Time => self.size_t,
        }
    }
}

/// Deterministic in-memory image with any number of series.
///
/// Byte `b` of the sample at (`x`, `y`) of plane `p` in series `s` is
/// [`SyntheticImage::sample_byte`], so expected payloads can be recomputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticImage {
    series: Vec<SyntheticSeries>,
    active: usize,
    rgb: bool,
    interleaved: bool,
    closed: bool,
    reads: usize,
}

impl SyntheticImage {
    pub fn new(series: Vec<SyntheticSeries>) -> Self {
        Self {
            series,
            active: 0,
            rgb: false,
            interleaved: false,
            closed: false,
            reads: 0,
        }
    }

    pub fn single(series: SyntheticSeries) -> Self {
        Self::new(vec![series])
    }

    /// Marks the image as carrying interleaved RGB samples.
    pub fn with_rgb(mut self, rgb: bool) -> Self {
        self.rgb = rgb;
        self.interleaved = rgb;
        self
    }

    pub fn sample_byte(series: usize, plane: usize, x: usize, y: usize, byte: usize) -> u8 {
        ((series * 61 + plane * 17 + y * 7 + x * 3 + byte) % 251) as u8
    }

    pub fn read_count(&self) -> usize {
        self.reads
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn active_series(&self) -> &SyntheticSeries {
        &self.series[self.active]
    }
}

impl ImageDecoder for SyntheticImage {
    fn series_count(&self) -> usize {
        self.series.len()
    }

    fn set_series(&mut self, series: usize) -> Result<()> {
        if series >= self.series.len() {
            return Err(IoError::Decode(format!(
                "series {series} out of range for {} series",
                self.series.len()
            )));
        }
        self.active = series;
        Ok(())
    }

    fn series(&self) -> usize {
        self.active
    }

    fn dimension_order(&self) -> String {
        self.active_series().dimension_order.clone()
    }

    fn size(&self, axis: Axis) -> usize {
        self.active_series().size(axis)
    }

    fn pixel_type(&self) -> Result<PixelType> {
        Ok(self.active_series().pixel_type)
    }

    fn is_little_endian(&self) -> bool {
        self.active_series().little_endian
    }

    fn is_rgb(&self) -> bool {
        self.rgb
    }

    fn is_interleaved(&self) -> bool {
        self.interleaved
    }

    fn image_count(&self) -> usize {
        self.active_series().image_count()
    }

    fn zct_coords(&self, plane: usize) -> Result<[usize; 3]> {
        let series = self.active_series();
        let sizes = [series.size_z, series.size_c, series.size_t];
        Ok(normalize(&series.dimension_order)?.plane_coords(sizes, plane)?)
    }

    fn read_bytes(
        &mut self,
        plane: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>> {
        if self.closed {
            return Err(IoError::Decode("synthetic image has been closed".into()));
        }
        let series = self.active_series();
        check_rect(plane, (series.size_x, series.size_y), (x, y, width, height))?;
        if plane >= series.image_count() {
            return Err(IoError::Decode(format!(
                "plane {plane} out of range for {} planes",
                series.image_count()
            )));
        }
        let bytes_per_sample = series.pixel_type.bytes_per_sample();
        let mut data = Vec::with_capacity(width * height * bytes_per_sample);
        for row in y..y + height {
            for column in x..x + width {
                for byte in 0..bytes_per_sample {
                    data.push(Self::sample_byte(self.active, plane, column, row, byte));
                }
            }
        }
        self.reads += 1;
        Ok(data)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Serves [`SyntheticImage`]s by path; each `open` hands out a fresh copy.
#[derive(Debug, Clone, Default)]
pub struct SyntheticImages {
    images: HashMap<PathBuf, SyntheticImage>,
}

impl SyntheticImages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<PathBuf>, image: SyntheticImage) {
        self.images.insert(path.into(), image);
    }

    pub fn with(mut self, path: impl Into<PathBuf>, image: SyntheticImage) -> Self {
        self.insert(path, image);
        self
    }
}

impl DecoderOpener for SyntheticImages {
    type Decoder = SyntheticImage;

    fn open(&self, path: &Path) -> Result<SyntheticImage> {
        self.images.get(path).cloned().ok_or_else(|| {
            IoError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no synthetic image at {}", path.display()),
            ))
        })
    }
}
