use std::path::Path;

use crate::model::{Axis, PixelType};

use super::Result;

/// Reader-side view of a multi-series 5-D image.
///
/// Sizes, order and pixel type always describe the active series. The
/// decoder is the authority on how a linear plane index maps to `[z, c, t]`.
pub trait ImageDecoder {
    fn series_count(&self) -> usize;
    fn set_series(&mut self, series: usize) -> Result<()>;
    fn series(&self) -> usize;
    fn dimension_order(&self) -> String;
    /// Extent along `axis`; for [`Axis::Channel`] this is the effective (one sample per plane) count.
    fn size(&self, axis: Axis) -> usize;
    fn pixel_type(&self) -> Result<PixelType>;
    fn is_little_endian(&self) -> bool;
    fn is_rgb(&self) -> bool;
    fn is_interleaved(&self) -> bool;
    /// Number of planes in the active series.
    fn image_count(&self) -> usize;
    fn zct_coords(&self, plane: usize) -> Result<[usize; 3]>;
    fn read_bytes(
        &mut self,
        plane: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>>;

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Opens decoders by path. Shared across workers, so it must be `Sync`.
pub trait DecoderOpener: Sync {
    type Decoder: ImageDecoder;

    fn open(&self, path: &Path) -> Result<Self::Decoder>;
}
