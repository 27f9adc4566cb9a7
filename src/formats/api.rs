use std::path::Path;

use image::{ImageBuffer, Luma};

use crate::model::PlaneRecord;

use super::util::scale_to_u8;
use super::{DecoderOpener, IoError, Result, TiffDecoder, TiffOpener};

pub fn open_image(path: impl AsRef<Path>) -> Result<TiffDecoder> {
    TiffOpener.open(path.as_ref())
}

pub fn supported_formats() -> &'static [&'static str] {
    &["tif", "tiff"]
}

/// Writes the record's XY block as an 8-bit grayscale PNG, rescaled to its own value range.
pub fn save_plane_png(record: &PlaneRecord, path: &Path) -> Result<()> {
    let plane = record.xy_plane()?;
    let (height, width) = plane.dim();
    let values = plane.iter().copied().collect::<Vec<_>>();
    let bytes = scale_to_u8(&values);
    let image = ImageBuffer::<Luma<u8>, _>::from_vec(width as u32, height as u32, bytes)
        .ok_or_else(|| IoError::UnsupportedLayout("failed to construct gray image".into()))?;
    image.save(path)?;
    Ok(())
}
