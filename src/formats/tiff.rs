use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::model::{Axis, CANONICAL_ORDER, CoreError, PixelType, normalize};
use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::tags::Tag;
use tracing::debug;

use super::util::{check_rect, crop_plane, extension};
use super::{DecoderOpener, ImageDecoder, IoError, Result};

/// Dimension order of ImageJ hyperstacks: channels vary fastest, then slices, then frames.
const IMAGEJ_ORDER: &str = "XYCZT";

/// Single-series decoder for multi-page TIFF files.
///
/// Pages of a plain TIFF are treated as Z planes. ImageJ hyperstacks are
/// recognized from their `ImageDescription` tag and mapped onto C, Z and T.
/// Samples are always handed out little-endian.
pub struct TiffDecoder {
    path: PathBuf,
    decoder: Option<Decoder<BufReader<File>>>,
    width: usize,
    height: usize,
    sizes: [usize; 3],
    dimension_order: String,
    pixel_type: Option<PixelType>,
    sample_label: &'static str,
    rgb: bool,
}

impl std::fmt::Debug for TiffDecoder {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TiffDecoder")
            .field("path", &self.path)
            .field("open", &self.decoder.is_some())
            .field("width", &self.width)
            .field("height", &self.height)
            .field("sizes", &self.sizes)
            .field("dimension_order", &self.dimension_order)
            .finish()
    }
}

impl TiffDecoder {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut decoder = Decoder::new(BufReader::new(file))?;
        let (width, height) = decoder.dimensions()?;
        let colortype = decoder.colortype()?;
        let rgb = !matches!(colortype, ColorType::Gray(_));
        let description = decoder.get_tag_ascii_string(Tag::ImageDescription).ok();
        // SampleFormat defaults to unsigned integers when absent.
        let sample_format = decoder
            .find_tag_unsigned_vec::<u16>(Tag::SampleFormat)?
            .and_then(|formats| formats.first().copied())
            .unwrap_or(1);
        let (pixel_type, sample_label) = classify_samples(sample_format, sample_bits(colortype));

        let mut pages = 1;
        while decoder.more_images() {
            decoder.next_image()?;
            if decoder.dimensions()? != (width, height) {
                return Err(IoError::UnsupportedLayout(
                    "TIFF pages must have identical dimensions".into(),
                ));
            }
            pages += 1;
        }
        decoder.seek_to_image(0)?;

        let (dimension_order, sizes) = match description
            .as_deref()
            .and_then(|text| imagej_sizes(text, pages))
        {
            Some(sizes) => (IMAGEJ_ORDER.to_string(), sizes),
            None => (CANONICAL_ORDER.to_string(), [pages, 1, 1]),
        };
        debug!(
            path = %path.display(),
            width,
            height,
            pages,
            order = %dimension_order,
            "opened TIFF"
        );

        Ok(Self {
            path: path.to_path_buf(),
            decoder: Some(decoder),
            width: width as usize,
            height: height as usize,
            sizes,
            dimension_order,
            pixel_type,
            sample_label,
            rgb,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ImageDecoder for TiffDecoder {
    fn series_count(&self) -> usize {
        1
    }

    fn set_series(&mut self, series: usize) -> Result<()> {
        if series != 0 {
            return Err(IoError::Decode(format!(
                "{} has a single series, requested series {series}",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn series(&self) -> usize {
        0
    }

    fn dimension_order(&self) -> String {
        self.dimension_order.clone()
    }

    fn size(&self, axis: Axis) -> usize {
        match axis {
            Axis::X => self.width,
            Axis::Y => self.height,
            Axis::Z => self.sizes[0],
            Axis::Channel => self.sizes[1],
            Axis::Time => self.sizes[2],
        }
    }

    fn pixel_type(&self) -> Result<PixelType> {
        self.pixel_type
            .ok_or_else(|| CoreError::UnknownPixelType(self.sample_label.to_string()).into())
    }

    fn is_little_endian(&self) -> bool {
        true
    }

    fn is_rgb(&self) -> bool {
        self.rgb
    }

    fn is_interleaved(&self) -> bool {
        self.rgb
    }

    fn image_count(&self) -> usize {
        self.sizes.iter().product()
    }

    fn zct_coords(&self, plane: usize) -> Result<[usize; 3]> {
        Ok(normalize(&self.dimension_order)?.plane_coords(self.sizes, plane)?)
    }

    fn read_bytes(
        &mut self,
        plane: usize,
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    ) -> Result<Vec<u8>> {
        check_rect(plane, (self.width, self.height), (x, y, width, height))?;
        let count = self.image_count();
        if plane >= count {
            return Err(IoError::Decode(format!(
                "plane {plane} out of range for {count} planes"
            )));
        }
        let bytes_per_sample = self.pixel_type()?.bytes_per_sample();
        let plane_width = self.width;
        let decoder = self.decoder.as_mut().ok_or_else(|| {
            IoError::Decode(format!("{} has been closed", self.path.display()))
        })?;
        decoder.seek_to_image(plane)?;
        let page = little_endian_bytes(decoder.read_image()?)?;
        Ok(crop_plane(
            &page,
            plane_width,
            bytes_per_sample,
            (x, y, width, height),
        ))
    }

    fn close(&mut self) -> Result<()> {
        self.decoder = None;
        Ok(())
    }
}

/// Opens `.tif`/`.tiff` files as [`TiffDecoder`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct TiffOpener;

impl DecoderOpener for TiffOpener {
    type Decoder = TiffDecoder;

    fn open(&self, path: &Path) -> Result<TiffDecoder> {
        match extension(path)?.as_str() {
            "tif" | "tiff" => TiffDecoder::open(path),
            other => Err(IoError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Reads `[slices, channels, frames]` from an ImageJ description when they account for every page.
fn imagej_sizes(description: &str, pages: usize) -> Option<[usize; 3]> {
    if !description.starts_with("ImageJ=") {
        return None;
    }
    let value = |key: &str| {
        description.lines().find_map(|line| {
            line.strip_prefix(key)?
                .strip_prefix('=')?
                .trim()
                .parse::<usize>()
                .ok()
        })
    };
    let sizes = [
        value("slices").unwrap_or(1),
        value("channels").unwrap_or(1),
        value("frames").unwrap_or(1),
    ];
    (sizes.iter().product::<usize>() == pages).then_some(sizes)
}

fn sample_bits(colortype: ColorType) -> Option<u8> {
    match colortype {
        ColorType::Gray(bits)
        | ColorType::RGB(bits)
        | ColorType::Palette(bits)
        | ColorType::GrayA(bits)
        | ColorType::RGBA(bits)
        | ColorType::CMYK(bits)
        | ColorType::CMYKA(bits)
        | ColorType::YCbCr(bits) => Some(bits),
        ColorType::Multiband { bit_depth, .. } => Some(bit_depth),
        _ => None,
    }
}

/// Maps the `SampleFormat` tag (1 unsigned, 2 signed, 3 float) and bit depth to a pixel type.
fn classify_samples(sample_format: u16, bits: Option<u8>) -> (Option<PixelType>, &'static str) {
    match (sample_format, bits) {
        (1, Some(8)) => (Some(PixelType::Uint8), "u8"),
        (2, Some(8)) => (Some(PixelType::Int8), "i8"),
        (1, Some(16)) => (Some(PixelType::Uint16), "u16"),
        (2, Some(16)) => (Some(PixelType::Int16), "i16"),
        (1, Some(32)) => (Some(PixelType::Uint32), "u32"),
        (2, Some(32)) => (Some(PixelType::Int32), "i32"),
        (3, Some(32)) => (Some(PixelType::Float32), "f32"),
        (3, Some(64)) => (Some(PixelType::Float64), "f64"),
        (1, Some(64)) => (None, "u64"),
        (2, Some(64)) => (None, "i64"),
        _ => (None, "unrecognized TIFF sample format"),
    }
}

fn little_endian_bytes(result: DecodingResult) -> Result<Vec<u8>> {
    let bytes = match result {
        DecodingResult::U8(buffer) => buffer,
        DecodingResult::I8(buffer) => buffer.into_iter().map(|value| value as u8).collect(),
        DecodingResult::U16(buffer) => buffer.iter().flat_map(|v| v.to_le_bytes()).collect(),
        DecodingResult::I16(buffer) => buffer.iter().flat_map(|v| v.to_le_bytes()).collect(),
        DecodingResult::U32(buffer) => buffer.iter().flat_map(|v| v.to_le_bytes()).collect(),
        DecodingResult::I32(buffer) => buffer.iter().flat_map(|v| v.to_le_bytes()).collect(),
        DecodingResult::F32(buffer) => buffer.iter().flat_map(|v| v.to_le_bytes()).collect(),
        DecodingResult::F64(buffer) => buffer.iter().flat_map(|v| v.to_le_bytes()).collect(),
        _ => {
            return Err(IoError::UnsupportedLayout(
                "unsupported TIFF sample type".into(),
            ));
        }
    };
    Ok(bytes)
}
