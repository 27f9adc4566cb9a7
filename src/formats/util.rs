use std::path::{Path, PathBuf};

use super::container::CONTAINER_EXTENSION;
use super::{IoError, Result};

pub(crate) fn extension(path: &Path) -> Result<String> {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .ok_or_else(|| IoError::UnsupportedFormat(path.to_string_lossy().to_string()))?;
    Ok(ext)
}

/// Base record name for an image: file name with its last extension stripped.
pub fn record_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

pub fn series_name(name: &str, series: usize) -> String {
    format!("{name}_{series}")
}

pub fn container_path(out_dir: &Path, name: &str) -> PathBuf {
    out_dir.join(format!("{name}.{CONTAINER_EXTENSION}"))
}

/// Copies the `width` x `height` block at (`x`, `y`) out of a row-major plane.
pub(crate) fn crop_plane(
    plane: &[u8],
    plane_width: usize,
    bytes_per_sample: usize,
    (x, y, width, height): (usize, usize, usize, usize),
) -> Vec<u8> {
    let row_len = plane_width * bytes_per_sample;
    let mut output = Vec::with_capacity(width * height * bytes_per_sample);
    for row in y..y + height {
        let start = row * row_len + x * bytes_per_sample;
        output.extend_from_slice(&plane[start..start + width * bytes_per_sample]);
    }
    output
}

pub(crate) fn check_rect(
    plane: usize,
    (plane_width, plane_height): (usize, usize),
    (x, y, width, height): (usize, usize, usize, usize),
) -> Result<()> {
    let outside = |origin: usize, extent: usize, size: usize| {
        origin.checked_add(extent).is_none_or(|end| end > size)
    };
    if outside(x, width, plane_width) || outside(y, height, plane_height) {
        return Err(IoError::Decode(format!(
            "region ({x}, {y}, {width}, {height}) of plane {plane} exceeds {plane_width}x{plane_height}"
        )));
    }
    Ok(())
}

pub(crate) fn scale_to_u8(values: &[f64]) -> Vec<u8> {
    let (min, max) = min_max(values);
    let use_unit_range = min >= 0.0 && max <= 1.0;
    values
        .iter()
        .map(|value| {
            let normalized = if use_unit_range {
                *value
            } else if (max - min).abs() < f64::EPSILON {
                0.0
            } else {
                (*value - min) / (max - min)
            };
            (normalized.clamp(0.0, 1.0) * 255.0).round() as u8
        })
        .collect()
}

pub(crate) fn min_max(values: &[f64]) -> (f64, f64) {
    let mut iter = values.iter().copied();
    let first = iter.next().unwrap_or(0.0);
    let mut min = first;
    let mut max = first;
    for value in iter {
        if value < min {
            min = value;
        }
        if value > max {
            max = value;
        }
    }
    (min, max)
}
