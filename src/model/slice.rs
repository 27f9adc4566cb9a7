use byteorder::{BigEndian, ByteOrder, LittleEndian};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::{Axis, CoreError, N_DIM, PixelType, Result, normalize};

/// A hyper-rectangular block of a 5-D series, described in the reader's dimension order.
///
/// `shape`, `offsets` and `deltas` all follow the owning record's
/// `dimension_order`. The payload is row-major with X varying fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArraySlice {
    pub dtype: PixelType,
    pub little_endian: bool,
    pub shape: Vec<usize>,
    pub offsets: Vec<usize>,
    pub deltas: Vec<usize>,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl ArraySlice {
    pub fn element_count(&self) -> usize {
        self.deltas.iter().product()
    }

    pub fn expected_data_len(&self) -> usize {
        self.element_count() * self.dtype.bytes_per_sample()
    }

    /// Checks that the block lies inside `shape` and that the payload has the right size.
    pub fn validate(&self) -> Result<()> {
        if self.shape.len() != N_DIM
            || self.offsets.len() != N_DIM
            || self.deltas.len() != N_DIM
        {
            return Err(CoreError::InvalidSlice(format!(
                "shape/offsets/deltas must have length {N_DIM}, found {}/{}/{}",
                self.shape.len(),
                self.offsets.len(),
                self.deltas.len()
            )));
        }
        for ((size, offset), delta) in self.shape.iter().zip(&self.offsets).zip(&self.deltas) {
            if offset + delta > *size {
                return Err(CoreError::InvalidSlice(format!(
                    "0 <= {offset} <= {offset} + {delta} <= {size} is false"
                )));
            }
        }
        let expected = self.expected_data_len();
        if self.data.len() != expected {
            return Err(CoreError::InvalidSlice(format!(
                "unexpected data size ({} != {expected})",
                self.data.len()
            )));
        }
        Ok(())
    }
}

/// One output record: a named plane of one series together with its pixel block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaneRecord {
    pub name: String,
    pub series: usize,
    pub dimension_order: String,
    pub pixel_data: ArraySlice,
}

impl PlaneRecord {
    /// Validates the record as a single plane: a well-formed slice that is flat along Z, C and T.
    pub fn validate(&self) -> Result<()> {
        let index_map = normalize(&self.dimension_order)?;
        self.pixel_data.validate()?;
        for axis in [Axis::Z, Axis::Channel, Axis::Time] {
            let delta = self.pixel_data.deltas[index_map.position(axis)];
            if delta != 1 {
                return Err(CoreError::InvalidSlice(format!(
                    "data is not flat along {}: delta is {delta}",
                    axis.symbol()
                )));
            }
        }
        Ok(())
    }

    fn axis_value(&self, values: &[usize], axis: Axis) -> Result<usize> {
        let index_map = normalize(&self.dimension_order)?;
        values
            .get(index_map.position(axis))
            .copied()
            .ok_or_else(|| CoreError::InvalidSlice(format!("missing {} entry", axis.symbol())))
    }

    pub fn offset(&self, axis: Axis) -> Result<usize> {
        self.axis_value(&self.pixel_data.offsets, axis)
    }

    pub fn delta(&self, axis: Axis) -> Result<usize> {
        self.axis_value(&self.pixel_data.deltas, axis)
    }

    pub fn size(&self, axis: Axis) -> Result<usize> {
        self.axis_value(&self.pixel_data.shape, axis)
    }

    /// The plane's `[z, c, t]` coordinate.
    pub fn zct(&self) -> Result<[usize; 3]> {
        Ok([
            self.offset(Axis::Z)?,
            self.offset(Axis::Channel)?,
            self.offset(Axis::Time)?,
        ])
    }

    /// Decodes the payload into a `[y, x]` array of sample values.
    pub fn xy_plane(&self) -> Result<Array2<f64>> {
        self.validate()?;
        let width = self.delta(Axis::X)?;
        let height = self.delta(Axis::Y)?;
        let slice = &self.pixel_data;
        let values = if slice.little_endian {
            decode_samples::<LittleEndian>(slice.dtype, &slice.data)
        } else {
            decode_samples::<BigEndian>(slice.dtype, &slice.data)
        };
        Array2::from_shape_vec((height, width), values)
            .map_err(|error| CoreError::InvalidSlice(error.to_string()))
    }
}

fn decode_samples<B: ByteOrder>(dtype: PixelType, data: &[u8]) -> Vec<f64> {
    data.chunks_exact(dtype.bytes_per_sample())
        .map(|chunk| match dtype {
            PixelType::Int8 => f64::from(chunk[0] as i8),
            PixelType::Uint8 => f64::from(chunk[0]),
            PixelType::Int16 => f64::from(B::read_i16(chunk)),
            PixelType::Uint16 => f64::from(B::read_u16(chunk)),
            PixelType::Int32 => f64::from(B::read_i32(chunk)),
            PixelType::Uint32 => f64::from(B::read_u32(chunk)),
            PixelType::Float32 => f64::from(B::read_f32(chunk)),
            PixelType::Float64 => B::read_f64(chunk),
        })
        .collect()
}
