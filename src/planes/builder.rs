use tracing::debug;

use crate::formats::ImageDecoder;
use crate::model::{ArraySlice, Axis, AxisIndexMap, N_DIM, PlaneRecord, normalize};

use super::{PlaneError, PlaneFilter, PlaneRect, Result};

/// Turns decoder planes into [`PlaneRecord`]s described in the reader's dimension order.
///
/// The builder owns the decoder and is the only place that changes its
/// active series; order, index map and shape are refreshed on every switch.
#[derive(Debug)]
pub struct SliceBuilder<D> {
    decoder: D,
    series: usize,
    dimension_order: String,
    index_map: AxisIndexMap,
    shape: [usize; N_DIM],
}

impl<D: ImageDecoder> SliceBuilder<D> {
    pub fn new(decoder: D) -> Result<Self> {
        let series = decoder.series();
        let mut builder = Self {
            decoder,
            series,
            dimension_order: String::new(),
            index_map: AxisIndexMap::default(),
            shape: [0; N_DIM],
        };
        builder.load_series(series)?;
        Ok(builder)
    }

    /// Makes `series` the active series; a no-op when it already is.
    pub fn set_series(&mut self, series: usize) -> Result<()> {
        if self.series == series {
            return Ok(());
        }
        self.load_series(series)
    }

    fn load_series(&mut self, series: usize) -> Result<()> {
        self.decoder.set_series(series)?;
        if self.decoder.is_rgb() || self.decoder.is_interleaved() {
            return Err(PlaneError::UnsupportedLayout(format!(
                "series {series} has RGB or interleaved samples; planes must hold one sample per pixel"
            )));
        }
        let dimension_order = self.decoder.dimension_order();
        let index_map = normalize(&dimension_order)?;
        let canonical_shape = Axis::ALL.map(|axis| self.decoder.size(axis));
        self.shape = index_map.to_reported(canonical_shape);
        self.index_map = index_map;
        self.dimension_order = dimension_order;
        self.series = series;
        debug!(
            series,
            order = %self.dimension_order,
            shape = ?self.shape,
            "switched active series"
        );
        Ok(())
    }

    pub fn series(&self) -> usize {
        self.series
    }

    pub fn series_count(&self) -> usize {
        self.decoder.series_count()
    }

    pub fn planes_per_series(&self) -> usize {
        self.decoder.image_count()
    }

    pub fn dimension_order(&self) -> &str {
        &self.dimension_order
    }

    pub fn index_map(&self) -> AxisIndexMap {
        self.index_map
    }

    /// Full extent of the active series, in reported order.
    pub fn shape(&self) -> [usize; N_DIM] {
        self.shape
    }

    pub fn size(&self, axis: Axis) -> usize {
        self.shape[self.index_map.position(axis)]
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Builds the record for `plane` of the active series.
    ///
    /// Returns `Ok(None)` when the plane's depth or time index is excluded by
    /// `filter`. Otherwise performs exactly one decoder read.
    pub fn build(
        &mut self,
        name: &str,
        plane: usize,
        rect: PlaneRect,
        filter: &PlaneFilter,
    ) -> Result<Option<PlaneRecord>> {
        let count = self.planes_per_series();
        if plane >= count {
            return Err(PlaneError::PlaneOutOfRange {
                plane,
                count,
                series: self.series,
            });
        }
        let (size_x, size_y) = (self.size(Axis::X), self.size(Axis::Y));
        let (width, height) = rect.resolve(size_x, size_y);
        let outside = |origin: usize, extent: usize, size: usize| {
            origin.checked_add(extent).is_none_or(|end| end > size)
        };
        if outside(rect.x, width, size_x) || outside(rect.y, height, size_y) {
            return Err(PlaneError::InvalidRect(format!(
                "({}, {}, {width}, {height}) does not fit in a {size_x}x{size_y} plane",
                rect.x, rect.y
            )));
        }

        let [z, c, t] = self.decoder.zct_coords(plane)?;
        if !filter.accepts(z, t) {
            return Ok(None);
        }

        let offsets = self.index_map.to_reported([rect.x, rect.y, z, c, t]);
        let deltas = self.index_map.to_reported([width, height, 1, 1, 1]);
        let dtype = self.decoder.pixel_type()?;
        let little_endian = self.decoder.is_little_endian();
        let data = self
            .decoder
            .read_bytes(plane, rect.x, rect.y, width, height)?;

        Ok(Some(PlaneRecord {
            name: name.to_string(),
            series: self.series,
            dimension_order: self.dimension_order.clone(),
            pixel_data: ArraySlice {
                dtype,
                little_endian,
                shape: self.shape.to_vec(),
                offsets: offsets.to_vec(),
                deltas: deltas.to_vec(),
                data,
            },
        }))
    }

    /// Releases the decoder handle.
    pub fn close(mut self) -> Result<()> {
        self.decoder.close()?;
        Ok(())
    }
}
