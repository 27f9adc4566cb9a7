use tracing::{debug, warn};

use crate::formats::{DecoderOpener, ImageDecoder, record_name, series_name};
use crate::model::{PlaneRecord, SeriesMetadata, SplitDescriptor};
use crate::planes::{PlaneFilter, PlaneRect, SliceBuilder};

use super::{Result, SplitError};

/// Maps a global plane index to `(series, local_plane)`, assuming every
/// series holds `planes_per_series` planes.
pub fn locate(global: usize, planes_per_series: usize) -> (usize, usize) {
    if planes_per_series == 0 {
        return (0, global);
    }
    (global / planes_per_series, global % planes_per_series)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolverState {
    Uninitialized,
    Active,
    Exhausted,
}

/// Consumes one split, one plane per call, with its own decoder handle.
pub struct SplitResolver<D: ImageDecoder> {
    rect: PlaneRect,
    state: ResolverState,
    builder: Option<SliceBuilder<D>>,
    name: String,
    planes_per_series: usize,
    cursor: usize,
    remaining: usize,
    length: usize,
}

impl<D: ImageDecoder> SplitResolver<D> {
    pub fn new(rect: PlaneRect) -> Self {
        Self {
            rect,
            state: ResolverState::Uninitialized,
            builder: None,
            name: String::new(),
            planes_per_series: 0,
            cursor: 0,
            remaining: 0,
            length: 0,
        }
    }

    /// Opens the split's file and positions the cursor at its first plane.
    ///
    /// Re-initializing releases any decoder held for a previous split.
    pub fn initialize<O>(&mut self, opener: &O, split: &SplitDescriptor) -> Result<()>
    where
        O: DecoderOpener<Decoder = D>,
    {
        self.close()?;
        let decoder = opener.open(&split.path)?;
        let builder = SliceBuilder::new(decoder)?;
        let planes_per_series = builder.planes_per_series();
        let series_count = builder.series_count();
        if split.length > 0 && planes_per_series == 0 {
            builder.close()?;
            return Err(SplitError::EmptySeries {
                path: split.path.clone(),
            });
        }
        let Some(total) = SeriesMetadata::new(series_count, planes_per_series).total_planes() else {
            builder.close()?;
            return Err(SplitError::TooManyPlanes {
                path: split.path.clone(),
                series_count,
                planes_per_series,
            });
        };
        if split.end().is_none_or(|end| end > total) {
            builder.close()?;
            return Err(SplitError::OutOfBounds {
                path: split.path.clone(),
                start: split.start,
                length: split.length,
                total,
            });
        }
        self.name = record_name(&split.path);
        self.planes_per_series = planes_per_series;
        self.cursor = split.start;
        self.remaining = split.length;
        self.length = split.length;
        self.builder = Some(builder);
        self.state = ResolverState::Active;
        debug!(
            path = %split.path.display(),
            start = split.start,
            length = split.length,
            planes_per_series,
            "initialized split"
        );
        Ok(())
    }

    pub fn state(&self) -> ResolverState {
        self.state
    }

    /// Global index of the next plane to resolve.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Builds the next record of the split, or `None` once it is exhausted.
    pub fn advance(&mut self) -> Result<Option<PlaneRecord>> {
        match self.state {
            ResolverState::Uninitialized => return Err(SplitError::NotInitialized),
            ResolverState::Exhausted => return Ok(None),
            ResolverState::Active => {}
        }
        if self.remaining == 0 {
            self.state = ResolverState::Exhausted;
            return Ok(None);
        }
        let (series, local) = locate(self.cursor, self.planes_per_series);
        match self.resolve(series, local) {
            Ok(record) => {
                self.cursor += 1;
                self.remaining -= 1;
                Ok(record)
            }
            Err(error) => {
                self.state = ResolverState::Exhausted;
                Err(error)
            }
        }
    }

    fn resolve(&mut self, series: usize, local: usize) -> Result<Option<PlaneRecord>> {
        let builder = self.builder.as_mut().ok_or(SplitError::NotInitialized)?;
        builder.set_series(series)?;
        let record = builder.build(
            &series_name(&self.name, series),
            local,
            self.rect,
            &PlaneFilter::all(),
        )?;
        Ok(record)
    }

    /// Fraction of the split consumed so far, in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.length == 0 {
            return 1.0;
        }
        (self.length - self.remaining) as f32 / self.length as f32
    }

    /// Releases the decoder. Safe to call repeatedly.
    pub fn close(&mut self) -> Result<()> {
        if let Some(builder) = self.builder.take() {
            builder.close()?;
            debug!(name = %self.name, "closed split decoder");
        }
        if self.state == ResolverState::Active {
            self.state = ResolverState::Exhausted;
        }
        Ok(())
    }
}

impl<D: ImageDecoder> Iterator for SplitResolver<D> {
    type Item = Result<PlaneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ResolverState::Exhausted {
            return None;
        }
        self.advance().transpose()
    }
}

impl<D: ImageDecoder> Drop for SplitResolver<D> {
    fn drop(&mut self) {
        if let Err(error) = self.close() {
            warn!(%error, "failed to close split decoder");
        }
    }
}
