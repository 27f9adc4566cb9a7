use std::path::Path;

use tracing::{debug, info, warn};

use crate::formats::{ContainerSchema, ContainerWriter, ImageDecoder};
use crate::model::PlaneRecord;

use super::{PlaneError, PlaneFilter, PlaneRect, Result, SliceBuilder};

/// Builds every plane of `series` in ascending order and hands the kept ones to `emit`.
///
/// Returns the number of records emitted. Filtered-out planes are skipped silently.
pub fn for_each_plane<D, F>(
    builder: &mut SliceBuilder<D>,
    series: usize,
    name: &str,
    rect: PlaneRect,
    filter: &PlaneFilter,
    mut emit: F,
) -> Result<usize>
where
    D: ImageDecoder,
    F: FnMut(PlaneRecord) -> Result<()>,
{
    builder.set_series(series)?;
    let mut emitted = 0;
    for plane in 0..builder.planes_per_series() {
        if let Some(record) = builder.build(name, plane, rect, filter)? {
            emit(record)?;
            emitted += 1;
        }
    }
    Ok(emitted)
}

/// Writes one series to a container at `path`.
///
/// The container is created by the first kept plane, so a fully filtered
/// series produces no file. On failure the partial container is removed.
pub fn write_series<D: ImageDecoder>(
    builder: &mut SliceBuilder<D>,
    series: usize,
    name: &str,
    path: &Path,
    rect: PlaneRect,
    filter: &PlaneFilter,
) -> Result<usize> {
    let mut writer: Option<ContainerWriter> = None;
    let outcome = for_each_plane(builder, series, name, rect, filter, |record| {
        if writer.is_none() {
            let created = ContainerWriter::create(&ContainerSchema::plane_record(), path)
                .map_err(PlaneError::Container)?;
            info!("Writing to {}", path.display());
            writer = Some(created);
        }
        if let Some(container) = writer.as_mut() {
            container.append(&record).map_err(PlaneError::Container)?;
        }
        Ok(())
    });

    match (outcome, writer) {
        (Ok(count), Some(container)) => {
            container.finish().map_err(PlaneError::Container)?;
            Ok(count)
        }
        (Ok(_), None) => {
            debug!(series, name, "every plane filtered out, no container written");
            Ok(0)
        }
        (Err(error), Some(container)) => {
            if let Err(discard_error) = container.discard() {
                warn!(
                    path = %path.display(),
                    %discard_error,
                    "could not remove partial container"
                );
            }
            Err(error)
        }
        (Err(error), None) => Err(error),
    }
}
