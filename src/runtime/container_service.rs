use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::formats::{ContainerReader, ContainerSchema, save_plane_png};
use crate::model::{PixelType, PlaneRecord};

use super::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSummary {
    pub name: String,
    pub series: usize,
    pub dimension_order: String,
    pub dtype: PixelType,
    pub offsets: Vec<usize>,
    pub deltas: Vec<usize>,
    pub bytes: usize,
}

impl From<&PlaneRecord> for RecordSummary {
    fn from(record: &PlaneRecord) -> Self {
        Self {
            name: record.name.clone(),
            series: record.series,
            dimension_order: record.dimension_order.clone(),
            dtype: record.pixel_data.dtype,
            offsets: record.pixel_data.offsets.clone(),
            deltas: record.pixel_data.deltas.clone(),
            bytes: record.pixel_data.data.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSummary {
    pub path: PathBuf,
    pub schema: ContainerSchema,
    pub records: Vec<RecordSummary>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ContainerService;

impl ContainerService {
    /// Reads every record of a container, validating each one.
    pub fn dump(&self, path: impl AsRef<Path>) -> Result<ContainerSummary> {
        let path = path.as_ref();
        let mut reader = ContainerReader::open(path)?;
        let mut records = Vec::new();
        while let Some(record) = reader.read_record()? {
            record.validate()?;
            records.push(RecordSummary::from(&record));
        }
        Ok(ContainerSummary {
            path: path.to_path_buf(),
            schema: reader.schema().clone(),
            records,
        })
    }

    /// Writes record `index` of the container as a grayscale PNG preview.
    pub fn export_png(
        &self,
        path: impl AsRef<Path>,
        index: usize,
        output: impl AsRef<Path>,
    ) -> Result<PlaneRecord> {
        let mut reader = ContainerReader::open(path)?;
        let mut count = 0;
        while let Some(record) = reader.read_record()? {
            if count == index {
                record.validate()?;
                save_plane_png(&record, output.as_ref())?;
                return Ok(record);
            }
            count += 1;
        }
        Err(AppError::RecordNotFound { index, count })
    }
}
