use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::model::PlaneRecord;

use super::{IoError, Result};

pub const CONTAINER_MAGIC: &[u8; 8] = b"BIMGPLN1";
pub const CONTAINER_EXTENSION: &str = "bimg";

/// Schema header stored once at the start of every container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerSchema {
    pub record: String,
    pub version: u32,
    pub fields: Vec<String>,
}

impl ContainerSchema {
    pub fn plane_record() -> Self {
        Self {
            record: "PlaneRecord".to_string(),
            version: 1,
            fields: [
                "name",
                "series",
                "dimension_order",
                "pixel_data.dtype",
                "pixel_data.little_endian",
                "pixel_data.shape",
                "pixel_data.offsets",
                "pixel_data.deltas",
                "pixel_data.data",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

/// Appends [`PlaneRecord`]s to a container file.
///
/// Layout: magic, `u32` schema length, schema JSON, then per record a `u32`
/// header length, header JSON, `u64` payload length and the raw payload.
/// All integers are little-endian.
pub struct ContainerWriter<W: Write = BufWriter<File>> {
    path: PathBuf,
    writer: W,
    records: usize,
}

impl ContainerWriter {
    pub fn create(schema: &ContainerSchema, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Self::with_sink(schema, path, BufWriter::new(file))
    }
}

impl<W: Write> ContainerWriter<W> {
    /// Writes the header to `sink`; `path` names the file behind it, removed on discard.
    pub(crate) fn with_sink(schema: &ContainerSchema, path: &Path, mut sink: W) -> Result<Self> {
        let header = sink
            .write_all(CONTAINER_MAGIC)
            .map_err(IoError::from)
            .and_then(|()| write_block(&mut sink, &serde_json::to_vec(schema)?));
        let writer = Self {
            path: path.to_path_buf(),
            writer: sink,
            records: 0,
        };
        match header {
            Ok(()) => Ok(writer),
            Err(error) => {
                writer.discard()?;
                Err(error)
            }
        }
    }

    pub fn append(&mut self, record: &PlaneRecord) -> Result<()> {
        write_block(&mut self.writer, &serde_json::to_vec(record)?)?;
        self.writer
            .write_u64::<LittleEndian>(record.pixel_data.data.len() as u64)?;
        self.writer.write_all(&record.pixel_data.data)?;
        self.records += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flushes the container and returns the number of records written.
    ///
    /// When the flush fails the truncated file is removed before the error is returned.
    pub fn finish(mut self) -> Result<usize> {
        match self.writer.flush() {
            Ok(()) => Ok(self.records),
            Err(error) => {
                if let Err(discard_error) = self.discard() {
                    warn!(%discard_error, "could not remove unflushed container");
                }
                Err(error.into())
            }
        }
    }

    /// Drops the partially written container from disk.
    pub fn discard(self) -> Result<()> {
        let Self { path, writer, .. } = self;
        drop(writer);
        fs::remove_file(path)?;
        Ok(())
    }
}

fn write_block(writer: &mut impl Write, block: &[u8]) -> Result<()> {
    let len = u32::try_from(block.len())
        .map_err(|_| IoError::Container(format!("header of {} bytes is too large", block.len())))?;
    writer.write_u32::<LittleEndian>(len)?;
    writer.write_all(block)?;
    Ok(())
}

fn read_block(reader: &mut impl Read) -> Result<Vec<u8>> {
    let len = reader.read_u32::<LittleEndian>()? as usize;
    let mut block = vec![0_u8; len];
    reader
        .read_exact(&mut block)
        .map_err(|error| IoError::Container(format!("truncated header block: {error}")))?;
    Ok(block)
}

/// Sequential reader over a container written by [`ContainerWriter`].
pub struct ContainerReader {
    reader: BufReader<File>,
    schema: ContainerSchema,
}

impl ContainerReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);
        let mut magic = [0_u8; 8];
        reader
            .read_exact(&mut magic)
            .map_err(|_| IoError::Container("file too short for a container header".into()))?;
        if &magic != CONTAINER_MAGIC {
            return Err(IoError::Container(format!(
                "bad magic bytes {magic:02x?} in {}",
                path.as_ref().display()
            )));
        }
        let schema = serde_json::from_slice(&read_block(&mut reader)?)?;
        Ok(Self { reader, schema })
    }

    pub fn schema(&self) -> &ContainerSchema {
        &self.schema
    }

    /// Reads the next record, or `None` at a clean end of file.
    pub fn read_record(&mut self) -> Result<Option<PlaneRecord>> {
        if self.reader.fill_buf()?.is_empty() {
            return Ok(None);
        }
        let mut record: PlaneRecord = serde_json::from_slice(&read_block(&mut self.reader)?)?;
        let len = self.reader.read_u64::<LittleEndian>()? as usize;
        let mut data = vec![0_u8; len];
        self.reader
            .read_exact(&mut data)
            .map_err(|error| IoError::Container(format!("truncated payload: {error}")))?;
        record.pixel_data.data = data;
        Ok(Some(record))
    }
}

impl Iterator for ContainerReader {
    type Item = Result<PlaneRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_record().transpose()
    }
}

pub fn read_container(path: impl AsRef<Path>) -> Result<(ContainerSchema, Vec<PlaneRecord>)> {
    let mut reader = ContainerReader::open(path)?;
    let mut records = Vec::new();
    while let Some(record) = reader.read_record()? {
        records.push(record);
    }
    Ok((reader.schema().clone(), records))
}
