mod api;
mod container;
mod decoder;
mod error;
mod memory;
mod tiff;
mod util;

#[cfg(test)]
mod tests;

pub use api::{open_image, save_plane_png, supported_formats};
pub use container::{
    CONTAINER_EXTENSION, CONTAINER_MAGIC, ContainerReader, ContainerSchema, ContainerWriter,
    read_container,
};
pub use decoder::{DecoderOpener, ImageDecoder};
pub use error::{IoError, Result};
pub use memory::{SyntheticImage, SyntheticImages, SyntheticSeries};
pub use self::tiff::{TiffDecoder, TiffOpener};
pub use util::{container_path, record_name, series_name};
