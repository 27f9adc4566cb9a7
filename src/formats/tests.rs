use std::fs::File;
use std::io::Write;
use std::path::Path;

use tempfile::tempdir;
use tiff::encoder::{TiffEncoder, colortype};
use tiff::tags::Tag;

use super::{
    ContainerReader, ContainerSchema, ContainerWriter, DecoderOpener, ImageDecoder, IoError,
    SyntheticImage, SyntheticImages, SyntheticSeries, TiffOpener, container_path, open_image,
    read_container, record_name, save_plane_png, series_name,
};
use crate::model::{ArraySlice, Axis, CoreError, PixelType, PlaneRecord};

fn write_gray16_stack(path: &Path, width: u32, height: u32, pages: usize, description: Option<&str>) {
    let file = File::create(path).expect("create tiff");
    let mut encoder = TiffEncoder::new(file).expect("encoder");
    for page in 0..pages {
        let data = (0..width * height)
            .map(|index| (page as u16) * 1000 + index as u16)
            .collect::<Vec<_>>();
        let mut image = encoder
            .new_image::<colortype::Gray16>(width, height)
            .expect("image");
        if let Some(text) = description {
            image
                .encoder()
                .write_tag(Tag::ImageDescription, text)
                .expect("description");
        }
        image.write_data(&data).expect("write page");
    }
}

fn sample_record(data: Vec<u8>) -> PlaneRecord {
    PlaneRecord {
        name: "stack_0".to_string(),
        series: 0,
        dimension_order: "XYZCT".to_string(),
        pixel_data: ArraySlice {
            dtype: PixelType::Uint8,
            little_endian: true,
            shape: vec![2, 2, 3, 1, 1],
            offsets: vec![0, 0, 1, 0, 0],
            deltas: vec![2, 2, 1, 1, 1],
            data,
        },
    }
}

#[test]
fn tiff_pages_become_depth_planes() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("stack.tif");
    write_gray16_stack(&path, 4, 3, 5, None);

    let mut decoder = open_image(&path).expect("open");
    assert_eq!(decoder.series_count(), 1);
    assert_eq!(decoder.dimension_order(), "XYZCT");
    assert_eq!(decoder.size(Axis::X), 4);
    assert_eq!(decoder.size(Axis::Y), 3);
    assert_eq!(decoder.size(Axis::Z), 5);
    assert_eq!(decoder.image_count(), 5);
    assert_eq!(decoder.pixel_type().expect("pixel type"), PixelType::Uint16);
    assert!(!decoder.is_rgb());
    assert_eq!(decoder.zct_coords(3).expect("coords"), [3, 0, 0]);

    let bytes = decoder.read_bytes(2, 1, 1, 2, 2).expect("read");
    let values = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect::<Vec<_>>();
    assert_eq!(values, vec![2005, 2006, 2009, 2010]);

    assert!(decoder.read_bytes(0, 3, 0, 2, 1).is_err());
    decoder.close().expect("close");
    assert!(decoder.read_bytes(0, 0, 0, 1, 1).is_err());
}

#[test]
fn imagej_hyperstack_maps_channels_first() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("hyper.tiff");
    let description = "ImageJ=1.54f\nimages=6\nchannels=2\nslices=3\nframes=1\nhyperstack=true\n";
    write_gray16_stack(&path, 2, 2, 6, Some(description));

    let decoder = TiffOpener.open(&path).expect("open");
    assert_eq!(decoder.dimension_order(), "XYCZT");
    assert_eq!(decoder.size(Axis::Z), 3);
    assert_eq!(decoder.size(Axis::Channel), 2);
    assert_eq!(decoder.size(Axis::Time), 1);
    assert_eq!(decoder.zct_coords(1).expect("coords"), [0, 1, 0]);
    assert_eq!(decoder.zct_coords(4).expect("coords"), [2, 0, 0]);
}

#[test]
fn tiff_sample_format_selects_pixel_type() {
    let dir = tempdir().expect("tempdir");
    let signed = dir.path().join("signed.tif");
    let floats = dir.path().join("floats.tif");
    let wide = dir.path().join("wide.tif");
    {
        let mut encoder = TiffEncoder::new(File::create(&signed).expect("create")).expect("encoder");
        encoder
            .write_image::<colortype::GrayI16>(2, 2, &[-4, -3, 2, 1])
            .expect("write");
        let mut encoder = TiffEncoder::new(File::create(&floats).expect("create")).expect("encoder");
        encoder
            .write_image::<colortype::Gray32Float>(2, 1, &[0.5, -1.5])
            .expect("write");
        let mut encoder = TiffEncoder::new(File::create(&wide).expect("create")).expect("encoder");
        encoder
            .write_image::<colortype::Gray64>(1, 1, &[7])
            .expect("write");
    }

    let mut decoder = TiffOpener.open(&signed).expect("open");
    assert_eq!(decoder.pixel_type().expect("pixel type"), PixelType::Int16);
    let bytes = decoder.read_bytes(0, 0, 0, 1, 1).expect("read");
    assert_eq!(i16::from_le_bytes([bytes[0], bytes[1]]), -4);

    let decoder = TiffOpener.open(&floats).expect("open");
    assert_eq!(decoder.pixel_type().expect("pixel type"), PixelType::Float32);

    let decoder = TiffOpener.open(&wide).expect("open");
    let error = decoder.pixel_type().expect_err("must fail");
    assert!(matches!(error, IoError::Core(CoreError::UnknownPixelType(ref label)) if label == "u64"));
}

#[test]
fn opener_rejects_unknown_extensions() {
    let error = TiffOpener
        .open(Path::new("/data/image.czi"))
        .expect_err("must fail");
    assert!(matches!(error, IoError::UnsupportedFormat(ext) if ext == "czi"));
}

#[test]
fn synthetic_image_reads_requested_region() {
    let series = SyntheticSeries::new("XYZCT", [6, 4, 2, 1, 1], PixelType::Uint16);
    let mut image = SyntheticImage::new(vec![series.clone(), series]);
    image.set_series(1).expect("series");
    let bytes = image.read_bytes(1, 2, 1, 3, 2).expect("read");
    assert_eq!(bytes.len(), 3 * 2 * 2);
    assert_eq!(bytes[0], SyntheticImage::sample_byte(1, 1, 2, 1, 0));
    assert_eq!(bytes[11], SyntheticImage::sample_byte(1, 1, 4, 2, 1));
    assert_eq!(image.read_count(), 1);
    assert!(image.set_series(2).is_err());

    let images = SyntheticImages::new().with("/data/a.tiff", image);
    assert!(images.open(Path::new("/data/a.tiff")).is_ok());
    assert!(images.open(Path::new("/data/b.tiff")).is_err());
}

#[test]
fn container_preserves_records_and_payloads() {
    let dir = tempdir().expect("tempdir");
    let path = container_path(dir.path(), "stack_0");
    assert_eq!(path.file_name().expect("name"), "stack_0.bimg");

    let first = sample_record(vec![1, 2, 3, 4]);
    let mut second = sample_record(vec![5, 6, 7, 8]);
    second.pixel_data.offsets[2] = 2;

    let mut writer = ContainerWriter::create(&ContainerSchema::plane_record(), &path).expect("create");
    writer.append(&first).expect("append");
    writer.append(&second).expect("append");
    assert_eq!(writer.finish().expect("finish"), 2);

    let (schema, records) = read_container(&path).expect("read");
    assert_eq!(schema, ContainerSchema::plane_record());
    assert_eq!(records, vec![first, second]);
}

#[test]
fn discarded_container_leaves_no_file() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("partial.bimg");
    let mut writer = ContainerWriter::create(&ContainerSchema::plane_record(), &path).expect("create");
    writer.append(&sample_record(vec![0; 4])).expect("append");
    writer.discard().expect("discard");
    assert!(!path.exists());
}

/// Accepts every write but fails to flush, like a full disk.
struct FullDisk(Vec<u8>);

impl Write for FullDisk {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Err(std::io::Error::other("no space left on device"))
    }
}

#[test]
fn failed_flush_removes_container() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("unflushed.bimg");
    std::fs::write(&path, b"").expect("placeholder");
    let mut writer =
        ContainerWriter::with_sink(&ContainerSchema::plane_record(), &path, FullDisk(Vec::new()))
            .expect("create");
    writer.append(&sample_record(vec![0; 4])).expect("append");
    assert_eq!(writer.records_written(), 1);

    let error = writer.finish().expect_err("must fail");
    assert!(matches!(error, IoError::Io(_)));
    assert!(!path.exists());
}

#[test]
fn container_reader_rejects_foreign_files() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("not-a-container.bimg");
    std::fs::write(&path, b"PNG\x0d\x0a\x1a\x0a0000").expect("write");
    let error = ContainerReader::open(&path).err().expect("must fail");
    assert!(matches!(error, IoError::Container(_)));
}

#[test]
fn naming_follows_input_path() {
    let name = record_name(Path::new("/data/run1/cells.ome.tiff"));
    assert_eq!(name, "cells.ome");
    assert_eq!(series_name(&name, 3), "cells.ome_3");
}

#[test]
fn plane_png_export() {
    let dir = tempdir().expect("tempdir");
    let output = dir.path().join("plane.png");
    save_plane_png(&sample_record(vec![0, 50, 100, 255]), &output).expect("png");
    let restored = image::open(&output).expect("open png").to_luma8();
    assert_eq!(restored.dimensions(), (2, 2));
    assert_eq!(restored.get_pixel(1, 1).0[0], 255);
}
