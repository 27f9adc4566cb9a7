use tempfile::tempdir;

use crate::formats::{IoError, SyntheticImage, SyntheticImages, SyntheticSeries};
use crate::model::PixelType;
use crate::planes::{PlaneError, PlaneFilter, PlaneRect};

use super::{AppError, ContainerService, ConvertService, SplitService};

fn series(order: &str) -> SyntheticSeries {
    SyntheticSeries::new(order, [6, 4, 3, 2, 1], PixelType::Uint8)
}

#[test]
fn info_reports_every_series() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cells.ome.tif");
    let opener = SyntheticImages::new().with(
        &path,
        SyntheticImage::new(vec![series("XYZCT"), series("TCZYX")]),
    );
    let info = ConvertService::with_opener(opener).info(&path).expect("info");
    assert_eq!(info.name, "cells.ome");
    assert_eq!(info.series.len(), 2);
    assert_eq!(info.series[0].shape, vec![6, 4, 3, 2, 1]);
    assert_eq!(info.series[1].shape, vec![1, 2, 3, 4, 6]);
    assert_eq!(info.series[1].planes, 6);
}

#[test]
fn convert_writes_one_container_per_series() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cells.tif");
    let opener = SyntheticImages::new().with(
        &path,
        SyntheticImage::new(vec![series("XYZCT"), series("XYCZT")]),
    );
    let service = ConvertService::with_opener(opener);
    let out = dir.path().join("out");
    let filter = PlaneFilter::all().with_depths([0, 2]);
    let report = service
        .convert(&path, &out, PlaneRect::full(), &filter)
        .expect("convert");
    assert_eq!(
        report.containers,
        vec![(out.join("cells_0.bimg"), 4), (out.join("cells_1.bimg"), 4)]
    );
    assert_eq!(report.total_records(), 8);

    let summary = ContainerService.dump(out.join("cells_1.bimg")).expect("dump");
    assert_eq!(summary.records.len(), 4);
    assert!(summary.records.iter().all(|record| record.name == "cells_1"));
    assert!(summary.records.iter().all(|record| record.bytes == 24));
}

#[test]
fn rejected_conversion_creates_no_output_dir() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("rgb.tif");
    let opener = SyntheticImages::new().with(
        &path,
        SyntheticImage::single(series("XYZCT")).with_rgb(true),
    );
    let out = dir.path().join("out");
    let error = ConvertService::with_opener(opener)
        .convert(&path, &out, PlaneRect::full(), &PlaneFilter::all())
        .expect_err("must fail");
    assert!(matches!(error, AppError::Plane(PlaneError::UnsupportedLayout(_))));
    assert!(!out.exists());
}

#[test]
fn single_series_conversion_rejects_multi_series_input() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cells.tif");
    let opener = SyntheticImages::new().with(
        &path,
        SyntheticImage::new(vec![series("XYZCT"), series("XYZCT")]),
    );
    let output = dir.path().join("cells.bimg");
    let error = ConvertService::with_opener(opener)
        .convert_single(&path, &output, PlaneRect::full(), &PlaneFilter::all())
        .expect_err("must fail");
    assert!(matches!(error, AppError::Io(IoError::UnsupportedLayout(_))));
    assert!(!output.exists());
}

#[test]
fn single_series_conversion_rejects_rgb_input() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("rgb.tif");
    let opener = SyntheticImages::new().with(
        &path,
        SyntheticImage::single(series("XYZCT")).with_rgb(true),
    );
    let output = dir.path().join("rgb.bimg");
    let error = ConvertService::with_opener(opener)
        .convert_single(&path, &output, PlaneRect::full(), &PlaneFilter::all())
        .expect_err("must fail");
    assert!(matches!(error, AppError::Io(IoError::UnsupportedLayout(_))));
    assert!(!output.exists());
}

#[test]
fn single_series_conversion_and_png_preview() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cells.tif");
    let opener = SyntheticImages::new().with(&path, SyntheticImage::single(series("XYZCT")));
    let output = dir.path().join("nested").join("cells.bimg");
    let written = ConvertService::with_opener(opener)
        .convert_single(&path, &output, PlaneRect::new(1, 1, 4, 2), &PlaneFilter::all())
        .expect("convert");
    assert_eq!(written, 6);

    let png = dir.path().join("plane.png");
    let record = ContainerService
        .export_png(&output, 5, &png)
        .expect("export");
    assert_eq!(record.name, "cells_0");
    let preview = image::open(&png).expect("png").to_luma8();
    assert_eq!(preview.dimensions(), (4, 2));

    let error = ContainerService
        .export_png(&output, 6, dir.path().join("missing.png"))
        .expect_err("must fail");
    assert!(matches!(error, AppError::RecordNotFound { index: 6, count: 6 }));
}

#[test]
fn split_service_plans_and_collects_metadata() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("cells.tif");
    let opener = SyntheticImages::new().with(
        &path,
        SyntheticImage::new(vec![series("XYZCT"), series("XYZCT")]),
    );
    let service = SplitService::with_opener(opener);
    let table = service.collect_metadata(&[path.clone()]).expect("collect");
    let table_path = dir.path().join("meta.tsv");
    table.save(&table_path).expect("save");

    let splits = service
        .plan(&[path.clone()], 5, Some(&table_path))
        .expect("plan");
    assert_eq!(
        splits
            .iter()
            .map(|split| (split.start, split.length))
            .collect::<Vec<_>>(),
        vec![(0, 5), (5, 5), (10, 2)]
    );
}
