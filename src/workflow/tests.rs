use std::path::PathBuf;

use tempfile::tempdir;

use crate::formats::{SyntheticImage, SyntheticImages, SyntheticSeries, read_container};
use crate::model::{PixelType, SeriesMetadata};
use crate::planes::PlaneRect;
use crate::splits::MetadataTable;

use super::{JobError, JobSpec, load_spec, plan_job, run_job, save_report, split_container_path};

fn image(order: &str) -> SyntheticImage {
    let series = SyntheticSeries::new(order, [8, 4, 5, 1, 2], PixelType::Uint16);
    SyntheticImage::new(vec![series.clone(), series])
}

fn job(inputs: Vec<PathBuf>, output_dir: PathBuf, planes_per_split: usize) -> JobSpec {
    JobSpec {
        name: Some("test".to_string()),
        inputs,
        planes_per_split,
        metadata: None,
        output_dir,
        rect: None,
    }
}

#[test]
fn job_writes_one_container_per_split() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("cells.tif");
    let opener = SyntheticImages::new().with(&input, image("XYZCT"));
    let spec = job(vec![input.clone()], dir.path().join("out"), 7);

    let report = run_job(&spec, &opener).expect("job");
    assert_eq!(report.inputs, 1);
    assert_eq!(report.total_records, 20);
    assert_eq!(
        report.splits.iter().map(|split| split.records).collect::<Vec<_>>(),
        vec![7, 7, 6]
    );

    let last = &report.splits[2];
    let container = last.container.clone().expect("container");
    assert_eq!(container, dir.path().join("out").join("cells_split14.bimg"));
    assert_eq!(container, split_container_path(&spec.output_dir, &last.split));
    let (schema, records) = read_container(&container).expect("read");
    assert_eq!(schema.record, "PlaneRecord");
    assert_eq!(
        records.iter().map(|record| record.series).collect::<Vec<_>>(),
        vec![1; 6]
    );
    assert!(records.iter().all(|record| record.name == "cells_1"));
    for record in &records {
        record.validate().expect("valid");
    }
    let first_plane = records[0].zct().expect("zct");
    assert_eq!(first_plane, [4, 0, 0]);
}

#[test]
fn rectangle_applies_to_every_split() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("cells.tif");
    let opener = SyntheticImages::new().with(&input, image("TCZYX"));
    let mut spec = job(vec![input], dir.path().join("out"), 0);
    spec.rect = Some(PlaneRect::new(2, 1, 3, 2));

    let report = run_job(&spec, &opener).expect("job");
    assert_eq!(report.splits.len(), 2);
    for split in &report.splits {
        let container = split.container.clone().expect("container");
        let (_, records) = read_container(container).expect("read");
        assert_eq!(records.len(), 10);
        for record in records {
            assert_eq!(&record.pixel_data.deltas[3..], &[2, 3]);
            assert_eq!(&record.pixel_data.offsets[3..], &[1, 2]);
            assert_eq!(record.pixel_data.data.len(), 3 * 2 * 2);
        }
    }
}

#[test]
fn metadata_table_drives_planning() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("cells.tif");
    let opener = SyntheticImages::new().with(&input, image("XYZCT"));
    let mut table = MetadataTable::new();
    table.insert(&input, SeriesMetadata::new(1, 10));
    let table_path = dir.path().join("meta.tsv");
    table.save(&table_path).expect("save");

    let mut spec = job(vec![input], dir.path().join("out"), 4);
    spec.metadata = Some(table_path);
    let splits = plan_job(&spec, &opener).expect("plan");
    assert_eq!(
        splits.iter().map(|split| split.length).collect::<Vec<_>>(),
        vec![4, 4, 2]
    );
}

#[test]
fn failing_split_leaves_no_partial_container() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("mixed.tif");
    let mixed = SyntheticImage::new(vec![
        SyntheticSeries::new("XYZCT", [8, 4, 5, 1, 2], PixelType::Uint8),
        SyntheticSeries::new("XYZCT", [3, 3, 10, 1, 1], PixelType::Uint8),
    ]);
    let opener = SyntheticImages::new().with(&input, mixed);
    let mut spec = job(vec![input.clone()], dir.path().join("out"), 20);
    spec.rect = Some(PlaneRect::new(0, 0, 4, 4));

    let error = run_job(&spec, &opener).expect_err("must fail");
    assert!(matches!(error, JobError::Split { start: 0, .. }));
    let partial = dir.path().join("out").join("mixed_split0.bimg");
    assert!(!partial.exists());
}

#[test]
fn duplicate_record_names_are_rejected() {
    let dir = tempdir().expect("tempdir");
    let first = dir.path().join("a").join("cells.tif");
    let second = dir.path().join("b").join("cells.tiff");
    let opener = SyntheticImages::new()
        .with(&first, image("XYZCT"))
        .with(&second, image("XYZCT"));
    let spec = job(vec![first, second], dir.path().join("out"), 0);
    let error = run_job(&spec, &opener).expect_err("must fail");
    assert!(matches!(error, JobError::DuplicateName { .. }));
}

#[test]
fn spec_and_report_round_trip_through_yaml() {
    let dir = tempdir().expect("tempdir");
    let input = dir.path().join("cells.tif");
    let spec_path = dir.path().join("job.yaml");
    std::fs::write(
        &spec_path,
        format!(
            "name: yaml-job\ninputs:\n  - {}\nplanes_per_split: 5\noutput_dir: {}\nrect:\n  x: 1\n  y: 1\n  width: 2\n",
            input.display(),
            dir.path().join("out").display()
        ),
    )
    .expect("write spec");

    let spec = load_spec(&spec_path).expect("load");
    assert_eq!(spec.name.as_deref(), Some("yaml-job"));
    assert_eq!(spec.planes_per_split, 5);
    assert_eq!(spec.rect().width, Some(2));
    assert_eq!(spec.rect().height, None);

    let opener = SyntheticImages::new().with(&input, image("XYZCT"));
    let report = run_job(&spec, &opener).expect("job");
    assert_eq!(report.splits.len(), 4);

    let report_path = dir.path().join("report.json");
    save_report(&report_path, &report).expect("save");
    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).expect("read")).expect("json");
    assert_eq!(saved["total_records"], 20);
    assert_eq!(saved["job_name"], "yaml-job");
}

#[test]
fn empty_job_is_rejected() {
    let dir = tempdir().expect("tempdir");
    let spec_path = dir.path().join("job.json");
    std::fs::write(&spec_path, r#"{"name": null, "inputs": [], "output_dir": "out"}"#)
        .expect("write spec");
    let error = load_spec(&spec_path).expect_err("must fail");
    assert!(matches!(error, JobError::Parse(_)));
}
