use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::formats::{
    ContainerSchema, ContainerWriter, DecoderOpener, ImageDecoder, container_path, record_name,
};
use crate::model::SplitDescriptor;
use crate::planes::PlaneRect;
use crate::splits::{MetadataTable, SplitError, SplitPlanner, SplitResolver};

use super::{JobError, JobReport, JobSpec, Result, SplitReport};

/// Container written for one split: `{name}_split{start}.bimg` in `output_dir`.
pub fn split_container_path(output_dir: &Path, split: &SplitDescriptor) -> PathBuf {
    let name = format!("{}_split{}", record_name(&split.path), split.start);
    container_path(output_dir, &name)
}

/// Plans every input of `spec` into split descriptors, in input order.
pub fn plan_job<O: DecoderOpener>(spec: &JobSpec, opener: &O) -> Result<Vec<SplitDescriptor>> {
    spec.validate()?;
    let mut names: HashMap<String, &PathBuf> = HashMap::new();
    for input in &spec.inputs {
        let name = record_name(input);
        if let Some(first) = names.insert(name.clone(), input) {
            return Err(JobError::DuplicateName {
                name,
                first: first.clone(),
                second: input.clone(),
            });
        }
    }

    let mut planner = SplitPlanner::new(opener, spec.planes_per_split);
    if let Some(metadata) = &spec.metadata {
        planner = planner.with_metadata(MetadataTable::load(metadata)?);
    }
    Ok(planner.plan_files(&spec.inputs)?)
}

/// Plans and resolves the whole job, one container per split.
///
/// Splits run in parallel, each with its own decoder handle and writer.
pub fn run_job<O: DecoderOpener>(spec: &JobSpec, opener: &O) -> Result<JobReport> {
    let splits = plan_job(spec, opener)?;
    fs::create_dir_all(&spec.output_dir)?;
    info!(
        inputs = spec.inputs.len(),
        splits = splits.len(),
        "Reading from {} input(s)",
        spec.inputs.len()
    );

    let rect = spec.rect();
    let reports = splits
        .par_iter()
        .map(|split| resolve_split(opener, split, &spec.output_dir, rect))
        .collect::<Result<Vec<_>>>()?;

    let total_records = reports.iter().map(|report| report.records).sum();
    info!(total_records, "All done");
    Ok(JobReport {
        job_name: spec.name.clone(),
        inputs: spec.inputs.len(),
        splits: reports,
        total_records,
    })
}

fn resolve_split<O: DecoderOpener>(
    opener: &O,
    split: &SplitDescriptor,
    output_dir: &Path,
    rect: PlaneRect,
) -> Result<SplitReport> {
    let started = Instant::now();
    let path = split_container_path(output_dir, split);
    let split_error = |source| JobError::Split {
        path: split.path.clone(),
        start: split.start,
        source,
    };

    let mut resolver = SplitResolver::new(rect);
    resolver.initialize(opener, split).map_err(split_error)?;

    let mut writer: Option<ContainerWriter> = None;
    let outcome = write_records(&mut resolver, &mut writer, &path, split_error);
    let closed = resolver.close().map_err(split_error);

    let records = match (outcome.and(closed), writer) {
        (Ok(()), Some(container)) => {
            let records = container.finish()?;
            info!("Writing to {}", path.display());
            records
        }
        (Ok(()), None) => 0,
        (Err(error), Some(container)) => {
            if let Err(discard_error) = container.discard() {
                warn!(
                    path = %path.display(),
                    %discard_error,
                    "could not remove partial container"
                );
            }
            return Err(error);
        }
        (Err(error), None) => return Err(error),
    };

    Ok(SplitReport {
        split: split.clone(),
        container: (records > 0).then_some(path),
        records,
        duration_ms: started.elapsed().as_millis(),
    })
}

fn write_records<D, F>(
    resolver: &mut SplitResolver<D>,
    writer: &mut Option<ContainerWriter>,
    path: &Path,
    split_error: F,
) -> Result<()>
where
    D: ImageDecoder,
    F: Fn(SplitError) -> JobError,
{
    while let Some(record) = resolver.advance().map_err(&split_error)? {
        if writer.is_none() {
            *writer = Some(ContainerWriter::create(
                &ContainerSchema::plane_record(),
                path,
            )?);
        }
        if let Some(container) = writer.as_mut() {
            container.append(&record)?;
        }
    }
    Ok(())
}
