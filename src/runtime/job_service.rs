use std::path::Path;

use crate::formats::{DecoderOpener, TiffOpener};
use crate::model::SplitDescriptor;
use crate::workflow::{JobReport, JobSpec, load_spec, plan_job, run_job, save_report};

use super::Result;

#[derive(Debug, Clone, Default)]
pub struct JobService<O = TiffOpener> {
    opener: O,
}

impl<O: DecoderOpener> JobService<O> {
    pub fn with_opener(opener: O) -> Self {
        Self { opener }
    }

    pub fn load_spec(&self, path: impl AsRef<Path>) -> Result<JobSpec> {
        Ok(load_spec(path)?)
    }

    pub fn plan(&self, spec: &JobSpec) -> Result<Vec<SplitDescriptor>> {
        Ok(plan_job(spec, &self.opener)?)
    }

    pub fn run(&self, spec: &JobSpec) -> Result<JobReport> {
        Ok(run_job(spec, &self.opener)?)
    }

    pub fn save_report(&self, path: impl AsRef<Path>, report: &JobReport) -> Result<()> {
        save_report(path, report)?;
        Ok(())
    }
}
