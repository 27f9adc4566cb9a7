mod error;
mod execute;
mod io;
mod report;
mod spec;

#[cfg(test)]
mod tests;

pub use error::{JobError, Result};
pub use execute::{plan_job, run_job, split_container_path};
pub use io::{load_spec, save_report};
pub use report::{JobReport, SplitReport};
pub use spec::JobSpec;
