mod container_service;
mod context;
mod convert_service;
mod error;
mod job_service;
mod split_service;

#[cfg(test)]
mod tests;

pub use container_service::{ContainerService, ContainerSummary, RecordSummary};
pub use context::AppContext;
pub use convert_service::{ConvertReport, ConvertService, ImageInfo, SeriesInfo};
pub use error::{AppError, Result};
pub use job_service::JobService;
pub use split_service::SplitService;
