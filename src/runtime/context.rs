use super::{ContainerService, ConvertService, JobService, SplitService};

#[derive(Debug, Clone, Default)]
pub struct AppContext {
    convert_service: ConvertService,
    split_service: SplitService,
    job_service: JobService,
    container_service: ContainerService,
}

impl AppContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert_service(&self) -> &ConvertService {
        &self.convert_service
    }

    pub fn split_service(&self) -> &SplitService {
        &self.split_service
    }

    pub fn job_service(&self) -> &JobService {
        &self.job_service
    }

    pub fn container_service(&self) -> &ContainerService {
        &self.container_service
    }
}
