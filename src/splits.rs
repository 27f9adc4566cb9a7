mod error;
mod metadata;
mod planner;
mod resolver;


pub use error::{Result, SplitError};
pub use metadata::{MetadataTable, collect_metadata, probe_metadata};
pub use planner::{SplitPlanner, plan};
pub use resolver::{ResolverState, SplitResolver, locate};
