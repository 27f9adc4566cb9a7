mod builder;
mod error;
mod region;
mod walker;


pub use builder::SliceBuilder;
pub use error::{PlaneError, Result};
pub use region::{PlaneFilter, PlaneRect};
pub use walker::{for_each_plane, write_series};
