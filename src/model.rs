mod axis;
mod error;
mod pixel;
mod slice;
mod split;


pub use axis::{Axis, AxisIndexMap, CANONICAL_ORDER, N_DIM, normalize};
pub use error::{CoreError, Result};
pub use pixel::PixelType;
pub use slice::{ArraySlice, PlaneRecord};
pub use split::{SeriesMetadata, SplitDescriptor};
