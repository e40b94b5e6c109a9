pub mod corners;
pub mod mask;
pub mod point;
pub mod raster;

pub use corners::CornerSet;
pub use mask::BinaryMask;
pub use point::Point;
pub use raster::{PixelFormat, Raster};
