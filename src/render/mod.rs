//! Render module - image buffers, compositing primitives and rasterization.

mod compose;
mod image;
mod palette;
mod raster;

pub use compose::*;
pub use image::*;
pub use palette::*;
pub use raster::*;
