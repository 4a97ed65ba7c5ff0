//! Raster surfaces and pixel-space geometry.

pub mod geom;
pub mod source;
pub mod surface;

pub use geom::Rect;
pub use source::RasterSource;
pub use surface::{RasterSurface, Rgba, SurfaceCompositeExt};
