//! Alignment transforms and the renderer that bakes them into a surface.

pub mod affine;
pub mod render;

pub use affine::{AffineTransform, Matrix};
pub use render::{render_aligned, render_transformed};
