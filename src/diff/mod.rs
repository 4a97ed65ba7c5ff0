//! The diff computer: ink classification and color-coded difference masks.

pub mod compute;
pub mod content;
pub mod options;

pub use compute::{compute_diff, compute_diff_sources, DiffResult};
pub use content::{is_content_pixel, ContentMap};
pub use options::DiffOptions;
