//! Visual comparison of two drawing revisions.
//!
//! Given a *base* drawing and a *candidate* drawing rendered to RGBA rasters,
//! this crate aligns the candidate onto the base, classifies every pixel of
//! each as ink or background, and produces a color-coded mask of where ink
//! appears in only one of them, together with the share of pixels that
//! changed.
//!
//! # Quick Start
//!
//! ```
//! use drawing_diff::{compute_diff, render_aligned, DiffOptions, RasterSurface, Rgba};
//!
//! let mut base = RasterSurface::from_pixel(2, 2, Rgba::white());
//! base.put_pixel(0, 0, Rgba::black());
//! let candidate = RasterSurface::from_pixel(2, 2, Rgba::white());
//!
//! // Bring the candidate into the base's pixel space.
//! let aligned = render_aligned(&candidate, Some("translate(0%, 0%) rotate(0deg) scale(1)"), 2, 2);
//!
//! let result = compute_diff(&base, &aligned, &DiffOptions::default())?;
//! assert_eq!(result.diff_pixel_count, 1);
//! assert_eq!(result.diff_percentage, 25.0);
//! # Ok::<(), drawing_diff::DiffError>(())
//! ```
//!
//! # Components
//!
//! - **Transform renderer** ([`render_transformed`]): bakes an
//!   [`AffineTransform`] into a new surface of the target size.
//! - **Diff computer** ([`compute_diff`]): per-pixel ink classification and the
//!   difference mask.
//! - **Overlay controller** ([`OverlayController`]): visibility, sensitivity,
//!   debounced recomputation and the display surface for one comparison
//!   session.
//!
//! # Features
//!
//! - `rayon`: paint mask rows in parallel. Output is identical to the
//!   sequential path.

// Core modules
pub mod diff;
pub mod raster;
pub mod overlay;
pub mod transform;
pub mod utils;

// Diff computer
pub use diff::{compute_diff, compute_diff_sources, ContentMap, DiffOptions, DiffResult};

// Surfaces
pub use raster::{RasterSource, RasterSurface, Rect, Rgba, SurfaceCompositeExt};

// Transform renderer
pub use transform::{render_aligned, render_transformed, AffineTransform, Matrix};

// Overlay controller
pub use overlay::{DiffStatus, OverlayConfig, OverlayController, OverlayPhase, OverlayState, Trigger};

// Utilities and error types
pub use utils::{Clock, Debounced, DiffError, ManualClock, Result, SystemClock};
