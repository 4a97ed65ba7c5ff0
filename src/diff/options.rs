// src/diff/options.rs

use crate::raster::surface::Rgba;

/// Default sensitivity: pixels need luminance below `255 - 30` to count as ink.
pub const DEFAULT_THRESHOLD: u8 = 30;
/// Marker for ink only present in the base drawing (blue).
pub const DEFAULT_BASE_ONLY_COLOR: Rgba = Rgba::new(59, 130, 246, 200);
/// Marker for ink only present in the candidate drawing (red).
pub const DEFAULT_CANDIDATE_ONLY_COLOR: Rgba = Rgba::new(239, 68, 68, 200);
/// Faint ink still gets at least half of the marker's alpha.
pub const DEFAULT_MIN_MARKER_OPACITY: f64 = 0.5;

/// Parameters of one diff pass.
///
/// # Example
/// ```
/// use drawing_diff::{DiffOptions, Rgba};
///
/// let options = DiffOptions::default()
///     .with_threshold(60)
///     .with_candidate_only_color(Rgba::new(255, 0, 255, 180));
/// assert_eq!(options.content_threshold(), 195.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffOptions {
    /// `0..=255`; higher values treat more light-grey pixels as ink.
    pub threshold: u8,
    pub base_only_color: Rgba,
    pub candidate_only_color: Rgba,
    /// Lower bound of the alpha scaling applied to markers, `0.0..=1.0`.
    pub min_marker_opacity: f64,
}

impl Default for DiffOptions {
    fn default() -> Self {
        DiffOptions {
            threshold: DEFAULT_THRESHOLD,
            base_only_color: DEFAULT_BASE_ONLY_COLOR,
            candidate_only_color: DEFAULT_CANDIDATE_ONLY_COLOR,
            min_marker_opacity: DEFAULT_MIN_MARKER_OPACITY,
        }
    }
}

impl DiffOptions {
    pub fn with_threshold(mut self, threshold: u8) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_base_only_color(mut self, color: Rgba) -> Self {
        self.base_only_color = color;
        self
    }

    pub fn with_candidate_only_color(mut self, color: Rgba) -> Self {
        self.candidate_only_color = color;
        self
    }

    /// Values outside `0.0..=1.0` are clamped; NaN keeps the default.
    pub fn with_min_marker_opacity(mut self, floor: f64) -> Self {
        self.min_marker_opacity = if floor.is_nan() {
            DEFAULT_MIN_MARKER_OPACITY
        } else {
            floor.clamp(0.0, 1.0)
        };
        self
    }

    /// Pixels with luminance strictly below this value are ink.
    pub fn content_threshold(&self) -> f64 {
        255.0 - self.threshold as f64
    }
}
