// src/overlay/config.rs

use crate::diff::options::{DEFAULT_THRESHOLD, DiffOptions};
use std::time::Duration;

/// Quiet period after the last input change before a recomputation starts.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Settings a comparison session starts with.
///
/// # Example
/// ```
/// use drawing_diff::OverlayConfig;
///
/// let config = OverlayConfig::default()
///     .with_debounce_ms(150)
///     .with_initial_sensitivity(45)
///     .with_scale(1.5);
/// assert_eq!(config.initial_sensitivity, 45);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayConfig {
    pub debounce: Duration,
    /// Starting diff threshold, `0..=255`.
    pub initial_sensitivity: u8,
    /// Viewer zoom at session start. Only changes to it matter.
    pub scale: f64,
    /// Colors and marker floor; the threshold is taken from the sensitivity.
    pub diff: DiffOptions,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        OverlayConfig {
            debounce: DEFAULT_DEBOUNCE,
            initial_sensitivity: DEFAULT_THRESHOLD,
            scale: 1.0,
            diff: DiffOptions::default(),
        }
    }
}

impl OverlayConfig {
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_debounce_ms(self, ms: u64) -> Self {
        self.with_debounce(Duration::from_millis(ms))
    }

    pub fn with_initial_sensitivity(mut self, sensitivity: u8) -> Self {
        self.initial_sensitivity = sensitivity;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_diff_options(mut self, diff: DiffOptions) -> Self {
        self.diff = diff;
        self
    }
}
