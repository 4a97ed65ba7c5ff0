// src/overlay/controller.rs

//! The overlay controller: owns a comparison session's [`OverlayState`] and
//! decides when the diff pipeline runs.
//!
//! Everything happens on the caller's (UI) thread. The host drives time with
//! two calls:
//!
//! - [`OverlayController::tick`] fires an expired debounce and starts a
//!   computation;
//! - [`OverlayController::run_frame`] is the next-frame continuation. Starting
//!   a computation only queues it, so the UI can paint a "computing" state
//!   first; the pixel work runs to completion inside `run_frame`.
//!
//! Each started computation gets an increasing id. Only the newest one is ever
//! delivered; older queued ones are dropped without running.
//!
//! ```
//! use drawing_diff::{ManualClock, OverlayConfig, OverlayController, RasterSurface, Rgba};
//!
//! let clock = ManualClock::new();
//! let mut overlay = OverlayController::new(OverlayConfig::default()).with_clock(clock.clone());
//!
//! let mut base = RasterSurface::from_pixel(20, 20, Rgba::white());
//! base.put_pixel(15, 15, Rgba::black());
//! base.put_pixel(16, 15, Rgba::black());
//! let candidate = RasterSurface::from_pixel(20, 20, Rgba::white());
//! overlay.set_surfaces(base, candidate);
//!
//! overlay.toggle();
//! overlay.run_frame();
//! assert_eq!(overlay.status().summary().as_deref(), Some("0.5% changed"));
//! ```

use crate::diff::compute::{DiffResult, as_read_error, compute_diff};
use crate::diff::options::DiffOptions;
use crate::raster::source::RasterSource;
use crate::raster::surface::{RasterSurface, SurfaceCompositeExt};
use crate::overlay::config::OverlayConfig;
use crate::overlay::state::{DiffStatus, OverlayPhase, OverlayState};
use crate::transform::affine::AffineTransform;
use crate::transform::render::render_transformed;
use crate::utils::clock::{Clock, SystemClock};
use crate::utils::debounce::Debounced;
use crate::utils::error::{DiffError, Result};
use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Pixel sampled to check that a surface has been drawn into.
pub const CONTENT_PROBE: (u32, u32) = (10, 10);

/// Relative aspect-ratio difference above which a warning is logged.
pub const ASPECT_RATIO_TOLERANCE: f64 = 0.10;

/// What asked for a recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Shown,
    Manual,
    Sensitivity,
    Alignment,
    Zoom,
    Surfaces,
}

/// A computation waiting for the next frame, with the inputs it was started with.
#[derive(Debug, Clone)]
struct Frame {
    id: u64,
    trigger: Trigger,
    options: DiffOptions,
    alignment: AffineTransform,
}

pub struct OverlayController {
    config: OverlayConfig,
    state: OverlayState,
    base: Option<Box<dyn RasterSource>>,
    candidate: Option<Box<dyn RasterSource>>,
    alignment: AffineTransform,
    scale: f64,
    debounce: Debounced<Trigger>,
    clock: Box<dyn Clock>,
    latest_id: u64,
    frames: VecDeque<Frame>,
    display: RasterSurface,
    disposed: bool,
}

impl OverlayController {
    /// Starts a session. The overlay is hidden until toggled on.
    pub fn new(config: OverlayConfig) -> Self {
        OverlayController {
            state: OverlayState::new(config.initial_sensitivity),
            base: None,
            candidate: None,
            alignment: AffineTransform::identity(),
            scale: config.scale,
            debounce: Debounced::new(config.debounce),
            clock: Box::new(SystemClock),
            latest_id: 0,
            frames: VecDeque::new(),
            display: RasterSurface::new(0, 0),
            disposed: false,
            config,
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn phase(&self) -> OverlayPhase {
        self.state.phase()
    }

    pub fn status(&self) -> DiffStatus {
        self.state.status()
    }

    pub fn alignment(&self) -> &AffineTransform {
        &self.alignment
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Id of the most recently started computation (0 before the first).
    pub fn latest_computation_id(&self) -> u64 {
        self.latest_id
    }

    pub fn has_pending_frame(&self) -> bool {
        !self.frames.is_empty()
    }

    /// When the pending debounce fires, if one is armed.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// The mask to draw, while visible and a result exists.
    pub fn display_surface(&self) -> Option<&RasterSurface> {
        (self.state.visible && self.state.last_result.is_some()).then_some(&self.display)
    }

    /// Draws the current mask over `target` at `opacity`. Returns false when
    /// there is nothing to draw.
    pub fn render_into(&self, target: &mut RasterSurface, opacity: f32) -> bool {
        match self.display_surface() {
            Some(mask) => {
                target.composite_over(mask, 0, 0, opacity);
                true
            }
            None => false,
        }
    }

    fn ignore_when_disposed(&self, action: &str) -> bool {
        if self.disposed {
            log::debug!("overlay disposed, ignoring {action}");
        }
        self.disposed
    }

    // --- Inputs ---

    /// Replaces the drawings being compared. While visible, a debounced
    /// recomputation follows.
    pub fn set_surfaces(
        &mut self,
        base: impl RasterSource + 'static,
        candidate: impl RasterSource + 'static,
    ) {
        if self.ignore_when_disposed("set_surfaces") {
            return;
        }
        self.base = Some(Box::new(base));
        self.candidate = Some(Box::new(candidate));
        self.schedule(Trigger::Surfaces);
    }

    pub fn clear_surfaces(&mut self) {
        self.base = None;
        self.candidate = None;
    }

    /// Flips visibility and returns the new value.
    pub fn toggle(&mut self) -> bool {
        let visible = !self.state.visible;
        self.set_visible(visible);
        self.state.visible
    }

    /// Showing starts a computation right away; hiding keeps the cached result.
    pub fn set_visible(&mut self, visible: bool) {
        if self.ignore_when_disposed("set_visible") || self.state.visible == visible {
            return;
        }
        self.state.visible = visible;
        if visible {
            self.start(Trigger::Shown);
        } else {
            self.debounce.cancel();
        }
    }

    pub fn set_sensitivity(&mut self, sensitivity: u8) {
        if self.ignore_when_disposed("set_sensitivity") {
            return;
        }
        self.state.sensitivity = sensitivity;
        self.schedule(Trigger::Sensitivity);
    }

    /// Applies a new alignment string. Malformed parts fall back to identity.
    pub fn set_alignment(&mut self, alignment: Option<&str>) {
        if self.ignore_when_disposed("set_alignment") {
            return;
        }
        let parsed = AffineTransform::parse_lenient(alignment);
        if parsed == self.alignment {
            return;
        }
        self.alignment = parsed;
        self.schedule(Trigger::Alignment);
    }

    /// Viewer zoom changed. The visible mask no longer lines up with the
    /// re-rendered drawing, so it is dropped at once.
    pub fn set_scale(&mut self, scale: f64) {
        if self.ignore_when_disposed("set_scale") || scale == self.scale {
            return;
        }
        self.scale = scale;
        if self.state.visible {
            self.state.last_result = None;
            self.schedule(Trigger::Zoom);
        }
    }

    /// Computes now, skipping any pending debounce.
    pub fn recompute(&mut self) {
        if self.ignore_when_disposed("recompute") {
            return;
        }
        self.debounce.cancel();
        self.start(Trigger::Manual);
    }

    // --- Scheduling ---

    fn schedule(&mut self, trigger: Trigger) {
        if !self.state.visible {
            return;
        }
        let now = self.clock.now();
        log::trace!("recompute scheduled by {trigger:?}");
        self.debounce.schedule(now, trigger);
    }

    fn start(&mut self, trigger: Trigger) {
        self.latest_id += 1;
        let frame = Frame {
            id: self.latest_id,
            trigger,
            options: self.config.diff.with_threshold(self.state.sensitivity),
            alignment: self.alignment,
        };
        log::debug!("computation {} started ({trigger:?})", frame.id);
        self.state.is_computing = true;
        self.frames.push_back(frame);
    }

    /// Starts the debounced computation if its quiet period is over.
    /// Returns whether one was started.
    pub fn tick(&mut self) -> bool {
        if self.disposed {
            return false;
        }
        match self.debounce.poll(self.clock.now()) {
            Some(trigger) => {
                self.start(trigger);
                true
            }
            None => false,
        }
    }

    /// Runs queued computations. Returns whether a result (or error) was
    /// delivered to the state.
    pub fn run_frame(&mut self) -> bool {
        let mut delivered = false;

        while let Some(frame) = self.frames.pop_front() {
            if self.disposed || frame.id != self.latest_id {
                log::debug!("computation {} superseded, dropped", frame.id);
                continue;
            }

            let outcome = self.execute(&frame);
            self.deliver(frame.id, outcome);
            delivered = true;
        }

        delivered
    }

    fn execute(&self, frame: &Frame) -> Result<DiffResult> {
        let base = self.base.as_deref();
        let candidate = self.candidate.as_deref();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            run_pipeline(base, candidate, &frame.options, &frame.alignment)
        }));

        match outcome {
            Ok(result) => result,
            Err(payload) => {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unexpected failure".to_string());
                log::error!("computation {} ({:?}) panicked: {message}", frame.id, frame.trigger);
                Err(DiffError::Internal(message))
            }
        }
    }

    fn deliver(&mut self, id: u64, outcome: Result<DiffResult>) {
        if self.disposed || id != self.latest_id {
            log::debug!("result of computation {id} arrived stale, discarded");
            return;
        }

        self.state.is_computing = false;
        match outcome {
            Ok(result) => {
                log::debug!(
                    "computation {id} done: {} pixels differ ({:.2}%)",
                    result.diff_pixel_count,
                    result.diff_percentage
                );
                self.display.copy_from(&result.mask);
                self.state.last_result = Some(result);
                self.state.last_error = None;
            }
            Err(err) => {
                log::debug!("computation {id} failed: {err}");
                self.state.last_result = None;
                self.state.last_error = Some(err.to_string());
            }
        }
    }

    /// Ends the session: cancels the debounce and drops queued work. Later
    /// calls are ignored.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.debounce.cancel();
        self.frames.clear();
        self.state.is_computing = false;
    }
}

impl Drop for OverlayController {
    fn drop(&mut self) {
        self.dispose();
    }
}

// --- Pipeline ---

fn ensure_rendered<'a>(
    source: Option<&'a dyn RasterSource>,
    role: &str,
) -> Result<(&'a dyn RasterSource, (u32, u32))> {
    let source = source.ok_or_else(|| DiffError::NotReady(format!("no {role} drawing")))?;
    let (width, height) = source.dimensions();
    if width == 0 || height == 0 {
        return Err(DiffError::NotReady(format!(
            "{role} drawing is {width}x{height}"
        )));
    }
    Ok((source, (width, height)))
}

fn probe_content(surface: &RasterSurface, role: &str) -> Result<()> {
    let x = CONTENT_PROBE.0.min(surface.width().saturating_sub(1));
    let y = CONTENT_PROBE.1.min(surface.height().saturating_sub(1));
    if surface.get_pixel(x, y).a == 0 {
        return Err(DiffError::EmptyContent(format!(
            "{role} drawing is transparent at ({x}, {y})"
        )));
    }
    Ok(())
}

/// True when the width/height ratios of two sizes differ by more than
/// [`ASPECT_RATIO_TOLERANCE`], relative to the first.
pub fn aspect_ratio_diverges(base: (u32, u32), candidate: (u32, u32)) -> bool {
    if base.1 == 0 || candidate.1 == 0 || base.0 == 0 {
        return false;
    }
    let base_ratio = base.0 as f64 / base.1 as f64;
    let candidate_ratio = candidate.0 as f64 / candidate.1 as f64;
    (base_ratio - candidate_ratio).abs() / base_ratio > ASPECT_RATIO_TOLERANCE
}

/// Validates both drawings, aligns the candidate onto the base, and diffs them.
fn run_pipeline(
    base: Option<&dyn RasterSource>,
    candidate: Option<&dyn RasterSource>,
    options: &DiffOptions,
    alignment: &AffineTransform,
) -> Result<DiffResult> {
    let (base, base_size) = ensure_rendered(base, "base")?;
    let (candidate, candidate_size) = ensure_rendered(candidate, "candidate")?;

    let base_pixels = base.read_pixels().map_err(as_read_error)?;
    let candidate_pixels = candidate.read_pixels().map_err(as_read_error)?;

    probe_content(&base_pixels, "base")?;
    probe_content(&candidate_pixels, "candidate")?;

    if aspect_ratio_diverges(base_size, candidate_size) {
        log::warn!(
            "aspect ratios differ by more than {:.0}%: base {}x{}, candidate {}x{}",
            ASPECT_RATIO_TOLERANCE * 100.0,
            base_size.0,
            base_size.1,
            candidate_size.0,
            candidate_size.1
        );
    }

    let aligned = render_transformed(&candidate_pixels, alignment, base_size.0, base_size.1);
    compute_diff(&base_pixels, &aligned, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::surface::Rgba;

    #[test]
    fn aspect_ratio_tolerance_is_ten_percent() {
        assert!(!aspect_ratio_diverges((100, 100), (109, 100)));
        assert!(aspect_ratio_diverges((100, 100), (111, 100)));
        assert!(aspect_ratio_diverges((200, 100), (100, 100)));
        assert!(!aspect_ratio_diverges((0, 0), (10, 10)));
    }

    #[test]
    fn probe_is_clamped_to_small_surfaces() {
        let tiny = RasterSurface::from_pixel(2, 2, Rgba::white());
        assert!(probe_content(&tiny, "base").is_ok());

        let mut blank = RasterSurface::from_pixel(20, 20, Rgba::white());
        blank.put_pixel(10, 10, Rgba::TRANSPARENT);
        assert!(matches!(
            probe_content(&blank, "candidate"),
            Err(DiffError::EmptyContent(_))
        ));
    }

    #[test]
    fn pipeline_requires_both_drawings() {
        let base = RasterSurface::from_pixel(4, 4, Rgba::white());
        let err = run_pipeline(Some(&base), None, &DiffOptions::default(), &AffineTransform::identity())
            .unwrap_err();
        assert_eq!(err, DiffError::NotReady("no candidate drawing".to_string()));
    }

    #[test]
    fn pipeline_aligns_candidate_before_diffing() -> Result<()> {
        let mut base = RasterSurface::from_pixel(20, 20, Rgba::white());
        base.put_pixel(12, 3, Rgba::black());
        let mut candidate = RasterSurface::from_pixel(20, 20, Rgba::white());
        candidate.put_pixel(2, 3, Rgba::black());

        // 50% of 20px moves the candidate's mark onto the base's mark.
        let shifted = AffineTransform::new(50.0, 0.0, 0.0, 1.0);
        let options = DiffOptions::default();

        // The uncovered left half is transparent, so it reads as background.
        let result = run_pipeline(Some(&base), Some(&candidate), &options, &shifted)?;
        assert_eq!(result.diff_pixel_count, 0);

        let unaligned =
            run_pipeline(Some(&base), Some(&candidate), &options, &AffineTransform::identity())?;
        assert_eq!(unaligned.diff_pixel_count, 2);
        Ok(())
    }
}
