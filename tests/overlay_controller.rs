use drawing_diff::{
    DiffError, ManualClock, OverlayConfig, OverlayController, OverlayPhase, RasterSource,
    RasterSurface, Rgba,
};
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// White page with black marks.
fn drawing(width: u32, height: u32, marks: &[(u32, u32)]) -> RasterSurface {
    let mut surface = RasterSurface::from_pixel(width, height, Rgba::white());
    for &(x, y) in marks {
        surface.put_pixel(x, y, Rgba::black());
    }
    surface
}

fn session() -> (OverlayController, ManualClock) {
    let clock = ManualClock::new();
    let overlay = OverlayController::new(OverlayConfig::default()).with_clock(clock.clone());
    (overlay, clock)
}

fn ready_session() -> (OverlayController, ManualClock) {
    let (mut overlay, clock) = session();
    overlay.set_surfaces(drawing(20, 20, &[(1, 1), (2, 2)]), drawing(20, 20, &[(1, 1)]));
    overlay.toggle();
    overlay.run_frame();
    assert_eq!(overlay.phase(), OverlayPhase::Ready);
    (overlay, clock)
}

struct CountingSource {
    surface: RasterSurface,
    reads: Rc<Cell<usize>>,
}

impl RasterSource for CountingSource {
    fn dimensions(&self) -> (u32, u32) {
        self.surface.dimensions()
    }

    fn read_pixels(&self) -> drawing_diff::Result<Cow<'_, RasterSurface>> {
        self.reads.set(self.reads.get() + 1);
        Ok(Cow::Borrowed(&self.surface))
    }
}

struct TaintedSource;

impl RasterSource for TaintedSource {
    fn dimensions(&self) -> (u32, u32) {
        (20, 20)
    }

    fn read_pixels(&self) -> drawing_diff::Result<Cow<'_, RasterSurface>> {
        Err(DiffError::Read("cross-origin image".to_string()))
    }
}

struct ExplodingSource;

impl RasterSource for ExplodingSource {
    fn dimensions(&self) -> (u32, u32) {
        (20, 20)
    }

    fn read_pixels(&self) -> drawing_diff::Result<Cow<'_, RasterSurface>> {
        panic!("texture lost")
    }
}

#[test]
fn toggling_on_computes_on_next_frame() {
    let (mut overlay, _clock) = session();
    overlay.set_surfaces(drawing(20, 20, &[(3, 3)]), drawing(20, 20, &[]));

    assert_eq!(overlay.phase(), OverlayPhase::Idle);
    assert!(overlay.toggle());
    assert_eq!(overlay.phase(), OverlayPhase::Computing);
    assert!(overlay.state().is_computing);
    assert!(overlay.has_pending_frame());
    assert!(overlay.display_surface().is_none());

    assert!(overlay.run_frame());

    assert_eq!(overlay.phase(), OverlayPhase::Ready);
    let status = overlay.status();
    assert!(!status.is_computing);
    assert_eq!(status.error, None);
    assert_eq!(status.diff_percentage, Some(0.25));
    let mask = overlay.display_surface().expect("mask after result");
    assert_eq!(mask.dimensions(), (20, 20));
    assert_eq!(mask.count_visible(), 1);
}

#[test]
fn sensitivity_burst_recomputes_once_with_final_value() {
    let (mut overlay, clock) = ready_session();
    assert_eq!(overlay.latest_computation_id(), 1);

    overlay.set_sensitivity(10);
    clock.advance_ms(100);
    assert!(!overlay.tick());
    overlay.set_sensitivity(20);
    clock.advance_ms(100);
    assert!(!overlay.tick());
    overlay.set_sensitivity(40);

    clock.advance_ms(299);
    assert!(!overlay.tick());
    assert_eq!(overlay.latest_computation_id(), 1);

    clock.advance_ms(1);
    assert!(overlay.tick());
    assert_eq!(overlay.latest_computation_id(), 2);
    overlay.run_frame();

    let result = overlay.state().last_result.as_ref().expect("result");
    assert_eq!(result.threshold, 40);

    clock.advance_ms(1_000);
    assert!(!overlay.tick());
    assert_eq!(overlay.latest_computation_id(), 2);
}

#[test]
fn sensitivity_while_hidden_only_updates_value() {
    let (mut overlay, clock) = session();
    overlay.set_sensitivity(99);
    clock.advance_ms(1_000);

    assert!(!overlay.tick());
    assert_eq!(overlay.latest_computation_id(), 0);
    assert_eq!(overlay.state().sensitivity, 99);
}

#[test]
fn zoom_change_drops_stale_mask_immediately() {
    let (mut overlay, clock) = ready_session();

    overlay.set_scale(2.0);

    assert!(overlay.state().last_result.is_none());
    assert!(overlay.display_surface().is_none());
    assert_eq!(overlay.phase(), OverlayPhase::Computing);
    assert!(overlay.next_deadline().is_some());

    clock.advance_ms(300);
    assert!(overlay.tick());
    overlay.run_frame();
    assert_eq!(overlay.phase(), OverlayPhase::Ready);
    assert_eq!(overlay.scale(), 2.0);
}

#[test]
fn zoom_change_while_hidden_keeps_cache() {
    let (mut overlay, _clock) = ready_session();
    overlay.set_visible(false);

    overlay.set_scale(3.0);

    assert!(overlay.state().last_result.is_some());
    assert!(overlay.next_deadline().is_none());
}

#[test]
fn alignment_change_is_debounced() {
    let (mut overlay, clock) = ready_session();

    overlay.set_alignment(Some("translate(5%, 0%) rotate(0deg) scale(1)"));
    assert!(overlay.next_deadline().is_some());
    assert_eq!(overlay.alignment().translate_x, 5.0);

    clock.advance_ms(300);
    assert!(overlay.tick());
    overlay.run_frame();
    assert_eq!(overlay.phase(), OverlayPhase::Ready);

    // Same transform again: nothing to do.
    overlay.set_alignment(Some("translate(5%, 0%)"));
    assert!(overlay.next_deadline().is_none());
}

#[test]
fn malformed_alignment_degrades_to_identity() {
    let (mut overlay, _clock) = ready_session();
    overlay.set_alignment(Some("translate(5%, 0%)"));
    overlay.set_alignment(Some("translate(oops)"));
    assert!(overlay.alignment().is_identity());
}

#[test]
fn manual_recompute_bypasses_debounce() {
    let (mut overlay, clock) = ready_session();

    overlay.set_sensitivity(50);
    assert!(overlay.next_deadline().is_some());

    overlay.recompute();
    assert!(overlay.next_deadline().is_none());
    assert!(overlay.has_pending_frame());
    overlay.run_frame();
    assert_eq!(overlay.state().last_result.as_ref().map(|r| r.threshold), Some(50));

    clock.advance_ms(300);
    assert!(!overlay.tick());
}

#[test]
fn superseded_computation_is_never_run_or_delivered() {
    let (mut overlay, _clock) = session();
    let reads = Rc::new(Cell::new(0));
    overlay.set_surfaces(
        CountingSource {
            surface: drawing(20, 20, &[(4, 4)]),
            reads: Rc::clone(&reads),
        },
        CountingSource {
            surface: drawing(20, 20, &[]),
            reads: Rc::clone(&reads),
        },
    );

    overlay.toggle(); // computation 1
    overlay.set_sensitivity(60);
    overlay.recompute(); // computation 2

    assert!(overlay.run_frame());
    assert_eq!(reads.get(), 2, "only the newest computation reads the drawings");
    assert_eq!(overlay.latest_computation_id(), 2);
    assert_eq!(overlay.state().last_result.as_ref().map(|r| r.threshold), Some(60));
    assert!(!overlay.has_pending_frame());
    assert!(!overlay.run_frame());
}

#[test]
fn missing_drawings_report_not_ready_and_recover() {
    let (mut overlay, _clock) = session();
    overlay.toggle();
    overlay.run_frame();

    assert_eq!(overlay.phase(), OverlayPhase::Error);
    let error = overlay.status().error.expect("error");
    assert!(error.starts_with("Canvas not ready"), "{error}");

    overlay.set_surfaces(drawing(20, 20, &[]), drawing(20, 20, &[]));
    overlay.recompute();
    overlay.run_frame();
    assert_eq!(overlay.phase(), OverlayPhase::Ready);
    assert_eq!(overlay.status().error, None);
}

#[test]
fn unrendered_canvas_becomes_ready_once_viewer_draws() {
    let (mut overlay, clock) = session();
    let canvas = Rc::new(RefCell::new(RasterSurface::new(0, 0)));
    overlay.set_surfaces(drawing(20, 20, &[]), Rc::clone(&canvas));

    overlay.toggle();
    overlay.run_frame();
    assert!(overlay.status().error.unwrap_or_default().contains("0x0"));

    *canvas.borrow_mut() = drawing(20, 20, &[(0, 5)]);
    overlay.set_scale(1.25);
    clock.advance_ms(300);
    overlay.tick();
    overlay.run_frame();

    assert_eq!(overlay.phase(), OverlayPhase::Ready);
    assert_eq!(overlay.state().last_result.as_ref().map(|r| r.diff_pixel_count), Some(1));
}

#[test]
fn unreadable_canvas_is_a_recoverable_error() {
    let (mut overlay, _clock) = session();
    overlay.set_surfaces(drawing(20, 20, &[]), TaintedSource);
    overlay.toggle();
    overlay.run_frame();

    assert_eq!(overlay.status().error.as_deref(), Some("Could not read canvas data"));
    assert!(overlay.state().last_result.is_none());

    // Still interactive.
    assert!(!overlay.toggle());
    assert!(overlay.toggle());
    overlay.run_frame();
    assert_eq!(overlay.phase(), OverlayPhase::Error);
}

#[test]
fn blank_canvas_is_reported_as_empty() {
    let (mut overlay, _clock) = session();
    overlay.set_surfaces(drawing(20, 20, &[]), RasterSurface::new(20, 20));
    overlay.toggle();
    overlay.run_frame();

    let error = overlay.status().error.expect("error");
    assert!(error.starts_with("Canvas appears empty"), "{error}");
}

#[test]
fn mismatched_aspect_ratio_still_computes() {
    let (mut overlay, _clock) = session();
    overlay.set_surfaces(drawing(20, 20, &[(12, 12)]), drawing(40, 20, &[]));
    overlay.toggle();
    overlay.run_frame();

    assert_eq!(overlay.phase(), OverlayPhase::Ready);
    let mask = overlay.display_surface().expect("mask");
    assert_eq!(mask.dimensions(), (20, 20));
}

#[test]
fn failure_inside_pipeline_keeps_session_alive() {
    let (mut overlay, _clock) = session();
    overlay.set_surfaces(drawing(20, 20, &[]), ExplodingSource);
    overlay.toggle();
    overlay.run_frame();

    let error = overlay.status().error.expect("error");
    assert!(error.contains("texture lost"), "{error}");

    overlay.set_surfaces(drawing(20, 20, &[]), drawing(20, 20, &[]));
    overlay.recompute();
    overlay.run_frame();
    assert_eq!(overlay.phase(), OverlayPhase::Ready);
}

#[test]
fn hiding_keeps_result_cached_and_cancels_debounce() {
    let (mut overlay, _clock) = ready_session();
    overlay.set_sensitivity(70);
    assert!(overlay.next_deadline().is_some());

    overlay.set_visible(false);

    assert_eq!(overlay.phase(), OverlayPhase::Idle);
    assert!(overlay.next_deadline().is_none());
    assert!(overlay.state().last_result.is_some());
    assert!(overlay.display_surface().is_none());
}

#[test]
fn mask_renders_over_drawing_with_opacity() {
    let (overlay, _clock) = ready_session();
    let mut page = drawing(20, 20, &[]);

    assert!(overlay.render_into(&mut page, 1.0));

    let marked = page.get_pixel(2, 2);
    assert_ne!(marked, Rgba::white());
    assert!(marked.b > marked.r, "base-only marker is blue");
    assert_eq!(page.get_pixel(1, 1), Rgba::white());
}

#[test]
fn dispose_cancels_pending_work_and_ignores_later_input() {
    let (mut overlay, clock) = ready_session();
    overlay.set_sensitivity(90);
    overlay.recompute();
    overlay.set_sensitivity(91);

    overlay.dispose();

    assert!(overlay.is_disposed());
    assert!(overlay.next_deadline().is_none());
    assert!(!overlay.has_pending_frame());
    assert!(!overlay.run_frame());

    clock.advance_ms(1_000);
    assert!(!overlay.tick());
    overlay.toggle();
    overlay.recompute();
    assert!(!overlay.has_pending_frame());
    assert!(!overlay.state().is_computing);
}

#[test]
fn config_sets_initial_sensitivity_and_debounce() {
    let clock = ManualClock::new();
    let mut overlay = OverlayController::new(
        OverlayConfig::default()
            .with_debounce_ms(50)
            .with_initial_sensitivity(120),
    )
    .with_clock(clock.clone());
    overlay.set_surfaces(drawing(20, 20, &[]), drawing(20, 20, &[]));

    overlay.toggle();
    overlay.run_frame();
    assert_eq!(overlay.state().last_result.as_ref().map(|r| r.threshold), Some(120));

    overlay.set_sensitivity(1);
    clock.advance_ms(50);
    assert!(overlay.tick());
}
