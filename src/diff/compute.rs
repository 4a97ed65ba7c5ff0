// src/diff/compute.rs

//! Content-presence diff between two aligned drawings.
//!
//! Each surface is classified into ink/background on its own (see
//! [`ContentMap`]) and only the classifications are compared. Subtracting raw
//! intensities would light up every anti-aliased edge after an approximate
//! alignment; comparing ink presence does not.
//!
//! Per pixel pair the outcome is exactly one of:
//! - base-only ink: painted with `base_only_color`, counted,
//! - candidate-only ink: painted with `candidate_only_color`, counted,
//! - agreement (both ink or both background): left transparent.
//!
//! A marker's alpha is the color's alpha scaled by
//! `max(min_marker_opacity, (content_threshold - luminance) / content_threshold)`,
//! so darker ink yields a more opaque marker.

use crate::diff::content::ContentMap;
use crate::diff::options::DiffOptions;
use crate::raster::source::RasterSource;
use crate::raster::surface::{RasterSurface, Rgba};
use crate::utils::error::{DiffError, Result};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Output of one diff pass.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    /// Same size as the inputs; only differing pixels are non-transparent.
    pub mask: RasterSurface,
    pub diff_pixel_count: u64,
    /// `diff_pixel_count / (width * height) * 100`, in `0.0..=100.0`.
    pub diff_percentage: f64,
    /// Threshold the pass ran with.
    pub threshold: u8,
}

impl DiffResult {
    pub fn has_differences(&self) -> bool {
        self.diff_pixel_count > 0
    }
}

struct RowPainter<'a> {
    width: usize,
    base: &'a [Rgba],
    candidate: &'a [Rgba],
    base_map: &'a ContentMap,
    candidate_map: &'a ContentMap,
    options: &'a DiffOptions,
    content_threshold: f64,
}

impl RowPainter<'_> {
    fn marker(&self, color: Rgba, luminance: f64) -> Rgba {
        let strength = ((self.content_threshold - luminance) / self.content_threshold)
            .max(self.options.min_marker_opacity);
        let alpha = (color.a as f64 * strength).round().clamp(0.0, 255.0) as u8;
        color.with_alpha(alpha)
    }

    /// Paints row `y` of the mask and returns how many pixels differ.
    fn paint(&self, y: usize, row: &mut [Rgba]) -> u64 {
        let mut count = 0;
        let offset = y * self.width;

        for (x, out) in row.iter_mut().enumerate() {
            let i = offset + x;
            match (self.base_map.get(i), self.candidate_map.get(i)) {
                (true, false) => {
                    *out = self.marker(self.options.base_only_color, self.base[i].luminance());
                    count += 1;
                }
                (false, true) => {
                    *out = self.marker(
                        self.options.candidate_only_color,
                        self.candidate[i].luminance(),
                    );
                    count += 1;
                }
                _ => {}
            }
        }

        count
    }
}

/// Compares two same-size surfaces.
///
/// Equal dimensions are the caller's responsibility (render the candidate
/// through [`render_transformed`](crate::render_transformed) first); a mismatch
/// returns [`DiffError::DimensionMismatch`]. The result is deterministic for
/// fixed inputs.
pub fn compute_diff(
    base: &RasterSurface,
    candidate: &RasterSurface,
    options: &DiffOptions,
) -> Result<DiffResult> {
    if base.dimensions() != candidate.dimensions() {
        return Err(DiffError::DimensionMismatch {
            expected: base.dimensions(),
            actual: candidate.dimensions(),
        });
    }

    let (width, height) = base.dimensions();
    let mut mask = RasterSurface::new(width, height);
    let total = width as u64 * height as u64;
    if total == 0 {
        return Ok(DiffResult {
            mask,
            diff_pixel_count: 0,
            diff_percentage: 0.0,
            threshold: options.threshold,
        });
    }

    let content_threshold = options.content_threshold();
    let base_map = ContentMap::classify(base, content_threshold);
    let candidate_map = ContentMap::classify(candidate, content_threshold);

    let painter = RowPainter {
        width: width as usize,
        base: base.pixels(),
        candidate: candidate.pixels(),
        base_map: &base_map,
        candidate_map: &candidate_map,
        options,
        content_threshold,
    };

    #[cfg(feature = "rayon")]
    let diff_pixel_count: u64 = mask
        .pixels_mut()
        .par_chunks_mut(width as usize)
        .enumerate()
        .map(|(y, row)| painter.paint(y, row))
        .sum();

    #[cfg(not(feature = "rayon"))]
    let diff_pixel_count: u64 = mask
        .pixels_mut()
        .chunks_mut(width as usize)
        .enumerate()
        .map(|(y, row)| painter.paint(y, row))
        .sum();

    Ok(DiffResult {
        mask,
        diff_pixel_count,
        diff_percentage: diff_pixel_count as f64 / total as f64 * 100.0,
        threshold: options.threshold,
    })
}

/// [`compute_diff`] over live raster handles.
///
/// Unreadable pixel data yields [`DiffError::Read`] ("Could not read canvas
/// data"); callers treat it as recoverable.
pub fn compute_diff_sources(
    base: &dyn RasterSource,
    candidate: &dyn RasterSource,
    options: &DiffOptions,
) -> Result<DiffResult> {
    let base_pixels = base.read_pixels().map_err(as_read_error)?;
    let candidate_pixels = candidate.read_pixels().map_err(as_read_error)?;
    compute_diff(&base_pixels, &candidate_pixels, options)
}

pub(crate) fn as_read_error(err: DiffError) -> DiffError {
    match err {
        DiffError::Read(_) => err,
        other => DiffError::Read(other.to_string()),
    }
}
