// src/transform/render.rs

//! Bakes an alignment transform into a new surface.
//!
//! The candidate drawing is re-rendered into the base drawing's pixel space so
//! the two can be compared pixel by pixel. Every destination pixel centre is
//! mapped back through the inverse matrix and takes the nearest source pixel;
//! destination pixels that map outside the source stay transparent.

use crate::raster::geom::Rect;
use crate::raster::surface::RasterSurface;
use crate::transform::affine::AffineTransform;

/// Renders `source` under `transform` into a fresh `target_width x target_height`
/// surface.
///
/// Translation percentages are resolved against the source dimensions. A
/// transform that collapses the plane (scale 0) draws nothing, leaving the
/// target fully transparent.
pub fn render_transformed(
    source: &RasterSurface,
    transform: &AffineTransform,
    target_width: u32,
    target_height: u32,
) -> RasterSurface {
    let mut target = RasterSurface::new(target_width, target_height);
    if source.is_empty() || target.is_empty() {
        return target;
    }

    let forward = transform.to_matrix(source.width(), source.height());
    let Some(inverse) = forward.inverse() else {
        log::debug!("transform {transform} is singular, nothing drawn");
        return target;
    };

    // Only pixels under the transformed source can receive content.
    let (sw, sh) = (source.width() as f64, source.height() as f64);
    let corners = [
        forward.apply(0.0, 0.0),
        forward.apply(sw, 0.0),
        forward.apply(0.0, sh),
        forward.apply(sw, sh),
    ];
    let region = Rect::enclosing(&corners).intersection(&target.bounds());
    if region.is_empty() {
        return target;
    }

    for y in region.y..region.y_max() {
        for x in region.x..region.x_max() {
            let (u, v) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
            if let Some(pixel) = source.pixel_checked(u.floor() as i64, v.floor() as i64) {
                target.put_pixel(x as u32, y as u32, pixel);
            }
        }
    }

    target
}

/// [`render_transformed`] driven by an alignment string.
///
/// A missing or unparsable string (or any malformed component of it) falls
/// back to identity for that part, see [`AffineTransform::parse_lenient`].
pub fn render_aligned(
    source: &RasterSurface,
    alignment: Option<&str>,
    target_width: u32,
    target_height: u32,
) -> RasterSurface {
    let transform = AffineTransform::parse_lenient(alignment);
    render_transformed(source, &transform, target_width, target_height)
}
