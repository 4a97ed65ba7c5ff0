// src/raster/surface.rs

//! In-memory RGBA raster surfaces.
//!
//! [`RasterSurface`] is the owned pixel grid every stage of the diff pipeline
//! reads and writes: 4 bytes per pixel (R, G, B, A), row-major, with explicit
//! width and height. Pixel accessors are bounds-checked so callers never do
//! raw offset arithmetic.
//!
//! An extension trait, [`SurfaceCompositeExt`], adds the overlay rendering
//! step: compositing a diff mask over a drawing at a caller-chosen opacity.

use crate::raster::geom::Rect;
use crate::utils::error::{DiffError, Result};
use bytemuck::{Pod, Zeroable};

// --- Pixel Type Definitions ---

/// A single RGBA pixel with 8-bit, non-premultiplied components.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Rgba { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Rgba { r, g, b, a: 255 }
    }

    pub const fn black() -> Self {
        Rgba::opaque(0, 0, 0)
    }

    pub const fn white() -> Self {
        Rgba::opaque(255, 255, 255)
    }

    /// Perceptual luminance `0.299 R + 0.587 G + 0.114 B`, in `0.0..=255.0`.
    ///
    /// Alpha is ignored.
    #[inline]
    pub fn luminance(&self) -> f64 {
        0.299 * self.r as f64 + 0.587 * self.g as f64 + 0.114 * self.b as f64
    }

    /// Same color with its alpha replaced.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Rgba { a, ..self }
    }
}

impl From<[u8; 4]> for Rgba {
    fn from(arr: [u8; 4]) -> Self {
        Rgba::new(arr[0], arr[1], arr[2], arr[3])
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(p: Rgba) -> Self {
        [p.r, p.g, p.b, p.a]
    }
}

// --- Surface Type ---

/// A 2D buffer of RGBA pixels stored in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    data: Vec<Rgba>,
}

fn pixel_count(width: u32, height: u32) -> usize {
    width as usize * height as usize
}

impl RasterSurface {
    /// Creates a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_pixel(width, height, Rgba::TRANSPARENT)
    }

    /// Creates a surface filled with a single pixel value.
    pub fn from_pixel(width: u32, height: u32, pixel: Rgba) -> Self {
        RasterSurface {
            width,
            height,
            data: vec![pixel; pixel_count(width, height)],
        }
    }

    /// Creates a surface by calling a function for each pixel.
    pub fn from_fn<F>(width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> Rgba,
    {
        let mut data = Vec::with_capacity(pixel_count(width, height));
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        RasterSurface {
            width,
            height,
            data,
        }
    }

    /// Wraps raw `R, G, B, A` bytes, e.g. the contents of a canvas image data.
    pub fn from_raw_rgba(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        let expected = pixel_count(width, height) * 4;
        if bytes.len() != expected {
            return Err(DiffError::InvalidArg(format!(
                "expected {} bytes for a {}x{} surface, got {}",
                expected,
                width,
                height,
                bytes.len()
            )));
        }
        Ok(RasterSurface {
            width,
            height,
            data: bytemuck::cast_slice::<u8, Rgba>(bytes).to_vec(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the dimensions as a tuple (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// True when either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn bounds(&self) -> Rect {
        Rect::of_size(self.width, self.height)
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} surface",
            self.width,
            self.height
        );
        y as usize * self.width as usize + x as usize
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Rgba {
        self.data[self.index(x, y)]
    }

    pub fn get_pixel_mut(&mut self, x: u32, y: u32) -> &mut Rgba {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, pixel: Rgba) {
        let idx = self.index(x, y);
        self.data[idx] = pixel;
    }

    /// Like [`get_pixel`](Self::get_pixel) but returns `None` out of bounds.
    pub fn pixel_checked(&self, x: i64, y: i64) -> Option<Rgba> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.data[y as usize * self.width as usize + x as usize])
    }

    /// One row of pixels.
    pub fn row(&self, y: u32) -> &[Rgba] {
        assert!(y < self.height);
        let start = y as usize * self.width as usize;
        &self.data[start..start + self.width as usize]
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.data
    }

    pub fn pixels_mut(&mut self) -> &mut [Rgba] {
        &mut self.data
    }

    /// Raw pixel data as a byte slice (4 bytes per pixel).
    pub fn as_raw(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Mutable raw pixel data as a byte slice.
    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.data)
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.as_raw().to_vec()
    }

    /// Sets every pixel to transparent.
    pub fn clear(&mut self) {
        self.data.fill(Rgba::TRANSPARENT);
    }

    /// Resizes in place, keeping the allocation where possible. The content
    /// is cleared to transparent.
    pub fn resize_to(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(pixel_count(width, height), Rgba::TRANSPARENT);
    }

    /// Makes `self` a pixel-for-pixel copy of `other`, reusing the buffer.
    pub fn copy_from(&mut self, other: &RasterSurface) {
        self.width = other.width;
        self.height = other.height;
        self.data.clear();
        self.data.extend_from_slice(&other.data);
    }

    /// Number of pixels with a non-zero alpha channel.
    pub fn count_visible(&self) -> usize {
        self.data.iter().filter(|p| p.a > 0).count()
    }
}

/// Rendering operations used to display a diff mask on top of a drawing.
pub trait SurfaceCompositeExt {
    /// Draws `overlay` over `self` with its top-left corner at
    /// (`x_pos`, `y_pos`), using source-over blending.
    ///
    /// `opacity` (clamped to `0.0..=1.0`) multiplies the overlay's own alpha.
    /// Parts of the overlay falling outside `self` are clipped.
    fn composite_over(&mut self, overlay: &RasterSurface, x_pos: i32, y_pos: i32, opacity: f32);
}

impl SurfaceCompositeExt for RasterSurface {
    fn composite_over(&mut self, overlay: &RasterSurface, x_pos: i32, y_pos: i32, opacity: f32) {
        let opacity = if opacity.is_finite() { opacity.clamp(0.0, 1.0) } else { 0.0 };
        if opacity == 0.0 {
            return;
        }

        let overlay_rect = Rect::new(x_pos, y_pos, overlay.width, overlay.height);
        let overlap = self.bounds().intersection(&overlay_rect);
        if overlap.is_empty() {
            return;
        }

        for y in 0..overlap.height {
            for x in 0..overlap.width {
                let self_x = (overlap.x + x as i32) as u32;
                let self_y = (overlap.y + y as i32) as u32;
                let src = overlay.get_pixel((self_x as i32 - x_pos) as u32, (self_y as i32 - y_pos) as u32);
                if src.a == 0 {
                    continue;
                }

                let dst = self.get_pixel_mut(self_x, self_y);
                let sa = src.a as f32 / 255.0 * opacity;
                let da = dst.a as f32 / 255.0;
                let out_a = sa + da * (1.0 - sa);
                if out_a <= 0.0 {
                    continue;
                }

                let blend = |s: u8, d: u8| -> u8 {
                    let c = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
                    c.round().clamp(0.0, 255.0) as u8
                };
                *dst = Rgba::new(
                    blend(src.r, dst.r),
                    blend(src.g, dst.g),
                    blend(src.b, dst.b),
                    (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
                );
            }
        }
    }
}
