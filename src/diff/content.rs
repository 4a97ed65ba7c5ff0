// src/diff/content.rs

//! Per-surface ink classification.
//!
//! A pixel is ink ("content") when it is at least partly opaque and darker than
//! the content threshold. Light or transparent pixels are background. The
//! comparison is strict, so a pixel sitting exactly on the threshold is
//! background.

use crate::raster::surface::{RasterSurface, Rgba};
use bitvec::prelude::*;

#[inline]
pub fn is_content_pixel(pixel: &Rgba, content_threshold: f64) -> bool {
    pixel.a > 0 && pixel.luminance() < content_threshold
}

/// One bit per pixel, set where the surface has ink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMap {
    width: u32,
    height: u32,
    bits: BitVec,
}

impl ContentMap {
    pub fn classify(surface: &RasterSurface, content_threshold: f64) -> Self {
        let bits: BitVec = surface
            .pixels()
            .iter()
            .map(|p| is_content_pixel(p, content_threshold))
            .collect();
        ContentMap {
            width: surface.width(),
            height: surface.height(),
            bits,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Ink flag by linear pixel index.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        self.bits[index]
    }

    pub fn is_content(&self, x: u32, y: u32) -> bool {
        assert!(x < self.width && y < self.height);
        self.get(y as usize * self.width as usize + x as usize)
    }

    /// Number of ink pixels.
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    pub fn as_bitslice(&self) -> &BitSlice {
        &self.bits
    }
}
