// src/raster/source.rs

//! Live raster handles.
//!
//! The viewer owns the rendered drawings; the diff engine only borrows read
//! access to them. Reading can be refused (a tainted cross-origin canvas, a
//! GPU texture that cannot be mapped), so it is fallible and kept separate from
//! querying the size, which never is.

use crate::raster::surface::RasterSurface;
use crate::utils::error::Result;
use std::borrow::Cow;
use std::cell::RefCell;
use std::rc::Rc;

/// A rendered drawing the diff engine can inspect.
pub trait RasterSource {
    /// Current size in pixels. `(0, 0)` means not rendered yet.
    fn dimensions(&self) -> (u32, u32);

    /// Pixel data, or [`DiffError::Read`](crate::DiffError::Read) when access
    /// is denied.
    fn read_pixels(&self) -> Result<Cow<'_, RasterSurface>>;
}

impl RasterSource for RasterSurface {
    fn dimensions(&self) -> (u32, u32) {
        RasterSurface::dimensions(self)
    }

    fn read_pixels(&self) -> Result<Cow<'_, RasterSurface>> {
        Ok(Cow::Borrowed(self))
    }
}

/// A surface the viewer keeps re-rendering in place.
impl RasterSource for RefCell<RasterSurface> {
    fn dimensions(&self) -> (u32, u32) {
        self.borrow().dimensions()
    }

    fn read_pixels(&self) -> Result<Cow<'_, RasterSurface>> {
        Ok(Cow::Owned(self.borrow().clone()))
    }
}

impl<T: RasterSource + ?Sized> RasterSource for Rc<T> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn read_pixels(&self) -> Result<Cow<'_, RasterSurface>> {
        (**self).read_pixels()
    }
}

impl<T: RasterSource + ?Sized> RasterSource for Box<T> {
    fn dimensions(&self) -> (u32, u32) {
        (**self).dimensions()
    }

    fn read_pixels(&self) -> Result<Cow<'_, RasterSurface>> {
        (**self).read_pixels()
    }
}
