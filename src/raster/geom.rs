// src/raster/geom.rs

//! Integer rectangles in surface pixel space.

/// An axis-aligned rectangle with integer coordinates.
///
/// Defined by its top-left corner (`x`, `y`) and its `width` and `height`.
/// The right and bottom edges are exclusive.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Rect {
            x,
            y,
            width,
            height,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// The rectangle covering a whole `width x height` surface.
    pub fn of_size(width: u32, height: u32) -> Self {
        Rect::new(0, 0, width, height)
    }

    /// Smallest rectangle covering every point, widened to whole pixels.
    ///
    /// Non-finite coordinates make the result empty.
    pub fn enclosing(points: &[(f64, f64)]) -> Rect {
        if points.is_empty() || points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Rect::empty();
        }

        let (mut min_x, mut min_y) = (f64::MAX, f64::MAX);
        let (mut max_x, mut max_y) = (f64::MIN, f64::MIN);
        for &(x, y) in points {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }

        let clamp = |v: f64| v.clamp(i32::MIN as f64, i32::MAX as f64) as i64;
        let x0 = clamp(min_x.floor());
        let y0 = clamp(min_y.floor());
        let x1 = clamp(max_x.ceil());
        let y1 = clamp(max_y.ceil());

        if x1 <= x0 || y1 <= y0 {
            return Rect::empty();
        }
        let width = (x1 - x0).min(u32::MAX as i64) as u32;
        let height = (y1 - y0).min(u32::MAX as i64) as u32;
        Rect::new(x0 as i32, y0 as i32, width, height)
    }

    /// x-coordinate of the right edge (`x + width`).
    pub fn x_max(&self) -> i32 {
        (self.x as i64 + self.width as i64).min(i32::MAX as i64) as i32
    }

    /// y-coordinate of the bottom edge (`y + height`).
    pub fn y_max(&self) -> i32 {
        (self.y as i64 + self.height as i64).min(i32::MAX as i64) as i32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, px: i32, py: i32) -> bool {
        !self.is_empty() && px >= self.x && px < self.x_max() && py >= self.y && py < self.y_max()
    }

    /// Returns the overlap of `self` and `other`, or an empty rectangle.
    pub fn intersection(&self, other: &Rect) -> Rect {
        if self.is_empty() || other.is_empty() {
            return Rect::empty();
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);

        let x_max = self.x_max().min(other.x_max());
        let y_max = self.y_max().min(other.y_max());

        if x >= x_max || y >= y_max {
            Rect::empty()
        } else {
            Rect::new(x, y, (x_max - x) as u32, (y_max - y) as u32)
        }
    }
}
