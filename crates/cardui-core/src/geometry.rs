#![forbid(unsafe_code)]

//! Geometric primitives.

/// A point in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`.
    #[inline]
    pub fn delta_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    /// Translate by `delta`.
    #[inline]
    pub fn offset(self, delta: Point) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }
}

/// A rectangle in CSS pixels, as reported by `getBoundingClientRect()`.
///
/// Uses viewport coordinates (origin at top-left, y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge (alias for x).
    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    /// Top edge (alias for y).
    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Position of this rectangle relative to `container`'s top-left corner.
    ///
    /// The size is unchanged.
    #[inline]
    pub fn relative_to(&self, container: &Rect) -> Rect {
        Rect::new(
            self.x - container.x,
            self.y - container.y,
            self.width,
            self.height,
        )
    }

    /// Point at fractional coordinates inside the rectangle.
    ///
    /// `(0.0, 0.0)` is the top-left corner, `(1.0, 1.0)` the bottom-right.
    #[inline]
    pub fn point_at(&self, fx: f64, fy: f64) -> Point {
        Point::new(self.x + self.width * fx, self.y + self.height * fy)
    }
}
