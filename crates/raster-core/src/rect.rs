//! Rectangle and size types for bitmap regions.
//!
//! Resizing always maps one axis-aligned source region onto one target
//! region, so both sides of every operation are described with [`Rect`].
//!
//! # Coordinate System
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │  Region  │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```
//!
//! Left/top edges are inclusive, right/bottom edges exclusive.
//!
//! # Usage
//!
//! ```rust
//! use raster_core::{Rect, Size};
//!
//! let rect = Rect::new(10, 20, 100, 50);
//! assert_eq!(rect.right(), 110);
//! assert_eq!(rect.size(), Size::new(100, 50));
//!
//! let bounds = Rect::from_size(64, 64);
//! assert!(bounds.contains_rect(&Rect::new(0, 0, 64, 64)));
//! ```
//!
//! # Used By
//!
//! - [`crate::bitmap::Bitmap`] - region validation, region copies
//! - `raster-ops` - source/target rectangles of a resize

/// Width and height of a region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Creates a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// # Invariants
///
/// A rectangle with zero width or height is empty; resize operations
/// reject empty rectangles before touching any pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(C)]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: u32,
    /// Y coordinate of the top edge (inclusive)
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin with the given size.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the X coordinate of the right edge (exclusive).
    ///
    /// Saturates instead of overflowing so that a malformed rectangle is
    /// reported by [`contains_rect`](Self::contains_rect) rather than panicking.
    #[inline]
    pub const fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    /// Returns the Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    /// Returns the dimensions of the rectangle.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the area of the rectangle in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point (px, py) is inside this rectangle.
    #[inline]
    pub const fn contains(&self, px: u32, py: u32) -> bool {
        px >= self.x && px < self.right() && py >= self.y && py < self.bottom()
    }

    /// Returns `true` if this rectangle fully contains another.
    ///
    /// # Example
    ///
    /// ```rust
    /// use raster_core::Rect;
    ///
    /// let outer = Rect::from_size(100, 100);
    /// assert!(outer.contains_rect(&Rect::new(10, 10, 90, 90)));
    /// assert!(!outer.contains_rect(&Rect::new(10, 10, 91, 90)));
    /// ```
    #[inline]
    pub const fn contains_rect(&self, other: &Rect) -> bool {
        // saturated edges of a malformed `other` must not pass the check
        other.x.checked_add(other.width).is_some()
            && other.y.checked_add(other.height).is_some()
            && other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Returns the intersection of this rectangle with another, or `None`
    /// if they don't overlap.
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if x < right && y < bottom {
            Some(Rect::new(x, y, right - x, bottom - y))
        } else {
            None
        }
    }
}

impl From<Size> for Rect {
    fn from(size: Size) -> Self {
        Rect::from_size(size.width, size.height)
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) {}x{}", self.x, self.y, self.width, self.height)
    }
}
