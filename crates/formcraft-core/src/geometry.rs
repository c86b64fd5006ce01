//! Geometric primitives.
//!
//! Coordinates are host-defined units (usually CSS pixels) with the origin at
//! the top-left of the canvas. Pointer samples and element bounds must share
//! the same coordinate space.

use serde::{Deserialize, Serialize};

/// A pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
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
}

/// Primary direction along which a container arranges its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAxis {
    /// Children flow left to right.
    Row,
    /// Children flow top to bottom.
    #[default]
    Column,
}

impl LayoutAxis {
    /// The coordinate of `point` along this axis.
    #[inline]
    pub const fn coord(self, point: Point) -> f64 {
        match self {
            Self::Row => point.x,
            Self::Column => point.y,
        }
    }

    /// The perpendicular axis.
    #[inline]
    pub const fn cross(self) -> Self {
        match self {
            Self::Row => Self::Column,
            Self::Column => Self::Row,
        }
    }

    /// Stable lowercase name, as used in markup and snapshots.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Row => "row",
            Self::Column => "column",
        }
    }
}

/// A rectangle for element bounds, content boxes and insertion indicators.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: f64,
    /// Top edge (inclusive).
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

    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

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

    /// Area, treating negative extents as zero.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Check if the rectangle has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Check if a point is inside the rectangle (half-open on the far edges).
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Centre of the rectangle.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Leading edge along `axis` (left for rows, top for columns).
    #[inline]
    pub fn start(&self, axis: LayoutAxis) -> f64 {
        match axis {
            LayoutAxis::Row => self.x,
            LayoutAxis::Column => self.y,
        }
    }

    /// Trailing edge along `axis`.
    #[inline]
    pub fn end(&self, axis: LayoutAxis) -> f64 {
        match axis {
            LayoutAxis::Row => self.right(),
            LayoutAxis::Column => self.bottom(),
        }
    }

    /// Extent along `axis`.
    #[inline]
    pub fn extent(&self, axis: LayoutAxis) -> f64 {
        match axis {
            LayoutAxis::Row => self.width,
            LayoutAxis::Column => self.height,
        }
    }

    /// Midpoint along `axis`.
    #[inline]
    pub fn mid(&self, axis: LayoutAxis) -> f64 {
        self.start(axis) + self.extent(axis) / 2.0
    }

    /// Shrink by `padding` on every side. Extents never go negative.
    pub fn inner(&self, padding: Sides) -> Rect {
        Rect {
            x: self.x + padding.left,
            y: self.y + padding.top,
            width: (self.width - padding.horizontal_sum()).max(0.0),
            height: (self.height - padding.vertical_sum()).max(0.0),
        }
    }

    /// Smallest rectangle containing both.
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(x, y, right - x, bottom - y)
    }
}

/// Per-side insets (padding).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sides {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Sides {
    /// Equal insets on every side.
    pub const fn all(val: f64) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new sides with specific values.
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub fn horizontal_sum(&self) -> f64 {
        self.left + self.right
    }

    /// Sum of top and bottom.
    #[inline]
    pub fn vertical_sum(&self) -> f64 {
        self.top + self.bottom
    }
}
