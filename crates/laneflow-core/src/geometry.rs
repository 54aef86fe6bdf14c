//! Geometric primitives for process diagram layout.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate in diagram space (edge waypoints)
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - A rectangular box (node shapes, lane bands, the participant)
//!
//! # Coordinate System
//!
//! Coordinates follow the BPMN DI and SVG convention:
//!
//! ```text
//!   (0,0) ────────► +X   (columns advance rightward)
//!     │
//!     │
//!     ▼
//!    +Y                  (rows and lanes advance downward)
//! ```

/// A 2D point in diagram coordinate space.
///
/// # Examples
///
/// ```
/// # use laneflow_core::geometry::Point;
/// let center = Point::new(150.0, 90.0);
/// let label = center.with_y(130.0);
///
/// assert_eq!(label.x(), 150.0);
/// assert_eq!(label.y(), 130.0);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f32 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f32 {
        self.y
    }

    /// Creates a new point with the specified y-coordinate
    pub fn with_y(mut self, y: f32) -> Self {
        self.y = y;
        self
    }
}

/// Width and height of a shape.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Creates a size with equal sides, as used by events and gateways.
    pub fn square(side: f32) -> Self {
        Self::new(side, side)
    }

    /// Returns the width of the size
    pub fn width(self) -> f32 {
        self.width
    }

    /// Returns the height of the size
    pub fn height(self) -> f32 {
        self.height
    }
}

/// Represents a rectangular bounding box with minimum and maximum coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    /// Creates a new bounds from a top-left point and a size
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width(),
            max_y: top_left.y + size.height(),
        }
    }

    /// Returns the minimum x-coordinate of the bounds
    pub fn min_x(self) -> f32 {
        self.min_x
    }

    /// Returns the minimum y-coordinate of the bounds
    pub fn min_y(self) -> f32 {
        self.min_y
    }

    /// Returns the maximum x-coordinate of the bounds
    pub fn max_x(self) -> f32 {
        self.max_x
    }

    /// Returns the maximum y-coordinate of the bounds
    pub fn max_y(self) -> f32 {
        self.max_y
    }

    /// Returns the center point of the bounds
    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the width of the bounds
    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    /// Returns the height of the bounds
    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    /// Returns `true` if `point` lies inside or on the edge of the bounds.
    pub fn contains(self, point: Point) -> bool {
        point.x >= self.min_x
            && point.x <= self.max_x
            && point.y >= self.min_y
            && point.y <= self.max_y
    }
}
