//! Geometric primitives for diagram layout.
//!
//! # Overview
//!
//! - [`Point`] - A 2D coordinate
//! - [`Size`] - Width and height dimensions
//! - [`Bounds`] - An axis-aligned rectangle stored as min/max coordinates
//!
//! # Coordinate System
//!
//! Coordinates follow the diagram-interchange convention used by process
//! diagrams and SVG alike:
//!
//! ```text
//!   (0,0) ────────► +X
//!     │
//!     │
//!     ▼
//!    +Y
//! ```
//!
//! A [`Bounds`] is (de)serialized as `{ x, y, width, height }` with `(x, y)`
//! being its top-left corner.

use serde::{Deserialize, Serialize};

/// Tolerance below which two extents are considered touching rather than
/// overlapping.
pub const OVERLAP_EPSILON: f32 = 1e-3;

/// A 2D point in diagram space.
///
/// ```
/// # use swimlane_core::geometry::Point;
/// let origin = Point::new(200.0, 200.0);
/// let local = Point::new(10.0, 10.0);
///
/// let absolute = local.add_point(origin);
/// assert_eq!(absolute, Point::new(210.0, 210.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// Width and height of an element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the component-wise maximum of two sizes
    pub fn max(self, other: Size) -> Self {
        Self {
            width: self.width.max(other.width),
            height: self.height.max(other.height),
        }
    }
}

/// Axis-aligned rectangle stored as minimum and maximum coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Rect", into = "Rect")]
pub struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

/// Serialized form of [`Bounds`].
#[derive(Serialize, Deserialize)]
struct Rect {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        Bounds::new_from_top_left(Point::new(rect.x, rect.y), Size::new(rect.width, rect.height))
    }
}

impl From<Bounds> for Rect {
    fn from(bounds: Bounds) -> Self {
        Rect {
            x: bounds.min_x,
            y: bounds.min_y,
            width: bounds.width(),
            height: bounds.height(),
        }
    }
}

impl Bounds {
    /// Creates bounds centered on `center`
    pub fn new_from_center(center: Point, size: Size) -> Self {
        let half_width = size.width / 2.0;
        let half_height = size.height / 2.0;
        Self {
            min_x: center.x - half_width,
            min_y: center.y - half_height,
            max_x: center.x + half_width,
            max_y: center.y + half_height,
        }
    }

    /// Creates bounds whose top-left corner is `top_left`
    pub fn new_from_top_left(top_left: Point, size: Size) -> Self {
        Self {
            min_x: top_left.x,
            min_y: top_left.y,
            max_x: top_left.x + size.width,
            max_y: top_left.y + size.height,
        }
    }

    pub fn min_x(self) -> f32 {
        self.min_x
    }

    pub fn min_y(self) -> f32 {
        self.min_y
    }

    pub fn max_x(self) -> f32 {
        self.max_x
    }

    pub fn max_y(self) -> f32 {
        self.max_y
    }

    pub fn width(self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Returns the top-left corner
    pub fn min_point(self) -> Point {
        Point::new(self.min_x, self.min_y)
    }

    pub fn to_size(self) -> Size {
        Size::new(self.width(), self.height())
    }

    /// Midpoint of the top edge
    pub fn top_center(self) -> Point {
        Point::new(self.center().x, self.min_y)
    }

    /// Midpoint of the bottom edge
    pub fn bottom_center(self) -> Point {
        Point::new(self.center().x, self.max_y)
    }

    /// Midpoint of the left edge
    pub fn left_center(self) -> Point {
        Point::new(self.min_x, self.center().y)
    }

    /// Midpoint of the right edge
    pub fn right_center(self) -> Point {
        Point::new(self.max_x, self.center().y)
    }

    /// Returns the same-sized bounds moved so that its top-left is `top_left`
    pub fn with_min_point(self, top_left: Point) -> Self {
        Self::new_from_top_left(top_left, self.to_size())
    }

    /// Smallest bounds containing both `self` and `other`.
    ///
    /// ```
    /// # use swimlane_core::geometry::{Bounds, Point, Size};
    /// let lane_a = Bounds::new_from_top_left(Point::new(30.0, 0.0), Size::new(400.0, 150.0));
    /// let lane_b = Bounds::new_from_top_left(Point::new(30.0, 150.0), Size::new(400.0, 120.0));
    ///
    /// let pool = lane_a.merge(&lane_b);
    /// assert_eq!(pool.height(), 270.0);
    /// ```
    pub fn merge(&self, other: &Self) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Moves the bounds by `offset`
    pub fn translate(&self, offset: Point) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            min_y: self.min_y + offset.y,
            max_x: self.max_x + offset.x,
            max_y: self.max_y + offset.y,
        }
    }

    /// Length of the shared extent on the x-axis (negative when apart)
    pub fn overlap_x(&self, other: &Self) -> f32 {
        self.max_x.min(other.max_x) - self.min_x.max(other.min_x)
    }

    /// Length of the shared extent on the y-axis (negative when apart)
    pub fn overlap_y(&self, other: &Self) -> f32 {
        self.max_y.min(other.max_y) - self.min_y.max(other.min_y)
    }

    /// Returns true if the interiors of the two rectangles intersect.
    ///
    /// Rectangles that merely touch along an edge do not intersect.
    ///
    /// ```
    /// # use swimlane_core::geometry::{Bounds, Point, Size};
    /// let a = Bounds::new_from_top_left(Point::new(0.0, 0.0), Size::new(100.0, 80.0));
    /// let b = Bounds::new_from_top_left(Point::new(100.0, 0.0), Size::new(100.0, 80.0));
    /// let c = Bounds::new_from_top_left(Point::new(90.0, 70.0), Size::new(100.0, 80.0));
    ///
    /// assert!(!a.intersects(&b));
    /// assert!(a.intersects(&c));
    /// ```
    pub fn intersects(&self, other: &Self) -> bool {
        self.overlap_x(other) > OVERLAP_EPSILON && self.overlap_y(other) > OVERLAP_EPSILON
    }
}


#[cfg(test)]
mod proptest_tests {
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    use super::*;

    fn bounds_strategy() -> impl Strategy<Value = Bounds> {
        (
            -1000.0f32..1000.0,
            -1000.0f32..1000.0,
            1.0f32..500.0,
            1.0f32..500.0,
        )
            .prop_map(|(x, y, w, h)| Bounds::new_from_top_left(Point::new(x, y), Size::new(w, h)))
    }

    fn point_strategy() -> impl Strategy<Value = Point> {
        (-1000.0f32..1000.0, -1000.0f32..1000.0).prop_map(|(x, y)| Point::new(x, y))
    }

    /// Intersection must not depend on argument order.
    fn check_intersects_is_symmetric(a: Bounds, b: Bounds) -> Result<(), TestCaseError> {
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
        Ok(())
    }

    /// A rectangle with positive area always intersects itself.
    fn check_intersects_self(a: Bounds) -> Result<(), TestCaseError> {
        prop_assert!(a.intersects(&a));
        Ok(())
    }

    /// Moving `b` to start exactly at `a.max_x` clears the overlap.
    fn check_clearing_by_overlap_separates(a: Bounds, b: Bounds) -> Result<(), TestCaseError> {
        let cleared = b.with_min_point(Point::new(a.max_x(), b.min_y()));
        prop_assert!(!a.intersects(&cleared));
        Ok(())
    }

    /// Merged bounds contain both inputs.
    fn check_merge_contains_both(a: Bounds, b: Bounds) -> Result<(), TestCaseError> {
        let merged = a.merge(&b);
        for r in [a, b] {
            prop_assert!(merged.min_x() <= r.min_x() + 0.001);
            prop_assert!(merged.min_y() <= r.min_y() + 0.001);
            prop_assert!(merged.max_x() >= r.max_x() - 0.001);
            prop_assert!(merged.max_y() >= r.max_y() - 0.001);
        }
        Ok(())
    }

    /// Translating by an offset and back returns the original bounds.
    fn check_translate_roundtrip(bounds: Bounds, offset: Point) -> Result<(), TestCaseError> {
        let back = Point::new(-offset.x(), -offset.y());
        let roundtrip = bounds.translate(offset).translate(back);
        prop_assert!(approx_eq!(f32, roundtrip.min_x(), bounds.min_x(), epsilon = 0.001));
        prop_assert!(approx_eq!(f32, roundtrip.min_y(), bounds.min_y(), epsilon = 0.001));
        prop_assert!(approx_eq!(f32, roundtrip.width(), bounds.width(), epsilon = 0.001));
        prop_assert!(approx_eq!(f32, roundtrip.height(), bounds.height(), epsilon = 0.001));
        Ok(())
    }

    proptest! {
        #[test]
        fn intersects_is_symmetric(a in bounds_strategy(), b in bounds_strategy()) {
            check_intersects_is_symmetric(a, b)?;
        }

        #[test]
        fn intersects_self(a in bounds_strategy()) {
            check_intersects_self(a)?;
        }

        #[test]
        fn clearing_by_overlap_separates(a in bounds_strategy(), b in bounds_strategy()) {
            check_clearing_by_overlap_separates(a, b)?;
        }

        #[test]
        fn merge_contains_both(a in bounds_strategy(), b in bounds_strategy()) {
            check_merge_contains_both(a, b)?;
        }

        #[test]
        fn translate_roundtrip(bounds in bounds_strategy(), offset in point_strategy()) {
            check_translate_roundtrip(bounds, offset)?;
        }
    }
}
