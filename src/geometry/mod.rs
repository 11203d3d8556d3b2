/*!
2D geometry kernel: vectors, polygons and visibility graphs over
polygonal obstacles.

Vertices are identified by exact coordinate equality. Callers that want
two polygons to share a vertex must use literally the same coordinate
values for it.
*/

mod polygon;
mod visibility;

pub use polygon::{union_polygons, Polygon};
pub use visibility::{path_length, GeometryError, VisibilityGraph};

use std::fmt;
use std::ops::{Add, Sub};

use num_traits::Num;
use serde::{Deserialize, Serialize};

/// Absolute tolerance for geometric predicates.
pub(crate) const EPS: f64 = 1e-9;

/// A position or displacement in the 2D plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vector<T> {
    #[serde(rename = "X")]
    pub x: T,
    #[serde(rename = "Y")]
    pub y: T,
}

/// Floating-point point in plant coordinates.
pub type Point = Vector<f64>;

impl<T> Vector<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Num + Copy> Add for Vector<T> {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl<T: Num + Copy> Sub for Vector<T> {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

impl<T: Num + Copy> Vector<T> {
    pub fn dot(self, other: Self) -> T {
        self.x * other.x + self.y * other.y
    }
}

impl Vector<f64> {
    /// Euclidean length of the vector.
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Euclidean distance to another point.
    pub fn distance_to(self, other: Self) -> f64 {
        (other - self).length()
    }
}

impl Vector<i32> {
    pub fn to_point(self) -> Point {
        Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl<T: fmt::Display> fmt::Display for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Angle of the ray from `origin` towards `target`, in radians.
pub fn angle_between_points(origin: Point, target: Point) -> f64 {
    (target.y - origin.y).atan2(target.x - origin.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn vector_arithmetic() {
        let a = Vector::new(1.0, 2.0);
        let b = Vector::new(3.0, -1.0);

        assert_eq!(a + b, Vector::new(4.0, 1.0));
        assert_eq!(b - a, Vector::new(2.0, -3.0));
        assert_eq!(a.dot(b), 1.0);
        assert!((Vector::new(3.0, 4.0).length() - 5.0).abs() < EPS);
    }

    #[test]
    fn angle_between_cardinal_points() {
        let cases = [
            (Point::new(1.0, 0.0), 0.0),
            (Point::new(0.0, 1.0), PI / 2.0),
            (Point::new(1.0, 1.0), PI / 4.0),
            (Point::new(-1.0, 0.0), PI),
            (Point::new(0.0, -1.0), -PI / 2.0),
            (Point::new(-1.0, -1.0), -3.0 * PI / 4.0),
        ];

        let origin = Point::new(0.0, 0.0);
        for (target, expected) in cases {
            assert!((angle_between_points(origin, target) - expected).abs() < EPS);
        }
    }
}
