use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A position, either in screen pixels or in logical canvas units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2D{
    pub x: f64,
    pub y: f64,
}
impl Point2D{
    pub fn new(x: f64, y: f64) -> Self {
        Point2D{x, y}
    }
}

impl Sub for Point2D{
    type Output = Vector2D;

    fn sub(self, rhs: Point2D) -> Vector2D{
        Vector2D::from_points(rhs, self)
    }
}

impl Sub<Vector2D> for Point2D{
    type Output = Point2D;

    fn sub(self, rhs: Vector2D) -> Point2D{
        Point2D::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Add<Vector2D> for Point2D{
    type Output = Point2D;

    fn add(self, rhs: Vector2D) -> Point2D{
        Point2D::new(self.x + rhs.x, self.y + rhs.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D{
    pub x: f64,
    pub y: f64,
}
impl Vector2D{
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D{x, y}
    }

    pub fn from_points(start: Point2D, end: Point2D) -> Self{
        Vector2D{x: end.x - start.x, y: end.y - start.y}
    }
}

/// Width and height of an element in logical units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size2D{
    pub width: f64,
    pub height: f64,
}
impl Size2D{
    pub fn new(width: f64, height: f64) -> Self {
        Size2D{width, height}
    }

    /// true when the element has not been laid out yet
    pub fn is_empty(&self) -> bool{
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_difference_is_a_vector() {
        let v = Point2D::new(10.0, 4.0) - Point2D::new(4.0, 1.0);
        assert_eq!(v, Vector2D::new(6.0, 3.0));
        assert_eq!(Point2D::new(4.0, 1.0) + v, Point2D::new(10.0, 4.0));
    }

    #[test]
    fn zero_sized_is_empty() {
        assert!(Size2D::new(0.0, 20.0).is_empty());
        assert!(Size2D::default().is_empty());
        assert!(!Size2D::new(1.0, 1.0).is_empty());
    }
}
