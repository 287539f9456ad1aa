//! Axis-aligned 3D bounding volumes in world space.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// An axis-aligned box, stored as min/max corners.
///
/// Every constructor orders the corners component-wise, so `min <= max`
/// holds on all three axes and `volume()` is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds3 {
    min: Point3<f64>,
    max: Point3<f64>,
}

impl Bounds3 {
    /// Box spanning two opposite corners, given in any order.
    pub fn new(a: Point3<f64>, b: Point3<f64>) -> Self {
        Self {
            min: a.inf(&b),
            max: a.sup(&b),
        }
    }

    /// Box centered on `center` with full extents `size` (absolute values used).
    pub fn from_center_size(center: Point3<f64>, size: Vector3<f64>) -> Self {
        let half = size.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Smallest box enclosing every point, or `None` for an empty iterator.
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3<f64>>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for point in iter {
            bounds.encapsulate(point);
        }
        Some(bounds)
    }

    /// Grow the box to include `point`.
    pub fn encapsulate(&mut self, point: &Point3<f64>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    /// Copy of the box grown by `margin` on every side.
    ///
    /// A negative margin shrinks the box but never past its center.
    pub fn padded(&self, margin: f64) -> Self {
        let center = self.center();
        let half = (self.size() / 2.0).add_scalar(margin).sup(&Vector3::zeros());
        Self {
            min: center - half,
            max: center + half,
        }
    }

    #[inline]
    pub fn min(&self) -> Point3<f64> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point3<f64> {
        self.max
    }

    /// Full extents (width, height, depth).
    #[inline]
    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Width × height × depth in native length units cubed.
    pub fn volume(&self) -> f64 {
        let size = self.size();
        size.x * size.y * size.z
    }

    /// Overlap on all three axes. Touching faces count as overlap.
    pub fn intersects(&self, other: &Bounds3) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        (0..3).all(|axis| point[axis] >= self.min[axis] && point[axis] <= self.max[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box_at(x: f64, y: f64, z: f64) -> Bounds3 {
        Bounds3::from_center_size(Point3::new(x, y, z), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_new_orders_corners() {
        let bounds = Bounds3::new(Point3::new(1.0, -1.0, 2.0), Point3::new(-1.0, 1.0, 0.0));
        assert_eq!(bounds.min(), Point3::new(-1.0, -1.0, 0.0));
        assert_eq!(bounds.max(), Point3::new(1.0, 1.0, 2.0));
        assert_relative_eq!(bounds.volume(), 8.0, epsilon = 1e-12);
    }

    #[test]
    fn test_from_points_encloses_all() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.5, 0.2, -0.1),
            Point3::new(-0.3, 0.4, 0.5),
        ];
        let bounds = Bounds3::from_points(&points).unwrap();

        for p in &points {
            assert!(bounds.contains_point(p));
        }
        assert_eq!(bounds.min(), Point3::new(-0.3, 0.0, -0.1));
        assert_eq!(bounds.max(), Point3::new(0.5, 0.4, 0.5));
    }

    #[test]
    fn test_from_points_empty() {
        let empty: Vec<Point3<f64>> = Vec::new();
        assert!(Bounds3::from_points(&empty).is_none());
    }

    #[test]
    fn test_degenerate_box_has_zero_volume_until_padded() {
        let p = Point3::new(2.0, 2.0, 2.0);
        let bounds = Bounds3::from_points([&p, &p]).unwrap();
        assert_eq!(bounds.volume(), 0.0);

        let padded = bounds.padded(0.1);
        assert_relative_eq!(padded.volume(), 0.2 * 0.2 * 0.2, epsilon = 1e-12);
        assert_relative_eq!(padded.center(), p, epsilon = 1e-12);
    }

    #[test]
    fn test_negative_padding_clamps_at_center() {
        let bounds = unit_box_at(0.0, 0.0, 0.0).padded(-5.0);
        assert_eq!(bounds.volume(), 0.0);
        assert_eq!(bounds.center(), Point3::origin());
    }

    #[test]
    fn test_intersects_overlapping_and_touching() {
        let a = unit_box_at(0.0, 0.0, 0.0);
        assert!(a.intersects(&unit_box_at(0.5, 0.5, 0.5)));
        // Touching faces at x = 0.5
        assert!(a.intersects(&unit_box_at(1.0, 0.0, 0.0)));
        // Separated on one axis only is still disjoint
        assert!(!a.intersects(&unit_box_at(0.0, 0.0, 1.5)));
        assert!(!a.intersects(&unit_box_at(3.0, 3.0, 3.0)));
    }

    #[test]
    fn test_intersects_is_symmetric() {
        let a = Bounds3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 1.0, 1.0));
        let b = Bounds3::new(Point3::new(1.5, 0.5, -1.0), Point3::new(4.0, 3.0, 0.2));
        assert_eq!(a.intersects(&b), b.intersects(&a));
        assert!(a.intersects(&b));
    }
}
