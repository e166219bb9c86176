//! Axis-aligned bounding box of the meshing domain.

use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box over the boundary being meshed.
///
/// The box is computed once from the input boundary points and stays fixed
/// for the lifetime of a generation run; the driver uses it to size local
/// search neighborhoods and to sanity-check generated points.
///
/// # Example
///
/// ```
/// use mesh_surface::{Aabb, Point3};
///
/// let aabb = Aabb::from_points(
///     [
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(4.0, 4.0, 0.0),
///     ]
///     .iter(),
/// );
///
/// assert!(aabb.contains(&Point3::new(2.0, 2.0, 0.0)));
/// assert!((aabb.diagonal() - 32.0f64.sqrt()).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Aabb {
    /// Minimum corner.
    pub min: Point3<f64>,
    /// Maximum corner.
    pub max: Point3<f64>,
}

impl Aabb {
    /// An inverted box, ready to be grown with [`Aabb::grow`].
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    /// Bounding box of a set of points.
    ///
    /// Returns the empty (inverted) box for an empty iterator.
    #[must_use]
    pub fn from_points<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Self {
        let mut aabb = Self::empty();
        for p in points {
            aabb.grow(p);
        }
        aabb
    }

    /// Whether the box holds no volume (min exceeds max on some axis).
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Extend the box to cover `point`.
    pub fn grow(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);
        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Length of the box diagonal.
    #[inline]
    #[must_use]
    pub fn diagonal(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        (self.max - self.min).norm()
    }

    /// Whether `point` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, point: &Point3<f64>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// A copy of the box grown by `margin` on every side.
    #[must_use]
    pub fn expanded(&self, margin: f64) -> Self {
        Self {
            min: Point3::new(
                self.min.x - margin,
                self.min.y - margin,
                self.min.z - margin,
            ),
            max: Point3::new(
                self.max.x + margin,
                self.max.y + margin,
                self.max.z + margin,
            ),
        }
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box() {
        let aabb = Aabb::empty();
        assert!(aabb.is_empty());
        assert!((aabb.diagonal() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn grows_over_points() {
        let points = [
            Point3::new(1.0, 2.0, 3.0),
            Point3::new(-1.0, 5.0, 0.0),
            Point3::new(0.0, 0.0, 7.0),
        ];
        let aabb = Aabb::from_points(points.iter());
        assert!((aabb.min.x - (-1.0)).abs() < f64::EPSILON);
        assert!((aabb.max.y - 5.0).abs() < f64::EPSILON);
        assert!((aabb.max.z - 7.0).abs() < f64::EPSILON);
        assert!(!aabb.is_empty());
    }

    #[test]
    fn contains_boundary_points() {
        let aabb = Aabb::from_points(
            [Point3::new(0.0, 0.0, 0.0), Point3::new(2.0, 2.0, 2.0)].iter(),
        );
        assert!(aabb.contains(&Point3::new(0.0, 0.0, 0.0)));
        assert!(aabb.contains(&Point3::new(2.0, 2.0, 2.0)));
        assert!(!aabb.contains(&Point3::new(2.1, 0.0, 0.0)));
    }

    #[test]
    fn expanded_margin() {
        let aabb = Aabb::from_points(
            [Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)].iter(),
        )
        .expanded(0.5);
        assert!(aabb.contains(&Point3::new(-0.4, 0.0, 0.0)));
        assert!(!aabb.contains(&Point3::new(-0.6, 0.0, 0.0)));
    }
}
