//! Surface mesh storage.

use nalgebra::Point3;

use crate::{Element2d, ElementShape};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The committed output of surface mesh generation.
///
/// Stores the global point table and the surface elements referencing it.
/// During a generation run the driver is the sole writer: it appends points
/// and elements but never removes or reorders them, so indices handed out by
/// [`SurfaceMesh::add_point`] stay valid for the lifetime of the mesh.
///
/// # Example
///
/// ```
/// use mesh_surface::{Element2d, SurfaceMesh, Point3};
///
/// let mut mesh = SurfaceMesh::new();
/// let a = mesh.add_point(Point3::new(0.0, 0.0, 0.0));
/// let b = mesh.add_point(Point3::new(1.0, 0.0, 0.0));
/// let c = mesh.add_point(Point3::new(1.0, 1.0, 0.0));
/// let d = mesh.add_point(Point3::new(0.0, 1.0, 0.0));
/// mesh.add_element(Element2d::quad([a, b, c, d], 1));
///
/// assert_eq!(mesh.point_count(), 4);
/// assert!((mesh.total_area() - 1.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SurfaceMesh {
    /// Committed point positions.
    pub points: Vec<Point3<f64>>,
    /// Committed surface elements.
    pub elements: Vec<Element2d>,
}

impl SurfaceMesh {
    /// Create an empty mesh.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            points: Vec::new(),
            elements: Vec::new(),
        }
    }

    /// Create a mesh with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(point_count: usize, element_count: usize) -> Self {
        Self {
            points: Vec::with_capacity(point_count),
            elements: Vec::with_capacity(element_count),
        }
    }

    /// Append a point and return its index.
    #[allow(clippy::cast_possible_truncation)] // point tables stay far below u32::MAX
    pub fn add_point(&mut self, position: Point3<f64>) -> u32 {
        self.points.push(position);
        (self.points.len() - 1) as u32
    }

    /// Append an element.
    pub fn add_element(&mut self, element: Element2d) {
        self.elements.push(element);
    }

    /// Number of committed points.
    #[inline]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of committed elements.
    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Whether the mesh holds neither points nor elements.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() && self.elements.is_empty()
    }

    /// Position of point `index`, if committed.
    #[must_use]
    pub fn point(&self, index: u32) -> Option<&Point3<f64>> {
        self.points.get(index as usize)
    }

    /// Area of one element, `None` when a corner index is dangling.
    ///
    /// Quads are measured as two triangles across the `v0`-`v2` diagonal.
    #[must_use]
    pub fn element_area(&self, element: &Element2d) -> Option<f64> {
        let p = |i: u32| self.points.get(i as usize);
        match element.shape {
            ElementShape::Triangle([a, b, c]) => Some(triangle_area(p(a)?, p(b)?, p(c)?)),
            ElementShape::Quad([a, b, c, d]) => {
                let (pa, pc) = (p(a)?, p(c)?);
                Some(triangle_area(pa, p(b)?, pc) + triangle_area(pa, pc, p(d)?))
            }
        }
    }

    /// Sum of all element areas; dangling elements contribute nothing.
    #[must_use]
    pub fn total_area(&self) -> f64 {
        self.elements
            .iter()
            .filter_map(|e| self.element_area(e))
            .sum()
    }

    /// Whether every element references only committed points.
    #[must_use]
    pub fn elements_valid(&self) -> bool {
        self.elements
            .iter()
            .all(|e| e.references_valid(self.points.len()))
    }
}

fn triangle_area(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> f64 {
    0.5 * (b - a).cross(&(c - a)).norm()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> SurfaceMesh {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_point(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_point(Point3::new(1.0, 0.0, 0.0));
        let c = mesh.add_point(Point3::new(0.0, 1.0, 0.0));
        mesh.add_element(Element2d::triangle([a, b, c], 1));
        mesh
    }

    #[test]
    fn point_indices_are_sequential() {
        let mut mesh = SurfaceMesh::new();
        assert_eq!(mesh.add_point(Point3::new(0.0, 0.0, 0.0)), 0);
        assert_eq!(mesh.add_point(Point3::new(1.0, 0.0, 0.0)), 1);
        assert_eq!(mesh.point_count(), 2);
    }

    #[test]
    fn triangle_area_is_half() {
        let mesh = unit_triangle();
        assert!((mesh.total_area() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn quad_area_splits_across_diagonal() {
        let mut mesh = SurfaceMesh::new();
        let a = mesh.add_point(Point3::new(0.0, 0.0, 0.0));
        let b = mesh.add_point(Point3::new(2.0, 0.0, 0.0));
        let c = mesh.add_point(Point3::new(2.0, 1.0, 0.0));
        let d = mesh.add_point(Point3::new(0.0, 1.0, 0.0));
        mesh.add_element(Element2d::quad([a, b, c, d], 1));
        assert!((mesh.total_area() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn dangling_element_detected() {
        let mut mesh = unit_triangle();
        mesh.add_element(Element2d::triangle([0, 1, 9], 1));
        assert!(!mesh.elements_valid());
        assert!(mesh.element_area(&Element2d::triangle([0, 1, 9], 1)).is_none());
    }

    #[test]
    fn area_ignores_element_winding_in_3d() {
        let mesh = unit_triangle();
        let flipped = Element2d::triangle([0, 2, 1], 1);
        let area = mesh.element_area(&flipped);
        assert_eq!(area, Some(0.5));
    }
}
