//! Surface elements: triangles and quads referencing committed points.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The corner indices of a surface element.
///
/// Indices reference points in a [`SurfaceMesh`](crate::SurfaceMesh) point
/// table. Corners are ordered counter-clockwise when viewed from the
/// surface's outward side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ElementShape {
    /// A triangle `[v0, v1, v2]`.
    Triangle([u32; 3]),
    /// A quadrilateral `[v0, v1, v2, v3]`.
    Quad([u32; 4]),
}

impl ElementShape {
    /// The corner indices as a slice.
    #[inline]
    #[must_use]
    pub fn corners(&self) -> &[u32] {
        match self {
            Self::Triangle(c) => c,
            Self::Quad(c) => c,
        }
    }

    /// Number of corners (3 or 4).
    #[inline]
    #[must_use]
    pub const fn corner_count(&self) -> usize {
        match self {
            Self::Triangle(_) => 3,
            Self::Quad(_) => 4,
        }
    }
}

/// A surface mesh face emitted by a successful rule application.
///
/// Elements reference committed mesh points by index and carry the face
/// (domain) identifier the generation run was tagged with.
///
/// # Example
///
/// ```
/// use mesh_surface::Element2d;
///
/// let tri = Element2d::triangle([0, 1, 2], 7);
/// assert_eq!(tri.corners(), &[0, 1, 2]);
/// assert_eq!(tri.face, 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Element2d {
    /// Corner indices into the mesh point table.
    pub shape: ElementShape,
    /// Identifier of the face (surface domain) this element belongs to.
    pub face: u32,
}

impl Element2d {
    /// Create a triangle element.
    #[inline]
    #[must_use]
    pub const fn triangle(corners: [u32; 3], face: u32) -> Self {
        Self {
            shape: ElementShape::Triangle(corners),
            face,
        }
    }

    /// Create a quad element.
    #[inline]
    #[must_use]
    pub const fn quad(corners: [u32; 4], face: u32) -> Self {
        Self {
            shape: ElementShape::Quad(corners),
            face,
        }
    }

    /// The corner indices as a slice.
    #[inline]
    #[must_use]
    pub fn corners(&self) -> &[u32] {
        self.shape.corners()
    }

    /// Number of corners (3 or 4).
    #[inline]
    #[must_use]
    pub const fn corner_count(&self) -> usize {
        self.shape.corner_count()
    }

    /// Check that every corner index is below `point_count`.
    #[must_use]
    pub fn references_valid(&self, point_count: usize) -> bool {
        self.corners().iter().all(|&c| (c as usize) < point_count)
    }
}
