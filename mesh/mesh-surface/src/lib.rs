//! Core types for advancing-front surface mesh generation.
//!
//! This crate provides the foundational types shared by the front, rule, and
//! driver crates:
//!
//! - [`SurfaceMesh`] - Committed mesh points and surface elements
//! - [`Element2d`] - A triangle or quad face referencing committed points
//! - [`Aabb`] - Axis-aligned bounding box of the domain being meshed
//! - [`ChartPointInfo`] / [`MultiChartInfo`] - Chart-relative placement
//!   metadata for points on parametrized surfaces
//!
//! # Coordinate System
//!
//! All model-space coordinates are `f64` and live in a right-handed 3D
//! system. Surface elements are wound **counter-clockwise** when viewed from
//! the surface's outward side.
//!
//! # Example
//!
//! ```
//! use mesh_surface::{Element2d, SurfaceMesh, Point3};
//!
//! let mut mesh = SurfaceMesh::new();
//! let a = mesh.add_point(Point3::new(0.0, 0.0, 0.0));
//! let b = mesh.add_point(Point3::new(1.0, 0.0, 0.0));
//! let c = mesh.add_point(Point3::new(0.0, 1.0, 0.0));
//! mesh.add_element(Element2d::triangle([a, b, c], 1));
//!
//! assert_eq!(mesh.element_count(), 1);
//! assert!((mesh.total_area() - 0.5).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

mod bounds;
mod element;
mod geominfo;
mod mesh;

pub use bounds::Aabb;
pub use element::{Element2d, ElementShape};
pub use geominfo::{ChartPointInfo, MultiChartInfo};
pub use mesh::SurfaceMesh;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Point3, Vector3};
