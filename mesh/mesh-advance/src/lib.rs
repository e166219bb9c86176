//! Advancing-front surface mesh generation.
//!
//! This crate drives the whole generation run: the [`Mesher`] owns the
//! advancing front, repeatedly picks a base segment, projects its
//! neighborhood into the active chart's local plane, matches replacement
//! rules against it, and commits accepted replacements to the
//! [`SurfaceMesh`](mesh_surface::SurfaceMesh).
//!
//! The [`ChartTransform`] protocol is the seam for reuse: the driver only
//! ever talks 2D plain coordinates, so meshing a flat polygon
//! ([`FlatChart`]) and meshing a band of a cylinder wall
//! ([`CylinderChart`]) run the identical loop - surface specializations
//! implement the protocol, never the driver.
//!
//! ```
//! use mesh_advance::{FlatChart, Mesher, MeshingParams};
//! use mesh_rules::RuleLibrary;
//! use mesh_surface::{Aabb, ChartPointInfo, Point3, SurfaceMesh};
//!
//! // A unit square, counter-clockwise so the domain is on the left of
//! // every segment.
//! let corners = [
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(1.0, 1.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//!
//! let library = RuleLibrary::standard();
//! let mut mesh = SurfaceMesh::new();
//! let mut mesher = Mesher::new(&library, Aabb::from_points(corners.iter()));
//!
//! let gi = ChartPointInfo::new(0, 0.0, 0.0);
//! let ids: Vec<u32> = corners
//!     .iter()
//!     .map(|&p| {
//!         let global = mesh.add_point(p);
//!         mesher.add_point(p, global, None, true)
//!     })
//!     .collect();
//! for i in 0..4 {
//!     mesher.add_boundary_line(ids[i], ids[(i + 1) % 4], gi, gi);
//! }
//!
//! let report = mesher
//!     .generate(
//!         &mut mesh,
//!         &mut FlatChart::default(),
//!         &MeshingParams::default(),
//!         1.0,
//!         1,
//!     )
//!     .unwrap();
//!
//! assert!(report.is_complete());
//! assert!((mesh.total_area() - 1.0).abs() < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod chart;
mod cylinder;
mod driver;
mod error;
mod flat;
mod params;
mod report;

pub use chart::ChartTransform;
pub use cylinder::CylinderChart;
pub use driver::Mesher;
pub use error::{ChartError, ChartResult, MeshingError, MeshingResult};
pub use flat::FlatChart;
pub use params::MeshingParams;
pub use report::{MeshingOutcome, MeshingReport, RuleUsage};

// Re-export the strategy type used in `MeshingParams`.
pub use mesh_front::SelectionStrategy;
