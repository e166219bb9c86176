//! Replacement rules for advancing-front surface meshing.
//!
//! A [`MeshRule`] is an immutable local pattern over a canonical base
//! segment plus a replacement: new points, new elements, new boundary
//! segments, and the pattern segments the replacement consumes. The
//! [`RuleLibrary`] holds rules in priority order - either the compiled
//! [`standard_triangle_rules`] or a set loaded from the text format in
//! [`parse_rules`].
//!
//! [`apply_rules`] is the matching engine: given the 2D neighborhood of the
//! current base segment it returns the first admissible replacement at the
//! lowest tolerance level, escalating levels (growing point tolerances,
//! relaxing free zones) when strict matching fails.
//!
//! # Example
//!
//! ```
//! use mesh_rules::{
//!     apply_rules, MatchOptions, PlainEnvironment, PlainLine, PlainPoint,
//!     RuleLibrary, RuleStats,
//! };
//! use nalgebra::Point2;
//!
//! // A lone front segment with open space above it.
//! let env = PlainEnvironment {
//!     points: vec![
//!         PlainPoint { position: Point2::new(0.0, 0.0), matchable: true },
//!         PlainPoint { position: Point2::new(1.0, 0.0), matchable: true },
//!     ],
//!     lines: vec![PlainLine { ends: [0, 1] }],
//! };
//!
//! let library = RuleLibrary::standard();
//! let mut stats = RuleStats::new(library.len());
//! let excluded = vec![false; library.len()];
//! let application = apply_rules(
//!     &env,
//!     &library,
//!     1,
//!     &MatchOptions::default(),
//!     &excluded,
//!     &mut stats,
//! )
//! .unwrap();
//!
//! // The free-triangle rule advances with one new apex point.
//! assert_eq!(application.new_points.len(), 1);
//! assert_eq!(application.elements.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
pub mod geom;
mod library;
mod matcher;
mod parse;
mod rule;

pub use error::{RuleError, RuleParseError, RuleResult};
pub use library::{standard_triangle_rules, RuleLibrary};
pub use matcher::{
    apply_rules, match_rule, AppliedElement, LocalRef, MatchOptions, PlainEnvironment, PlainLine,
    PlainPoint, RuleApplication, RuleStats,
};
pub use parse::parse_rules;
pub use rule::{MeshRule, PointRef, RuleElement};
