//! The advancing front: the evolving boundary between meshed and unmeshed
//! region.
//!
//! An [`AdvancingFront`] holds the currently open boundary as a set of active
//! line segments over reference-counted points. The generation driver
//! repeatedly selects a base segment ([`AdvancingFront::select_base_line`]),
//! gathers its neighborhood ([`AdvancingFront::collect_locals`]), and commits
//! a rule application by retracting consumed segments and inserting their
//! replacements.
//!
//! Two pieces of bookkeeping carry the algorithm:
//!
//! - **Quality classes**: every segment starts in class 1; each failed
//!   advancement attempt increments its class. Selection prefers low classes,
//!   so hard segments are retried only after easy ones are exhausted, and the
//!   driver reads the minimum class as its giveup signal.
//! - **Inverse cancellation**: adding a segment whose reverse is already on
//!   the front deletes both instead. This is how two fronts meeting each
//!   other merge into one, and how the final element closes the front to
//!   empty.
//!
//! Segments are oriented: the unmeshed domain lies to the left of p1→p2.
//!
//! # Example
//!
//! ```
//! use mesh_front::{AddLineOutcome, AdvancingFront};
//! use mesh_surface::{ChartPointInfo, Point3};
//!
//! let gi = ChartPointInfo::new(0, 0.0, 0.0);
//! let mut front = AdvancingFront::new();
//! let a = front.add_point(Point3::new(0.0, 0.0, 0.0), 0, None, true);
//! let b = front.add_point(Point3::new(1.0, 0.0, 0.0), 1, None, true);
//! front.add_line(a, b, gi, gi);
//! assert_eq!(front.active_line_count(), 1);
//!
//! // The reverse segment cancels instead of inserting.
//! assert_eq!(front.add_line(b, a, gi, gi), AddLineOutcome::Cancelled);
//! assert!(front.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod front;
mod locals;
mod select;

pub use front::{AddLineOutcome, AdvancingFront, FrontLine, FrontPoint};
pub use locals::{LocalEnvironment, LocalLine, LocalPoint};
pub use select::{BaseLine, SelectionStrategy};
