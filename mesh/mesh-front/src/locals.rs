//! Local neighborhood of a base segment, as handed to the rule engine.

use mesh_surface::{ChartPointInfo, MultiChartInfo, Point3};

/// A front point within the local neighborhood.
#[derive(Debug, Clone)]
pub struct LocalPoint {
    /// The point's id on the front.
    pub front_id: u32,
    /// Model-space position.
    pub position: Point3<f64>,
    /// Whether the point lies on the surface being meshed.
    pub on_surface: bool,
    /// Whether rules may use this point. Points outside the matching radius
    /// and off-surface seeds still block free zones but never match.
    pub matchable: bool,
    /// Candidate chart placements carried over from the front point.
    pub multi_info: Option<MultiChartInfo>,
}

/// A front segment within the local neighborhood.
#[derive(Debug, Clone)]
pub struct LocalLine {
    /// The segment's id on the front, for retraction on commit.
    pub line_id: usize,
    /// Endpoint positions as indices into [`LocalEnvironment::points`].
    pub ends: [usize; 2],
    /// Chart placement info per endpoint.
    pub geom_info: [ChartPointInfo; 2],
}

/// Everything the rule engine sees for one advancement attempt.
///
/// `lines[0]` is always the base segment, with its endpoints at point
/// indices 0 and 1.
#[derive(Debug, Clone, Default)]
pub struct LocalEnvironment {
    /// Neighborhood points; base endpoints first.
    pub points: Vec<LocalPoint>,
    /// Neighborhood segments; base segment first.
    pub lines: Vec<LocalLine>,
}

impl LocalEnvironment {
    /// Number of neighborhood points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of neighborhood segments.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}
