//! The chart transformation protocol.

use mesh_surface::{ChartPointInfo, MultiChartInfo, Point2, Point3};

use crate::error::ChartResult;

/// The replaceable mapping between the 3D front and a local 2D plane.
///
/// Front advancement always happens in 2D. A `ChartTransform` supplies the
/// geometry: it anchors a local frame on the current base segment, carries
/// front points into plain coordinates for rule matching, and realizes the
/// replacement's new points back on the true surface. The driver holds the
/// capability by reference and never a concrete type, so flat domains,
/// analytic surfaces, and parametrized CAD patches share one driver loop.
///
/// Conventions:
///
/// - Plain coordinates are scaled so one unit is roughly the local mesh
///   size `h`; the base segment runs from the origin along `+x` and the
///   unmeshed domain lies toward `+y`.
/// - [`define_transformation`](ChartTransform::define_transformation) is
///   called once per driver iteration before any other transform call and
///   must be idempotent within that iteration.
/// - A [`ChartPointInfo`] is only meaningful for the chart that was active
///   when it was computed; holders of stale info must re-validate through
///   [`belongs_to_active_chart`](ChartTransform::belongs_to_active_chart).
pub trait ChartTransform {
    /// One-time hook before the driver loop starts.
    fn start_mesh(&mut self) {}

    /// Anchor the local frame on the base segment `p1` → `p2`.
    fn define_transformation(
        &mut self,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        gi1: &ChartPointInfo,
        gi2: &ChartPointInfo,
    );

    /// Map a model-space point into the active chart's plain coordinates.
    ///
    /// The returned zone classifies the image region: zone 0 is the base
    /// segment's own region; any other zone marks a point that cannot be
    /// consistently placed relative to the base (wrap-around of a
    /// non-injective chart, off-surface geometry) and must not be used for
    /// matching.
    fn to_plain(
        &self,
        point: &Point3<f64>,
        multi_info: Option<&MultiChartInfo>,
        h: f64,
    ) -> (Point2<f64>, i32);

    /// Realize a plain point on the true surface.
    ///
    /// # Errors
    ///
    /// [`ChartError::NotRepresentable`](crate::ChartError::NotRepresentable)
    /// when the plain point has no valid image on the active chart. The
    /// driver treats this as a rule rejection, not a fatal error.
    fn from_plain(&self, plain: &Point2<f64>, h: f64) -> ChartResult<(Point3<f64>, ChartPointInfo)>;

    /// Whether previously computed placement info is still valid for the
    /// currently active chart.
    fn belongs_to_active_chart(&self, point: &Point3<f64>, info: &ChartPointInfo) -> bool;

    /// Compute fresh placement info for a point with no prior placement.
    ///
    /// # Errors
    ///
    /// [`ChartError::NotRepresentable`](crate::ChartError::NotRepresentable)
    /// when the point does not lie on the active chart.
    fn compute_point_geom_info(&self, point: &Point3<f64>) -> ChartResult<ChartPointInfo>;

    /// Select the unique placement of a multi-chart point on the active
    /// chart.
    ///
    /// # Errors
    ///
    /// [`ChartError::AmbiguousChart`](crate::ChartError::AmbiguousChart)
    /// when no unique chart can be chosen (seam points), or
    /// [`ChartError::NoChart`](crate::ChartError::NoChart) when no
    /// candidate fits. The caller falls back to rejecting the candidate
    /// replacement.
    fn choose_chart_point_geom_info(&self, multi_info: &MultiChartInfo)
        -> ChartResult<ChartPointInfo>;

    /// Whether an endpoint of the segment `p1` → `p2` is representable on
    /// the active chart. `endpoint` is 0 or 1.
    fn is_line_vertex_on_chart(
        &self,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        endpoint: usize,
        info: &ChartPointInfo,
    ) -> bool;

    /// Blocking segments of the chart's own boundary, in plain coordinates
    /// at scale `h`, for charts that cover only part of the surface. The
    /// default is an unbounded chart.
    fn chart_boundary(&self, h: f64) -> Vec<[Point2<f64>; 2]> {
        let _ = h;
        Vec::new()
    }

    /// The local mesh size around `point` given the global target `gh`.
    fn local_h(&self, point: &Point3<f64>, gh: f64) -> f64 {
        let _ = point;
        gh
    }

    /// Total area of the domain, when the chart knows it; the driver uses
    /// it as a runaway guard.
    fn domain_area(&self) -> Option<f64> {
        None
    }
}
