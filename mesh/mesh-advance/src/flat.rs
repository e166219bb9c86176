//! The flat chart: one plane, one chart, identity parametrization.

use mesh_surface::{ChartPointInfo, MultiChartInfo, Point2, Point3, Vector3};

use crate::chart::ChartTransform;
use crate::error::{ChartError, ChartResult};

/// Chart id used by the flat chart; the whole plane is one chart.
const FLAT_CHART_ID: u32 = 0;

/// A single flat chart covering an entire planar domain.
///
/// The default implementation of the chart protocol: the plane is its own
/// parametrization, every in-plane point is representable, and the zone
/// classifier only flags points that do not lie in the plane at all.
///
/// # Example
///
/// ```
/// use mesh_advance::{ChartTransform, FlatChart};
/// use mesh_surface::{ChartPointInfo, Point3};
///
/// let gi = ChartPointInfo::new(0, 0.0, 0.0);
/// let mut chart = FlatChart::default();
/// chart.define_transformation(
///     &Point3::new(0.0, 0.0, 0.0),
///     &Point3::new(1.0, 0.0, 0.0),
///     &gi,
///     &gi,
/// );
///
/// let (plain, zone) = chart.to_plain(&Point3::new(0.5, 0.5, 0.0), None, 1.0);
/// assert_eq!(zone, 0);
/// let (back, _) = chart.from_plain(&plain, 1.0).unwrap();
/// assert!((back - Point3::new(0.5, 0.5, 0.0)).norm() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct FlatChart {
    plane_origin: Point3<f64>,
    normal: Vector3<f64>,
    axis_u: Vector3<f64>,
    axis_v: Vector3<f64>,
    plane_tolerance: f64,
    // Working frame, anchored per base segment.
    frame_origin: Point3<f64>,
    ex: Vector3<f64>,
    ey: Vector3<f64>,
}

impl FlatChart {
    /// A flat chart for the plane through `origin` with the given normal.
    ///
    /// The normal is normalized; a vanishing normal falls back to `+z`.
    #[must_use]
    pub fn new(origin: Point3<f64>, normal: Vector3<f64>) -> Self {
        let normal = normal.try_normalize(f64::EPSILON).unwrap_or(Vector3::z());
        let axis_u = perpendicular(normal);
        let axis_v = normal.cross(&axis_u);
        Self {
            plane_origin: origin,
            normal,
            axis_u,
            axis_v,
            plane_tolerance: 1e-7,
            frame_origin: origin,
            ex: axis_u,
            ey: axis_v,
        }
    }

    /// The chart for the `z = 0` plane.
    #[must_use]
    pub fn xy() -> Self {
        Self::new(Point3::origin(), Vector3::z())
    }

    /// Override the out-of-plane tolerance.
    #[must_use]
    pub const fn with_plane_tolerance(mut self, tolerance: f64) -> Self {
        self.plane_tolerance = tolerance;
        self
    }

    fn off_plane(&self, point: &Point3<f64>) -> f64 {
        (point - self.plane_origin).dot(&self.normal).abs()
    }

    fn plane_info(&self, point: &Point3<f64>) -> ChartPointInfo {
        let d = point - self.plane_origin;
        ChartPointInfo::new(FLAT_CHART_ID, d.dot(&self.axis_u), d.dot(&self.axis_v))
    }
}

impl Default for FlatChart {
    fn default() -> Self {
        Self::xy()
    }
}

impl ChartTransform for FlatChart {
    fn define_transformation(
        &mut self,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        _gi1: &ChartPointInfo,
        _gi2: &ChartPointInfo,
    ) {
        self.frame_origin = *p1;
        self.ex = (p2 - p1)
            .try_normalize(f64::EPSILON)
            .unwrap_or(self.axis_u);
        self.ey = self.normal.cross(&self.ex);
    }

    fn to_plain(
        &self,
        point: &Point3<f64>,
        _multi_info: Option<&MultiChartInfo>,
        h: f64,
    ) -> (Point2<f64>, i32) {
        let d = point - self.frame_origin;
        let plain = Point2::new(d.dot(&self.ex) / h, d.dot(&self.ey) / h);
        let zone = i32::from(self.off_plane(point) > self.plane_tolerance);
        (plain, zone)
    }

    fn from_plain(&self, plain: &Point2<f64>, h: f64) -> ChartResult<(Point3<f64>, ChartPointInfo)> {
        let point = self.frame_origin + (self.ex * plain.x + self.ey * plain.y) * h;
        let info = self.plane_info(&point);
        Ok((point, info))
    }

    fn belongs_to_active_chart(&self, point: &Point3<f64>, info: &ChartPointInfo) -> bool {
        info.chart == FLAT_CHART_ID && self.off_plane(point) <= self.plane_tolerance
    }

    fn compute_point_geom_info(&self, point: &Point3<f64>) -> ChartResult<ChartPointInfo> {
        if self.off_plane(point) > self.plane_tolerance {
            return Err(ChartError::NotRepresentable);
        }
        Ok(self.plane_info(point))
    }

    fn choose_chart_point_geom_info(
        &self,
        multi_info: &MultiChartInfo,
    ) -> ChartResult<ChartPointInfo> {
        multi_info
            .on_chart(FLAT_CHART_ID)
            .copied()
            .ok_or(ChartError::NoChart)
    }

    fn is_line_vertex_on_chart(
        &self,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        endpoint: usize,
        _info: &ChartPointInfo,
    ) -> bool {
        let point = if endpoint == 0 { p1 } else { p2 };
        self.off_plane(point) <= self.plane_tolerance
    }
}

/// A unit vector perpendicular to `v`, via the axis least aligned with it.
fn perpendicular(v: Vector3<f64>) -> Vector3<f64> {
    let ax = v.x.abs();
    let ay = v.y.abs();
    let az = v.z.abs();
    let pick = if ax <= ay && ax <= az {
        Vector3::x()
    } else if ay <= az {
        Vector3::y()
    } else {
        Vector3::z()
    };
    v.cross(&pick)
        .try_normalize(f64::EPSILON)
        .unwrap_or(Vector3::y())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gi() -> ChartPointInfo {
        ChartPointInfo::new(0, 0.0, 0.0)
    }

    fn anchored() -> FlatChart {
        let mut chart = FlatChart::xy();
        chart.define_transformation(
            &Point3::new(1.0, 1.0, 0.0),
            &Point3::new(2.0, 1.0, 0.0),
            &gi(),
            &gi(),
        );
        chart
    }

    #[test]
    fn base_segment_maps_onto_unit_x() {
        let chart = anchored();
        let (p1, z1) = chart.to_plain(&Point3::new(1.0, 1.0, 0.0), None, 1.0);
        let (p2, z2) = chart.to_plain(&Point3::new(2.0, 1.0, 0.0), None, 1.0);
        assert_eq!((z1, z2), (0, 0));
        assert_relative_eq!(p1.x, 0.0);
        assert_relative_eq!(p1.y, 0.0);
        assert_relative_eq!(p2.x, 1.0);
        assert_relative_eq!(p2.y, 0.0);
    }

    #[test]
    fn interior_lies_toward_positive_y() {
        // Counter-clockwise boundary in the xy plane keeps the domain on
        // the segment's left, which the frame maps to +y.
        let chart = anchored();
        let (plain, _) = chart.to_plain(&Point3::new(1.5, 1.5, 0.0), None, 1.0);
        assert!(plain.y > 0.0);
    }

    #[test]
    fn round_trip_is_identity() {
        let chart = anchored();
        let original = Point3::new(1.3, 1.9, 0.0);
        let (plain, zone) = chart.to_plain(&original, None, 0.5);
        assert_eq!(zone, 0);
        let (back, info) = chart.from_plain(&plain, 0.5).unwrap();
        assert!((back - original).norm() < 1e-12);
        assert!(chart.belongs_to_active_chart(&back, &info));
    }

    #[test]
    fn off_plane_points_get_a_foreign_zone() {
        let chart = anchored();
        let (_, zone) = chart.to_plain(&Point3::new(1.5, 1.5, 0.3), None, 1.0);
        assert_eq!(zone, 1);
        assert!(chart
            .compute_point_geom_info(&Point3::new(1.5, 1.5, 0.3))
            .is_err());
    }

    #[test]
    fn chart_choice_requires_a_flat_candidate() {
        let chart = anchored();
        let mut multi = MultiChartInfo::new();
        multi.push(ChartPointInfo::new(7, 0.1, 0.2));
        assert_eq!(
            chart.choose_chart_point_geom_info(&multi),
            Err(ChartError::NoChart)
        );
        multi.push(ChartPointInfo::new(0, 0.3, 0.4));
        let info = chart.choose_chart_point_geom_info(&multi).unwrap();
        assert_relative_eq!(info.u, 0.3);
    }

    #[test]
    fn tilted_plane_round_trip() {
        let mut chart = FlatChart::new(Point3::new(0.0, 0.0, 1.0), Vector3::new(1.0, 0.0, 1.0));
        let s = std::f64::consts::FRAC_1_SQRT_2;
        // Two points in the plane x + z = 1.
        let p1 = Point3::new(0.0, 0.0, 1.0);
        let p2 = Point3::new(s, 0.0, 1.0 - s);
        chart.define_transformation(&p1, &p2, &gi(), &gi());
        let (plain, zone) = chart.to_plain(&p2, None, 1.0);
        assert_eq!(zone, 0);
        assert_relative_eq!(plain.x, 1.0, epsilon = 1e-12);
        let (back, _) = chart.from_plain(&plain, 1.0).unwrap();
        assert!((back - p2).norm() < 1e-12);
    }
}
