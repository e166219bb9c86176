//! An analytic cylinder chart, locally unrolled around the base segment.
//!
//! The cylinder's lateral surface maps isometrically onto a strip of the
//! plane, but the mapping wraps: points a half-turn away from the base
//! segment are equally well reached around either side. The zone
//! classifier reports those wrap-around points so rule matching never
//! treats them as adjacent, and `from_plain` refuses plain points beyond
//! the representable band.

use std::f64::consts::PI;

use mesh_surface::{ChartPointInfo, MultiChartInfo, Point2, Point3};
use nalgebra::Vector2;

use crate::chart::ChartTransform;
use crate::error::{ChartError, ChartResult};

/// Chart id used by the cylinder chart.
const CYLINDER_CHART_ID: u32 = 0;

/// Angular distance from the base anchor beyond which a point's unrolled
/// image is no longer trustworthy for matching.
const WRAP_ZONE_LIMIT: f64 = 0.75 * PI;

/// A chart over the lateral surface of an axis-aligned cylinder.
///
/// The axis runs along `+z` through `center`. Placement info stores the
/// angle around the axis as `u` (radians) and the height as `v`.
///
/// # Example
///
/// ```
/// use mesh_advance::{ChartTransform, CylinderChart};
/// use mesh_surface::{ChartPointInfo, Point3};
///
/// let gi = ChartPointInfo::new(0, 0.0, 0.0);
/// let mut chart = CylinderChart::new(Point3::origin(), 1.0);
/// let p1 = Point3::new(1.0, 0.0, 0.0);
/// let p2 = Point3::new(0.0, 1.0, 0.0);
/// chart.define_transformation(&p1, &p2, &gi, &gi);
///
/// // A quarter turn unrolls to an arc length of pi/2 along +x.
/// let (plain, zone) = chart.to_plain(&p2, None, 1.0);
/// assert_eq!(zone, 0);
/// assert!((plain.x - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct CylinderChart {
    center: Point3<f64>,
    radius: f64,
    radial_tolerance: f64,
    // Working frame: angular/height anchor and the in-strip rotation that
    // carries the unrolled base direction onto +x.
    theta0: f64,
    z0: f64,
    rot: Vector2<f64>,
}

impl CylinderChart {
    /// A chart over the cylinder of `radius` around the `+z` axis through
    /// `center`.
    #[must_use]
    pub fn new(center: Point3<f64>, radius: f64) -> Self {
        Self {
            center,
            radius,
            radial_tolerance: 1e-7 * (1.0 + radius),
            theta0: 0.0,
            z0: 0.0,
            rot: Vector2::x(),
        }
    }

    /// Override the radial membership tolerance.
    #[must_use]
    pub const fn with_radial_tolerance(mut self, tolerance: f64) -> Self {
        self.radial_tolerance = tolerance;
        self
    }

    /// Angle, height, and radial distance of a point.
    fn unroll(&self, point: &Point3<f64>) -> (f64, f64, f64) {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        (dy.atan2(dx), point.z, (dx * dx + dy * dy).sqrt())
    }

    /// Unrolled strip coordinates relative to the anchor, before rotation.
    fn strip(&self, point: &Point3<f64>) -> (Vector2<f64>, f64) {
        let (theta, z, radial) = self.unroll(point);
        let dtheta = wrap_angle(theta - self.theta0);
        (
            Vector2::new(self.radius * dtheta, z - self.z0),
            radial,
        )
    }

    fn on_surface(&self, radial: f64) -> bool {
        (radial - self.radius).abs() <= self.radial_tolerance
    }
}

impl ChartTransform for CylinderChart {
    fn define_transformation(
        &mut self,
        p1: &Point3<f64>,
        p2: &Point3<f64>,
        _gi1: &ChartPointInfo,
        _gi2: &ChartPointInfo,
    ) {
        let (theta1, z1, _) = self.unroll(p1);
        self.theta0 = theta1;
        self.z0 = z1;
        self.rot = Vector2::x();
        let (base_dir, _) = self.strip(p2);
        self.rot = base_dir.try_normalize(f64::EPSILON).unwrap_or(Vector2::x());
    }

    fn to_plain(
        &self,
        point: &Point3<f64>,
        _multi_info: Option<&MultiChartInfo>,
        h: f64,
    ) -> (Point2<f64>, i32) {
        let (v, radial) = self.strip(point);
        // Inverse rotation aligns the unrolled base direction with +x.
        let aligned = Vector2::new(
            self.rot.x * v.x + self.rot.y * v.y,
            self.rot.x * v.y - self.rot.y * v.x,
        );
        let plain = Point2::new(aligned.x / h, aligned.y / h);

        let zone = if !self.on_surface(radial) {
            2
        } else {
            let dtheta = v.x / self.radius;
            if dtheta > WRAP_ZONE_LIMIT {
                1
            } else if dtheta < -WRAP_ZONE_LIMIT {
                -1
            } else {
                0
            }
        };
        (plain, zone)
    }

    fn from_plain(&self, plain: &Point2<f64>, h: f64) -> ChartResult<(Point3<f64>, ChartPointInfo)> {
        let aligned = Vector2::new(plain.x * h, plain.y * h);
        let v = Vector2::new(
            self.rot.x * aligned.x - self.rot.y * aligned.y,
            self.rot.y * aligned.x + self.rot.x * aligned.y,
        );
        let dtheta = v.x / self.radius;
        if dtheta.abs() > PI {
            return Err(ChartError::NotRepresentable);
        }
        let theta = self.theta0 + dtheta;
        let z = self.z0 + v.y;
        let point = Point3::new(
            self.center.x + self.radius * theta.cos(),
            self.center.y + self.radius * theta.sin(),
            z,
        );
        Ok((
            point,
            ChartPointInfo::new(CYLINDER_CHART_ID, wrap_angle(theta), z),
        ))
    }

    fn belongs_to_active_chart(&self, point: &Point3<f64>, info: &ChartPointInfo) -> bool {
        let (_, _, radial) = self.unroll(point);
        info.chart == CYLINDER_CHART_ID && self.on_surface(radial)
    }

    fn compute_point_geom_info(&self, point: &Point3<f64>) -> ChartResult<ChartPointInfo> {
        let (theta, z, radial) = self.unroll(point);
        if !self.on_surface(radial) {
            return Err(ChartError::NotRepresentable);
        }
        Ok(ChartPointInfo::new(CYLINDER_CHART_ID, theta, z))
    }

    fn choose_chart_point_geom_info(
        &self,
        multi_info: &MultiChartInfo,
    ) -> ChartResult<ChartPointInfo> {
        multi_info
            .on_chart(CYLINDER_CHART_ID)
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
        let (_, _, radial) = self.unroll(point);
        self.on_surface(radial)
    }
}

/// Wrap an angle into `(-pi, pi]`.
fn wrap_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn gi() -> ChartPointInfo {
        ChartPointInfo::new(0, 0.0, 0.0)
    }

    fn on_cylinder(theta: f64, z: f64) -> Point3<f64> {
        Point3::new(theta.cos(), theta.sin(), z)
    }

    fn anchored() -> CylinderChart {
        let mut chart = CylinderChart::new(Point3::origin(), 1.0);
        chart.define_transformation(&on_cylinder(0.0, 0.0), &on_cylinder(0.4, 0.0), &gi(), &gi());
        chart
    }

    #[test]
    fn unrolling_preserves_arc_length() {
        let chart = anchored();
        let (plain, zone) = chart.to_plain(&on_cylinder(0.4, 0.0), None, 1.0);
        assert_eq!(zone, 0);
        assert_relative_eq!(plain.x, 0.4, epsilon = 1e-12);
        assert_relative_eq!(plain.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn round_trip_on_the_surface() {
        let chart = anchored();
        let original = on_cylinder(0.7, 0.3);
        let (plain, zone) = chart.to_plain(&original, None, 0.5);
        assert_eq!(zone, 0);
        let (back, info) = chart.from_plain(&plain, 0.5).unwrap();
        assert!((back - original).norm() < 1e-12);
        assert!(chart.belongs_to_active_chart(&back, &info));
        assert_relative_eq!(info.u, 0.7, epsilon = 1e-12);
        assert_relative_eq!(info.v, 0.3, epsilon = 1e-12);
    }

    #[test]
    fn wrap_around_points_report_a_foreign_zone() {
        let chart = anchored();
        let (_, zone) = chart.to_plain(&on_cylinder(2.9, 0.0), None, 1.0);
        assert_eq!(zone, 1);
        let (_, zone) = chart.to_plain(&on_cylinder(-2.9, 0.0), None, 1.0);
        assert_eq!(zone, -1);
    }

    #[test]
    fn off_surface_points_report_zone_two() {
        let chart = anchored();
        let (_, zone) = chart.to_plain(&Point3::new(0.2, 0.0, 0.0), None, 1.0);
        assert_eq!(zone, 2);
        assert!(chart
            .compute_point_geom_info(&Point3::new(0.2, 0.0, 0.0))
            .is_err());
    }

    #[test]
    fn plain_points_beyond_the_band_are_rejected() {
        let chart = anchored();
        let err = chart.from_plain(&Point2::new(4.0, 0.0), 1.0).unwrap_err();
        assert_eq!(err, ChartError::NotRepresentable);
    }

    #[test]
    fn vertical_base_segment_unrolls_along_x() {
        let mut chart = CylinderChart::new(Point3::origin(), 1.0);
        // Base runs straight up the cylinder wall.
        chart.define_transformation(&on_cylinder(0.0, 0.0), &on_cylinder(0.0, 1.0), &gi(), &gi());
        let (plain, zone) = chart.to_plain(&on_cylinder(0.0, 1.0), None, 1.0);
        assert_eq!(zone, 0);
        assert_relative_eq!(plain.x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(plain.y, 0.0, epsilon = 1e-12);
    }
}
