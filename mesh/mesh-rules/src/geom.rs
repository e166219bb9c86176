//! Planar predicates used by rule matching.
//!
//! Free zones are convex counter-clockwise polygons; every test here is
//! strict (boundary contact does not count as containment), so replacement
//! edges that coincide with a zone boundary are admissible.

use nalgebra::{Point2, Vector2};

/// Twice-signed-area cross product of `b - a` and `c - a`.
#[inline]
#[must_use]
pub fn cross2(a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>) -> f64 {
    let ab = b - a;
    let ac = c - a;
    ab.x * ac.y - ab.y * ac.x
}

/// Signed area of a polygon (positive when counter-clockwise).
#[must_use]
pub fn signed_area(polygon: &[Point2<f64>]) -> f64 {
    let mut sum = 0.0;
    for i in 0..polygon.len() {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % polygon.len()];
        sum += a.x * b.y - b.x * a.y;
    }
    0.5 * sum
}

/// Whether a polygon is convex, counter-clockwise, and non-degenerate.
#[must_use]
pub fn is_ccw_convex(polygon: &[Point2<f64>]) -> bool {
    if polygon.len() < 3 || signed_area(polygon) <= f64::EPSILON {
        return false;
    }
    let n = polygon.len();
    (0..n).all(|i| {
        cross2(&polygon[i], &polygon[(i + 1) % n], &polygon[(i + 2) % n]) > -f64::EPSILON
    })
}

/// Whether `p` lies strictly inside a convex CCW polygon.
///
/// `eps` is the minimum distance from every edge for the point to count as
/// inside; points on or near the boundary are outside.
#[must_use]
pub fn point_strictly_inside(polygon: &[Point2<f64>], p: &Point2<f64>, eps: f64) -> bool {
    let n = polygon.len();
    (0..n).all(|i| {
        let a = &polygon[i];
        let b = &polygon[(i + 1) % n];
        let len = (b - a).norm();
        len > 0.0 && cross2(a, b, p) > eps * len
    })
}

/// Whether any part of segment `a`→`b` passes strictly through the interior
/// of a convex CCW polygon.
///
/// The segment is clipped against the polygon's half-planes; a touching or
/// boundary-riding segment does not count.
#[must_use]
pub fn segment_crosses_interior(
    polygon: &[Point2<f64>],
    a: &Point2<f64>,
    b: &Point2<f64>,
    eps: f64,
) -> bool {
    let d: Vector2<f64> = b - a;
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    let n = polygon.len();

    for i in 0..n {
        let pa = &polygon[i];
        let pb = &polygon[(i + 1) % n];
        let edge = pb - pa;
        // Inward distance of a + t*d from this edge, scaled by |edge|.
        let f0 = cross2(pa, pb, a);
        let dir = edge.x * d.y - edge.y * d.x;
        if dir.abs() < f64::EPSILON {
            // Segment parallel to the edge: entirely out if on the outside.
            if f0 <= 0.0 {
                return false;
            }
        } else {
            let t_hit = -f0 / dir;
            if dir > 0.0 {
                t0 = t0.max(t_hit);
            } else {
                t1 = t1.min(t_hit);
            }
        }
        if t0 >= t1 {
            return false;
        }
    }

    // A measurable piece of the segment survived clipping; require its
    // midpoint to sit strictly inside, ruling out boundary riders.
    let tm = 0.5 * (t0 + t1);
    let mid = Point2::from(a.coords + d * tm);
    point_strictly_inside(polygon, &mid, eps)
}

/// Vertex-wise interpolation between two polygons of equal length.
///
/// `t = 0` yields `from`, `t = 1` yields `to`.
#[must_use]
pub fn lerp_polygon(from: &[Point2<f64>], to: &[Point2<f64>], t: f64) -> Vec<Point2<f64>> {
    from.iter()
        .zip(to.iter())
        .map(|(a, b)| Point2::from(a.coords.lerp(&b.coords, t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Vec<Point2<f64>> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.5, 0.866),
        ]
    }

    #[test]
    fn signed_area_orientation() {
        let tri = unit_triangle();
        assert!(signed_area(&tri) > 0.0);
        let cw: Vec<_> = tri.iter().rev().copied().collect();
        assert!(signed_area(&cw) < 0.0);
    }

    #[test]
    fn convexity() {
        assert!(is_ccw_convex(&unit_triangle()));
        let bowtie = vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 1.0),
        ];
        assert!(!is_ccw_convex(&bowtie));
    }

    #[test]
    fn strict_containment_excludes_boundary() {
        let tri = unit_triangle();
        assert!(point_strictly_inside(&tri, &Point2::new(0.5, 0.3), 1e-9));
        assert!(!point_strictly_inside(&tri, &Point2::new(0.5, 0.0), 1e-9));
        assert!(!point_strictly_inside(&tri, &Point2::new(0.0, 0.0), 1e-9));
        assert!(!point_strictly_inside(&tri, &Point2::new(2.0, 0.5), 1e-9));
    }

    #[test]
    fn crossing_segment_detected() {
        let tri = unit_triangle();
        // Straight through the middle.
        assert!(segment_crosses_interior(
            &tri,
            &Point2::new(-1.0, 0.3),
            &Point2::new(2.0, 0.3),
            1e-9,
        ));
        // Entirely outside.
        assert!(!segment_crosses_interior(
            &tri,
            &Point2::new(-1.0, -0.5),
            &Point2::new(2.0, -0.5),
            1e-9,
        ));
        // Riding an edge of the triangle.
        assert!(!segment_crosses_interior(
            &tri,
            &Point2::new(0.0, 0.0),
            &Point2::new(1.0, 0.0),
            1e-9,
        ));
        // Touching a single vertex.
        assert!(!segment_crosses_interior(
            &tri,
            &Point2::new(-1.0, 0.0),
            &Point2::new(0.0, 0.0),
            1e-9,
        ));
    }

    #[test]
    fn polygon_interpolation_endpoints() {
        let from = unit_triangle();
        let to = vec![
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 2.0),
        ];
        let at_zero = lerp_polygon(&from, &to, 0.0);
        let at_one = lerp_polygon(&from, &to, 1.0);
        for (got, want) in at_zero.iter().zip(&from) {
            assert!((got - want).norm() < 1e-12);
        }
        for (got, want) in at_one.iter().zip(&to) {
            assert!((got - want).norm() < 1e-12);
        }
    }
}
