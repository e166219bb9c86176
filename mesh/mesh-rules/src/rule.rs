//! The immutable replacement rule model.

use nalgebra::Point2;
use smallvec::SmallVec;

use crate::error::{RuleError, RuleResult};
use crate::geom;

/// Reference to a point of a rule's replacement: either one of the matched
/// template points or a point the rule introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointRef {
    /// 0-based index into the rule's template points.
    Old(usize),
    /// 0-based index into the rule's new points.
    New(usize),
}

/// One face of a rule's replacement, wound counter-clockwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleElement {
    /// Corner references, 3 (triangle) or 4 (quad).
    pub corners: SmallVec<[PointRef; 4]>,
}

impl RuleElement {
    /// A triangle replacement face.
    #[must_use]
    pub fn triangle(a: PointRef, b: PointRef, c: PointRef) -> Self {
        Self {
            corners: SmallVec::from_slice(&[a, b, c]),
        }
    }

    /// A quad replacement face.
    #[must_use]
    pub fn quad(a: PointRef, b: PointRef, c: PointRef, d: PointRef) -> Self {
        Self {
            corners: SmallVec::from_slice(&[a, b, c, d]),
        }
    }
}

/// An immutable advancing-front replacement rule.
///
/// A rule describes a small boundary configuration in a canonical local
/// frame where the base segment spans `(0,0)` → `(1,0)`: template points
/// with per-point match tolerance radii, template lines over them (the
/// first line is always the base segment), and a replacement consisting of
/// new points, new elements, new boundary lines, and the set of template
/// lines the replacement consumes. A convex free-zone polygon guards the
/// replacement against foreign geometry; it interpolates toward the
/// relaxed `free_zone_limit` as the matching tolerance level escalates.
///
/// Rules are loaded or compiled once, validated, and then shared read-only
/// for the whole generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRule {
    /// Human-readable rule name, used in diagnostics and statistics.
    pub name: String,
    /// Lowest tolerance level at which the rule participates.
    pub min_tolerance: u32,
    /// Template point positions; `[0]` and `[1]` are the base endpoints.
    pub old_points: Vec<Point2<f64>>,
    /// Match tolerance radius per template point, scaled by the level.
    pub point_tolerance: Vec<f64>,
    /// Template lines as index pairs into `old_points`; `[0]` is the base.
    pub old_lines: Vec<[usize; 2]>,
    /// Indices into `old_lines` the replacement consumes.
    pub delete_lines: Vec<usize>,
    /// Points the replacement introduces, in template coordinates.
    pub new_points: Vec<Point2<f64>>,
    /// Replacement faces.
    pub elements: Vec<RuleElement>,
    /// Replacement boundary segments, oriented with the unmeshed domain on
    /// the left.
    pub new_lines: Vec<[PointRef; 2]>,
    /// Strict free zone (convex, counter-clockwise, template coordinates).
    pub free_zone: Vec<Point2<f64>>,
    /// Fully relaxed free zone, same vertex count as `free_zone`.
    pub free_zone_limit: Vec<Point2<f64>>,
}

impl MeshRule {
    /// Validate the rule's internal consistency.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleError`] naming the first inconsistency found; see
    /// the error variants for the individual checks.
    pub fn validate(&self) -> RuleResult<()> {
        let name = || self.name.clone();

        if self.old_points.len() < 2 {
            return Err(RuleError::TooFewPoints(name()));
        }
        if self.point_tolerance.len() != self.old_points.len() {
            return Err(RuleError::ToleranceCountMismatch(name()));
        }
        if self.point_tolerance.iter().any(|&t| t <= 0.0) {
            return Err(RuleError::BadTolerance(name()));
        }
        if self.old_lines.first() != Some(&[0, 1]) {
            return Err(RuleError::BadBaseLine(name()));
        }

        let check_old = |index: usize| {
            if index < self.old_points.len() {
                Ok(())
            } else {
                Err(RuleError::IndexOutOfRange { name: name(), index })
            }
        };
        let check_ref = |r: PointRef| match r {
            PointRef::Old(i) => check_old(i),
            PointRef::New(i) => {
                if i < self.new_points.len() {
                    Ok(())
                } else {
                    Err(RuleError::IndexOutOfRange { name: name(), index: i })
                }
            }
        };

        for line in &self.old_lines {
            check_old(line[0])?;
            check_old(line[1])?;
        }
        for &del in &self.delete_lines {
            if del >= self.old_lines.len() {
                return Err(RuleError::IndexOutOfRange { name: name(), index: del });
            }
        }
        for element in &self.elements {
            let arity = element.corners.len();
            if !(3..=4).contains(&arity) {
                return Err(RuleError::BadElementArity {
                    name: name(),
                    corners: arity,
                });
            }
            for &corner in &element.corners {
                check_ref(corner)?;
            }
        }
        for line in &self.new_lines {
            check_ref(line[0])?;
            check_ref(line[1])?;
        }

        if self.free_zone.len() != self.free_zone_limit.len() {
            return Err(RuleError::FreeZoneMismatch(name()));
        }
        if !geom::is_ccw_convex(&self.free_zone) || !geom::is_ccw_convex(&self.free_zone_limit) {
            return Err(RuleError::BadFreeZone(name()));
        }

        Ok(())
    }

    /// The free zone at a tolerance level: the strict polygon at level 1,
    /// sliding toward the relaxed limit as the level grows.
    #[must_use]
    pub fn free_zone_at(&self, level: u32) -> Vec<Point2<f64>> {
        let t = 1.0 - 1.0 / f64::from(level.max(1));
        geom::lerp_polygon(&self.free_zone, &self.free_zone_limit, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::standard_triangle_rules;

    #[test]
    fn standard_rules_validate() {
        for rule in standard_triangle_rules() {
            rule.validate().unwrap_or_else(|e| panic!("{e}"));
        }
    }

    #[test]
    fn base_line_must_come_first() {
        let mut rule = standard_triangle_rules().remove(0);
        rule.old_lines[0] = [1, 0];
        assert_eq!(rule.validate(), Err(RuleError::BadBaseLine(rule.name.clone())));
    }

    #[test]
    fn free_zone_interpolation_is_monotone_toward_limit() {
        let rule = standard_triangle_rules()
            .into_iter()
            .find(|r| r.name == "free triangle")
            .unwrap_or_else(|| panic!("missing rule"));
        let strict = rule.free_zone_at(1);
        let relaxed = rule.free_zone_at(4);
        for ((s, r), (from, to)) in strict
            .iter()
            .zip(&relaxed)
            .zip(rule.free_zone.iter().zip(&rule.free_zone_limit))
        {
            let span = (to - from).norm();
            assert!((s - from).norm() <= 1e-12);
            assert!((r - from).norm() <= span + 1e-12);
        }
    }

    #[test]
    fn dangling_element_corner_rejected() {
        let mut rule = standard_triangle_rules().remove(0);
        rule.elements[0].corners[2] = PointRef::New(9);
        assert!(matches!(
            rule.validate(),
            Err(RuleError::IndexOutOfRange { index: 9, .. })
        ));
    }
}
