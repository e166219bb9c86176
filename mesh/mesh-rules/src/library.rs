//! The rule table and the compiled standard triangle rules.

use nalgebra::Point2;

use crate::error::{RuleParseError, RuleResult};
use crate::parse::parse_rules;
use crate::rule::{MeshRule, PointRef, RuleElement};

/// An ordered, immutable table of rules addressed by stable index.
///
/// Declaration order is priority order: the matching engine tries rules
/// front to back and the first admissible match wins. Per-rule statistics
/// arrays are indexed by the same indices.
#[derive(Debug, Clone)]
pub struct RuleLibrary {
    rules: Vec<MeshRule>,
}

impl RuleLibrary {
    /// Build a library from explicit rules, validating each.
    ///
    /// # Errors
    ///
    /// Returns the first rule's validation failure.
    pub fn new(rules: Vec<MeshRule>) -> RuleResult<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    /// The compiled standard triangle rules (see
    /// [`standard_triangle_rules`]).
    #[must_use]
    pub fn standard() -> Self {
        // Compiled rules are validated by the crate's test suite.
        Self {
            rules: standard_triangle_rules(),
        }
    }

    /// Parse a library from the rule text format.
    ///
    /// # Errors
    ///
    /// Returns a [`RuleParseError`] carrying the offending line number.
    pub fn from_text(text: &str) -> Result<Self, RuleParseError> {
        Ok(Self {
            rules: parse_rules(text)?,
        })
    }

    /// Number of rules.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the library holds no rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The rule at `index`, if present.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&MeshRule> {
        self.rules.get(index)
    }

    /// Iterate over the rules in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &MeshRule> {
        self.rules.iter()
    }

    /// Rule names in priority order, for reports.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }
}

/// Template apex of an equilateral triangle over the unit base segment.
fn apex() -> Point2<f64> {
    Point2::new(0.5, 0.866)
}

/// The compiled standard rules for triangle meshing, in priority order
/// (most specific first):
///
/// 1. **close triangle** - fill a triangular hole bounded by three
///    segments;
/// 2. **right 60** - close a ~60° corner at the base's right end, reusing
///    the corner point;
/// 3. **left 60** - the mirrored corner closer at the base's left end;
/// 4. **free triangle** - advance into open space with a new apex point;
/// 5. **span close** - connect the base to an opposite front point with no
///    shared segments (gated to tolerance ≥ 2: it trades quality for
///    termination when fronts approach each other).
///
/// All template geometry lives over the canonical base segment
/// `(0,0)` → `(1,0)` with the unmeshed domain above.
#[must_use]
pub fn standard_triangle_rules() -> Vec<MeshRule> {
    let triangle_zone = vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), apex()];

    let free_triangle = MeshRule {
        name: "free triangle".into(),
        min_tolerance: 1,
        old_points: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)],
        point_tolerance: vec![0.5, 0.5],
        old_lines: vec![[0, 1]],
        delete_lines: vec![0],
        new_points: vec![apex()],
        elements: vec![RuleElement::triangle(
            PointRef::Old(0),
            PointRef::Old(1),
            PointRef::New(0),
        )],
        new_lines: vec![
            [PointRef::Old(0), PointRef::New(0)],
            [PointRef::New(0), PointRef::Old(1)],
        ],
        free_zone: vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.4, 0.7),
            Point2::new(0.5, 1.6),
            Point2::new(-0.4, 0.7),
        ],
        free_zone_limit: vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.05, 0.5),
            Point2::new(0.5, 1.0),
            Point2::new(-0.05, 0.5),
        ],
    };

    let right_60 = MeshRule {
        name: "right 60".into(),
        min_tolerance: 1,
        old_points: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), apex()],
        point_tolerance: vec![0.5, 0.5, 0.5],
        old_lines: vec![[0, 1], [1, 2]],
        delete_lines: vec![0, 1],
        new_points: vec![],
        elements: vec![RuleElement::triangle(
            PointRef::Old(0),
            PointRef::Old(1),
            PointRef::Old(2),
        )],
        new_lines: vec![[PointRef::Old(0), PointRef::Old(2)]],
        free_zone: triangle_zone.clone(),
        free_zone_limit: triangle_zone.clone(),
    };

    let left_60 = MeshRule {
        name: "left 60".into(),
        min_tolerance: 1,
        old_points: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), apex()],
        point_tolerance: vec![0.5, 0.5, 0.5],
        old_lines: vec![[0, 1], [2, 0]],
        delete_lines: vec![0, 1],
        new_points: vec![],
        elements: vec![RuleElement::triangle(
            PointRef::Old(0),
            PointRef::Old(1),
            PointRef::Old(2),
        )],
        new_lines: vec![[PointRef::Old(2), PointRef::Old(1)]],
        free_zone: triangle_zone.clone(),
        free_zone_limit: triangle_zone.clone(),
    };

    let close_triangle = MeshRule {
        name: "close triangle".into(),
        min_tolerance: 1,
        old_points: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), apex()],
        point_tolerance: vec![0.5, 0.5, 0.6],
        old_lines: vec![[0, 1], [1, 2], [2, 0]],
        delete_lines: vec![0, 1, 2],
        new_points: vec![],
        elements: vec![RuleElement::triangle(
            PointRef::Old(0),
            PointRef::Old(1),
            PointRef::Old(2),
        )],
        new_lines: vec![],
        free_zone: triangle_zone.clone(),
        free_zone_limit: triangle_zone.clone(),
    };

    let span_close = MeshRule {
        name: "span close".into(),
        min_tolerance: 2,
        old_points: vec![Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), apex()],
        point_tolerance: vec![0.5, 0.5, 0.6],
        old_lines: vec![[0, 1]],
        delete_lines: vec![0],
        new_points: vec![],
        elements: vec![RuleElement::triangle(
            PointRef::Old(0),
            PointRef::Old(1),
            PointRef::Old(2),
        )],
        new_lines: vec![
            [PointRef::Old(0), PointRef::Old(2)],
            [PointRef::Old(2), PointRef::Old(1)],
        ],
        free_zone: triangle_zone.clone(),
        free_zone_limit: triangle_zone,
    };

    vec![close_triangle, right_60, left_60, free_triangle, span_close]
}
