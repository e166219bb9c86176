//! The rule matching engine.
//!
//! Operates purely on the 2D plain-coordinate neighborhood the driver
//! assembled: template lines are matched by connectivity walking out from
//! the base segment, remaining template points match free legal points, and
//! a candidate replacement passes only if it is geometrically admissible
//! (counter-clockwise, within the area cap, and with a clear free zone).

// Dense index bookkeeping; the similar names are the template/local pairs.
#![allow(clippy::similar_names)]

use nalgebra::{Point2, Vector2};
use smallvec::SmallVec;
use tracing::debug;

use crate::geom;
use crate::library::RuleLibrary;
use crate::rule::{MeshRule, PointRef};

/// A neighborhood point in plain coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PlainPoint {
    /// Position in the active chart's plain coordinates.
    pub position: Point2<f64>,
    /// Whether rules may match this point. Unmatchable points (foreign
    /// zone, off-surface, outside the matching radius) still block free
    /// zones.
    pub matchable: bool,
}

/// A neighborhood segment in plain coordinates.
#[derive(Debug, Clone, Copy)]
pub struct PlainLine {
    /// Endpoint indices into [`PlainEnvironment::points`].
    pub ends: [usize; 2],
}

/// The 2D neighborhood a rule application is matched against.
///
/// `lines[0]` is the base segment the local frame is anchored on.
#[derive(Debug, Clone, Default)]
pub struct PlainEnvironment {
    /// Neighborhood points; the base endpoints are `points[0]` and
    /// `points[1]`.
    pub points: Vec<PlainPoint>,
    /// Neighborhood segments; the base segment is `lines[0]`.
    pub lines: Vec<PlainLine>,
}

/// Geometric acceptance options for rule matching.
#[derive(Debug, Clone, Copy)]
pub struct MatchOptions {
    /// Upper bound on element area, in plain units. `None` disables the
    /// filter.
    pub max_element_area: Option<f64>,
    /// Degeneracy threshold: elements with signed area below this fraction
    /// of the squared base length are rejected.
    pub min_element_area: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            max_element_area: None,
            min_element_area: 1e-3,
        }
    }
}

/// Reference to a point of an applied replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalRef {
    /// Index into [`PlainEnvironment::points`].
    Point(usize),
    /// Index into [`RuleApplication::new_points`].
    NewPoint(usize),
}

/// One face of an applied replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedElement {
    /// Corner references, counter-clockwise.
    pub corners: SmallVec<[LocalRef; 4]>,
}

/// An admissible rule application, expressed against the environment it was
/// matched in.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleApplication {
    /// Index of the winning rule in the library.
    pub rule: usize,
    /// Tolerance level the match was admitted at.
    pub level: u32,
    /// Plain positions of newly introduced points.
    pub new_points: Vec<Point2<f64>>,
    /// Replacement faces.
    pub elements: Vec<AppliedElement>,
    /// Environment line indices the replacement consumes.
    pub delete_lines: Vec<usize>,
    /// Replacement boundary segments, unmeshed domain on the left.
    pub new_lines: Vec<[LocalRef; 2]>,
}

/// Per-rule usage counters, parallel to the library's rule indices.
#[derive(Debug, Clone, Default)]
pub struct RuleStats {
    matched: Vec<u64>,
    usable: Vec<u64>,
    applied: Vec<u64>,
}

impl RuleStats {
    /// Counters for a library of `rule_count` rules.
    #[must_use]
    pub fn new(rule_count: usize) -> Self {
        Self {
            matched: vec![0; rule_count],
            usable: vec![0; rule_count],
            applied: vec![0; rule_count],
        }
    }

    /// The rule's pattern matched the neighborhood.
    pub fn note_matched(&mut self, rule: usize) {
        if let Some(n) = self.matched.get_mut(rule) {
            *n += 1;
        }
    }

    /// The rule passed every admissibility check.
    pub fn note_usable(&mut self, rule: usize) {
        if let Some(n) = self.usable.get_mut(rule) {
            *n += 1;
        }
    }

    /// The rule's replacement was committed to the mesh.
    pub fn note_applied(&mut self, rule: usize) {
        if let Some(n) = self.applied.get_mut(rule) {
            *n += 1;
        }
    }

    /// Pattern-match counts per rule.
    #[must_use]
    pub fn matched(&self) -> &[u64] {
        &self.matched
    }

    /// Admissibility counts per rule.
    #[must_use]
    pub fn usable(&self) -> &[u64] {
        &self.usable
    }

    /// Commit counts per rule.
    #[must_use]
    pub fn applied(&self) -> &[u64] {
        &self.applied
    }
}

/// Try every rule against a neighborhood, escalating the tolerance level.
///
/// Levels run from 1 to `tolerance`; within one level, rules are tried in
/// library order and the first admissible replacement wins, which makes the
/// selection deterministic for identical input. A rule participates only at
/// levels at or above its `min_tolerance`, and `excluded[rule]` masks rules
/// a caller has already rejected downstream.
///
/// Returns `None` when no rule is admissible at any level.
#[must_use]
pub fn apply_rules(
    env: &PlainEnvironment,
    library: &RuleLibrary,
    tolerance: u32,
    options: &MatchOptions,
    excluded: &[bool],
    stats: &mut RuleStats,
) -> Option<RuleApplication> {
    let map = base_similarity(env)?;
    let mut matched_this_call = vec![false; library.len()];

    for level in 1..=tolerance.max(1) {
        for (index, rule) in library.iter().enumerate() {
            if excluded.get(index).copied().unwrap_or(false) || rule.min_tolerance > level {
                continue;
            }
            let (application, pattern_matched) = match_rule_inner(env, rule, &map, level, options);
            if pattern_matched && !matched_this_call[index] {
                matched_this_call[index] = true;
                stats.note_matched(index);
            }
            if let Some(mut application) = application {
                stats.note_usable(index);
                application.rule = index;
                debug!(rule = rule.name.as_str(), level, "rule admissible");
                return Some(application);
            }
        }
    }
    None
}

/// Match a single rule at a single tolerance level.
///
/// Exposed for diagnostics and property tests; [`apply_rules`] is the
/// production entry point. The returned application's `rule` index is
/// meaningful only when it comes from [`apply_rules`].
#[must_use]
pub fn match_rule(
    env: &PlainEnvironment,
    rule: &MeshRule,
    level: u32,
    options: &MatchOptions,
) -> Option<RuleApplication> {
    let map = base_similarity(env)?;
    match_rule_inner(env, rule, &map, level, options).0
}

/// The similarity transform carrying template coordinates onto the base
/// segment: rotation and scale from the base direction, translation from
/// its start point.
#[derive(Debug, Clone, Copy)]
struct Similarity {
    origin: Vector2<f64>,
    u: Vector2<f64>,
}

impl Similarity {
    fn apply(&self, p: &Point2<f64>) -> Point2<f64> {
        Point2::new(
            self.origin.x + self.u.x * p.x - self.u.y * p.y,
            self.origin.y + self.u.y * p.x + self.u.x * p.y,
        )
    }

    fn scale(&self) -> f64 {
        self.u.norm()
    }
}

/// An affine map fixed by three template-to-actual point correspondences.
#[derive(Debug, Clone, Copy)]
struct Affine {
    t0: Point2<f64>,
    tu: Vector2<f64>,
    tv: Vector2<f64>,
    inv_det_t: f64,
    a0: Point2<f64>,
    au: Vector2<f64>,
    av: Vector2<f64>,
}

impl Affine {
    fn apply(&self, p: &Point2<f64>) -> Point2<f64> {
        let d = p - self.t0;
        let alpha = (d.x * self.tv.y - d.y * self.tv.x) * self.inv_det_t;
        let beta = (self.tu.x * d.y - self.tu.y * d.x) * self.inv_det_t;
        Point2::from(self.a0.coords + self.au * alpha + self.av * beta)
    }
}

fn base_similarity(env: &PlainEnvironment) -> Option<Similarity> {
    let base = env.lines.first()?;
    let e0 = env.points.get(base.ends[0])?.position;
    let e1 = env.points.get(base.ends[1])?.position;
    let u = e1 - e0;
    // A vanishing base segment has no frame to match in.
    if u.norm_squared() < 1e-20 {
        return None;
    }
    Some(Similarity {
        origin: e0.coords,
        u,
    })
}

fn match_rule_inner(
    env: &PlainEnvironment,
    rule: &MeshRule,
    map: &Similarity,
    level: u32,
    options: &MatchOptions,
) -> (Option<RuleApplication>, bool) {
    if env.points.len() < 2
        || rule.old_points.len() < 2
        || rule.old_points.len() > env.points.len()
    {
        return (None, false);
    }
    let base = env.lines[0].ends;
    let mut matcher = Matcher {
        env,
        rule,
        map,
        level,
        options,
        point_map: vec![None; rule.old_points.len()],
        line_map: vec![None; rule.old_lines.len()],
        used_points: vec![false; env.points.len()],
        used_lines: vec![false; env.lines.len()],
        pattern_matched: false,
    };
    matcher.point_map[0] = Some(base[0]);
    matcher.point_map[1] = Some(base[1]);
    matcher.line_map[0] = Some(0);
    matcher.used_points[base[0]] = true;
    matcher.used_points[base[1]] = true;
    matcher.used_lines[0] = true;

    let application = matcher.match_lines(1);
    (application, matcher.pattern_matched)
}

struct Matcher<'a> {
    env: &'a PlainEnvironment,
    rule: &'a MeshRule,
    map: &'a Similarity,
    level: u32,
    options: &'a MatchOptions,
    point_map: Vec<Option<usize>>,
    line_map: Vec<Option<usize>>,
    used_points: Vec<bool>,
    used_lines: Vec<bool>,
    pattern_matched: bool,
}

impl Matcher<'_> {
    fn radius(&self, template: usize) -> f64 {
        self.rule.point_tolerance[template] * f64::from(self.level) * self.map.scale()
    }

    fn within_radius(&self, template: usize, local: usize) -> bool {
        let target = self.map.apply(&self.rule.old_points[template]);
        (self.env.points[local].position - target).norm() <= self.radius(template)
    }

    /// Bind a template point to a local point, if consistent.
    /// Returns whether the binding is new (and must be undone on backtrack).
    fn bind(&mut self, template: usize, local: usize) -> Option<bool> {
        match self.point_map[template] {
            Some(existing) => (existing == local).then_some(false),
            None => {
                let p = &self.env.points[local];
                (p.matchable
                    && !self.used_points[local]
                    && self.within_radius(template, local))
                .then(|| {
                    self.point_map[template] = Some(local);
                    self.used_points[local] = true;
                    true
                })
            }
        }
    }

    fn unbind(&mut self, template: usize) {
        if let Some(local) = self.point_map[template].take() {
            self.used_points[local] = false;
        }
    }

    /// Match template lines from `k` on, then fall through to free points.
    fn match_lines(&mut self, k: usize) -> Option<RuleApplication> {
        if k == self.rule.old_lines.len() {
            return self.match_free_points(0);
        }
        let [ta, tb] = self.rule.old_lines[k];
        for local in 1..self.env.lines.len() {
            if self.used_lines[local] {
                continue;
            }
            let ends = self.env.lines[local].ends;
            let Some(new_a) = self.bind(ta, ends[0]) else {
                continue;
            };
            let Some(new_b) = self.bind(tb, ends[1]) else {
                if new_a {
                    self.unbind(ta);
                }
                continue;
            };

            self.used_lines[local] = true;
            self.line_map[k] = Some(local);
            if let Some(found) = self.match_lines(k + 1) {
                return Some(found);
            }
            self.line_map[k] = None;
            self.used_lines[local] = false;
            if new_b {
                self.unbind(tb);
            }
            if new_a {
                self.unbind(ta);
            }
        }
        None
    }

    /// Match template points not covered by any line, from `t` on.
    fn match_free_points(&mut self, t: usize) -> Option<RuleApplication> {
        let Some(template) = (t..self.rule.old_points.len()).find(|&i| self.point_map[i].is_none())
        else {
            self.pattern_matched = true;
            return self.admissible();
        };
        for local in 0..self.env.points.len() {
            if self.bind(template, local) != Some(true) {
                continue;
            }
            if let Some(found) = self.match_free_points(template + 1) {
                return Some(found);
            }
            self.unbind(template);
        }
        None
    }

    fn position(&self, r: PointRef) -> Option<Point2<f64>> {
        match r {
            PointRef::Old(i) => {
                let local = self.point_map[i]?;
                Some(self.env.points[local].position)
            }
            PointRef::New(j) => Some(self.map.apply(&self.rule.new_points[j])),
        }
    }

    /// The orientation-preserving affine map through the first three
    /// matched template points, when one exists.
    fn affine_from_match(&self) -> Option<Affine> {
        if self.rule.old_points.len() < 3 {
            return None;
        }
        let template: Vec<Point2<f64>> = self.rule.old_points[..3].to_vec();
        let actual: Vec<Point2<f64>> = self.point_map[..3]
            .iter()
            .map(|m| m.map(|local| self.env.points[local].position))
            .collect::<Option<_>>()?;

        let tu = template[1] - template[0];
        let tv = template[2] - template[0];
        let det_t = tu.x * tv.y - tu.y * tv.x;
        let au = actual[1] - actual[0];
        let av = actual[2] - actual[0];
        let det_a = au.x * av.y - au.y * av.x;
        // A mirrored or collapsed match cannot carry the zone; the rigid
        // similarity is the conservative fallback.
        if det_t.abs() < 1e-12 || det_a * det_t.signum() <= 1e-12 {
            return None;
        }
        Some(Affine {
            t0: template[0],
            tu,
            tv,
            inv_det_t: 1.0 / det_t,
            a0: actual[0],
            au,
            av,
        })
    }

    /// Full geometric admissibility of the current complete mapping.
    fn admissible(&self) -> Option<RuleApplication> {
        let scale = self.map.scale();
        let eps = 1e-7 * scale;

        // Replacement faces must be counter-clockwise, non-degenerate,
        // convex, and within the area cap.
        let mut element_polygons: Vec<Vec<Point2<f64>>> = Vec::new();
        for element in &self.rule.elements {
            let polygon: Option<Vec<Point2<f64>>> =
                element.corners.iter().map(|&c| self.position(c)).collect();
            let polygon = polygon?;
            let area = geom::signed_area(&polygon);
            if area <= self.options.min_element_area * scale * scale {
                return None;
            }
            if !geom::is_ccw_convex(&polygon) {
                return None;
            }
            if let Some(max_area) = self.options.max_element_area {
                if area > max_area {
                    return None;
                }
            }
            element_polygons.push(polygon);
        }

        let mapped_point: Vec<bool> = {
            let mut mapped = vec![false; self.env.points.len()];
            for local in self.point_map.iter().flatten() {
                mapped[*local] = true;
            }
            mapped
        };
        let deleted_line: Vec<bool> = {
            let mut deleted = vec![false; self.env.lines.len()];
            for &d in &self.rule.delete_lines {
                deleted[self.line_map[d]?] = true;
            }
            deleted
        };

        // The free zone follows the matched configuration, not the rigid
        // template: with three matched template points it is carried by
        // the affine map through them (so for corner and span rules it
        // hugs the actual element), otherwise by the base similarity.
        let affine = self.affine_from_match();
        let zone: Vec<Point2<f64>> = self
            .rule
            .free_zone_at(self.level)
            .iter()
            .map(|p| match &affine {
                Some(a) => a.apply(p),
                None => self.map.apply(p),
            })
            .collect();

        // Foreign geometry must stay clear of the free zone and of every
        // replacement face.
        for (index, point) in self.env.points.iter().enumerate() {
            if mapped_point[index] {
                continue;
            }
            if geom::point_strictly_inside(&zone, &point.position, eps) {
                return None;
            }
            if element_polygons
                .iter()
                .any(|poly| geom::point_strictly_inside(poly, &point.position, eps))
            {
                return None;
            }
        }
        for (index, line) in self.env.lines.iter().enumerate() {
            if deleted_line[index] {
                continue;
            }
            let a = self.env.points[line.ends[0]].position;
            let b = self.env.points[line.ends[1]].position;
            if geom::segment_crosses_interior(&zone, &a, &b, eps) {
                return None;
            }
            if element_polygons
                .iter()
                .any(|poly| geom::segment_crosses_interior(poly, &a, &b, eps))
            {
                return None;
            }
        }

        // A replacement segment that re-creates a surviving segment in the
        // same orientation would fold the front onto itself.
        let local_ref = |r: PointRef| -> Option<LocalRef> {
            match r {
                PointRef::Old(i) => self.point_map[i].map(LocalRef::Point),
                PointRef::New(j) => Some(LocalRef::NewPoint(j)),
            }
        };
        for line in &self.rule.new_lines {
            if let (Some(LocalRef::Point(a)), Some(LocalRef::Point(b))) =
                (local_ref(line[0]), local_ref(line[1]))
            {
                let duplicate = self
                    .env
                    .lines
                    .iter()
                    .enumerate()
                    .any(|(index, l)| !deleted_line[index] && l.ends == [a, b]);
                if duplicate {
                    return None;
                }
            }
        }

        let elements: Option<Vec<AppliedElement>> = self
            .rule
            .elements
            .iter()
            .map(|element| {
                element
                    .corners
                    .iter()
                    .map(|&c| local_ref(c))
                    .collect::<Option<SmallVec<[LocalRef; 4]>>>()
                    .map(|corners| AppliedElement { corners })
            })
            .collect();
        let new_lines: Option<Vec<[LocalRef; 2]>> = self
            .rule
            .new_lines
            .iter()
            .map(|l| Some([local_ref(l[0])?, local_ref(l[1])?]))
            .collect();
        let delete_lines: Option<Vec<usize>> = self
            .rule
            .delete_lines
            .iter()
            .map(|&d| self.line_map[d])
            .collect();

        Some(RuleApplication {
            rule: usize::MAX, // set by apply_rules
            level: self.level,
            new_points: self
                .rule
                .new_points
                .iter()
                .map(|p| self.map.apply(p))
                .collect(),
            elements: elements?,
            delete_lines: delete_lines?,
            new_lines: new_lines?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::library::RuleLibrary;
    use approx::assert_relative_eq;

    fn env(points: &[(f64, f64, bool)], lines: &[[usize; 2]]) -> PlainEnvironment {
        PlainEnvironment {
            points: points
                .iter()
                .map(|&(x, y, matchable)| PlainPoint {
                    position: Point2::new(x, y),
                    matchable,
                })
                .collect(),
            lines: lines.iter().map(|&ends| PlainLine { ends }).collect(),
        }
    }

    fn run(
        env: &PlainEnvironment,
        tolerance: u32,
        options: &MatchOptions,
    ) -> Option<RuleApplication> {
        let library = RuleLibrary::standard();
        let mut stats = RuleStats::new(library.len());
        let excluded = vec![false; library.len()];
        apply_rules(env, &library, tolerance, options, &excluded, &mut stats)
    }

    fn rule_name(library: &RuleLibrary, application: &RuleApplication) -> String {
        library.get(application.rule).unwrap().name.clone()
    }

    #[test]
    fn lone_base_takes_free_triangle() {
        let library = RuleLibrary::standard();
        let environment = env(&[(0.0, 0.0, true), (1.0, 0.0, true)], &[[0, 1]]);
        let application = run(&environment, 1, &MatchOptions::default()).unwrap();
        assert_eq!(rule_name(&library, &application), "free triangle");
        assert_eq!(application.level, 1);
        assert_eq!(application.delete_lines, vec![0]);
        assert_eq!(application.new_lines.len(), 2);
        assert_relative_eq!(application.new_points[0].x, 0.5);
        assert_relative_eq!(application.new_points[0].y, 0.866);
    }

    #[test]
    fn triangular_hole_closes_in_one_step() {
        let library = RuleLibrary::standard();
        let environment = env(
            &[(0.0, 0.0, true), (1.0, 0.0, true), (0.5, 0.866, true)],
            &[[0, 1], [1, 2], [2, 0]],
        );
        let application = run(&environment, 1, &MatchOptions::default()).unwrap();
        assert_eq!(rule_name(&library, &application), "close triangle");
        assert_eq!(application.delete_lines.len(), 3);
        assert!(application.new_lines.is_empty());
        assert!(application.new_points.is_empty());
    }

    #[test]
    fn sixty_degree_corner_closes_right() {
        let library = RuleLibrary::standard();
        let environment = env(
            &[(0.0, 0.0, true), (1.0, 0.0, true), (0.5, 0.866, true)],
            &[[0, 1], [1, 2]],
        );
        let application = run(&environment, 1, &MatchOptions::default()).unwrap();
        assert_eq!(rule_name(&library, &application), "right 60");
        assert_eq!(
            application.new_lines,
            vec![[LocalRef::Point(0), LocalRef::Point(2)]]
        );
    }

    #[test]
    fn span_close_requires_escalation() {
        let library = RuleLibrary::standard();
        // An opposite front point, no shared segments.
        let environment = env(
            &[(0.0, 0.0, true), (1.0, 0.0, true), (0.5, 0.9, true)],
            &[[0, 1]],
        );
        assert!(run(&environment, 1, &MatchOptions::default()).is_none());
        let application = run(&environment, 2, &MatchOptions::default()).unwrap();
        assert_eq!(rule_name(&library, &application), "span close");
        assert_eq!(application.level, 2);
    }

    #[test]
    fn unmatchable_point_blocks_but_never_matches() {
        let environment = env(
            &[(0.0, 0.0, true), (1.0, 0.0, true), (0.5, 0.866, false)],
            &[[0, 1], [1, 2]],
        );
        assert!(run(&environment, 3, &MatchOptions::default()).is_none());
    }

    #[test]
    fn area_cap_rejects_free_triangle() {
        let environment = env(&[(0.0, 0.0, true), (1.0, 0.0, true)], &[[0, 1]]);
        let options = MatchOptions {
            max_element_area: Some(0.2),
            ..MatchOptions::default()
        };
        assert!(run(&environment, 3, &options).is_none());
    }

    #[test]
    fn selection_is_deterministic() {
        let environment = env(
            &[(0.0, 0.0, true), (1.0, 0.0, true), (0.55, 0.8, true)],
            &[[0, 1], [1, 2]],
        );
        let first = run(&environment, 3, &MatchOptions::default());
        let second = run(&environment, 3, &MatchOptions::default());
        assert_eq!(first, second);
    }

    #[test]
    fn excluded_rules_yield_the_next_candidate() {
        let library = RuleLibrary::standard();
        let environment = env(
            &[(0.0, 0.0, true), (1.0, 0.0, true), (0.5, 0.866, true)],
            &[[0, 1], [1, 2]],
        );
        let mut stats = RuleStats::new(library.len());
        let mut excluded = vec![false; library.len()];
        let first = apply_rules(
            &environment,
            &library,
            2,
            &MatchOptions::default(),
            &excluded,
            &mut stats,
        )
        .unwrap();
        excluded[first.rule] = true;
        let second = apply_rules(
            &environment,
            &library,
            2,
            &MatchOptions::default(),
            &excluded,
            &mut stats,
        )
        .unwrap();
        assert_ne!(first.rule, second.rule);
    }

    #[test]
    fn degenerate_base_matches_nothing() {
        let environment = env(&[(0.0, 0.0, true), (0.0, 0.0, true)], &[[0, 1]]);
        assert!(run(&environment, 3, &MatchOptions::default()).is_none());
    }

    #[test]
    fn stats_track_match_and_use() {
        let library = RuleLibrary::standard();
        let environment = env(&[(0.0, 0.0, true), (1.0, 0.0, true)], &[[0, 1]]);
        let mut stats = RuleStats::new(library.len());
        let excluded = vec![false; library.len()];
        let application = apply_rules(
            &environment,
            &library,
            1,
            &MatchOptions::default(),
            &excluded,
            &mut stats,
        )
        .unwrap();
        assert_eq!(stats.matched()[application.rule], 1);
        assert_eq!(stats.usable()[application.rule], 1);
        assert_eq!(stats.applied()[application.rule], 0);
    }
}
