//! The advancing-front generation driver.

// The loop keeps several parallel index spaces (front, local, plain, mesh);
// the similar names are those pairs.
#![allow(clippy::similar_names)]
#![allow(clippy::cast_possible_truncation)]

use hashbrown::HashMap;
use mesh_front::{AdvancingFront, LocalEnvironment};
use mesh_rules::{
    apply_rules, LocalRef, MatchOptions, PlainEnvironment, PlainLine, PlainPoint, RuleApplication,
    RuleLibrary, RuleStats,
};
use mesh_surface::{Aabb, ChartPointInfo, Element2d, MultiChartInfo, Point3, SurfaceMesh};
use tracing::{debug, info, warn};

use crate::chart::ChartTransform;
use crate::error::{ChartError, MeshingError, MeshingResult};
use crate::params::MeshingParams;
use crate::report::{MeshingOutcome, MeshingReport, RuleUsage};

/// The mesh generation driver.
///
/// A `Mesher` owns the advancing front for one generation run: the caller
/// registers the closed boundary ([`Mesher::add_point`],
/// [`Mesher::add_boundary_line`]), then [`Mesher::generate`] advances the
/// front rule by rule until it is empty or a budget runs out. The rule
/// library is shared read-only; the mesh and the chart are borrowed
/// mutably for the duration of the call, and the driver is the sole writer
/// of newly appended mesh content.
///
/// # Example
///
/// ```
/// use mesh_advance::{FlatChart, Mesher, MeshingParams};
/// use mesh_rules::RuleLibrary;
/// use mesh_surface::{Aabb, ChartPointInfo, Point3, SurfaceMesh};
///
/// let corners = [
///     Point3::new(0.0, 0.0, 0.0),
///     Point3::new(1.0, 0.0, 0.0),
///     Point3::new(0.5, 0.866, 0.0),
/// ];
///
/// let library = RuleLibrary::standard();
/// let mut mesh = SurfaceMesh::new();
/// let mut mesher = Mesher::new(&library, Aabb::from_points(corners.iter()));
///
/// let gi = ChartPointInfo::new(0, 0.0, 0.0);
/// let ids: Vec<u32> = corners
///     .iter()
///     .map(|&p| {
///         let global = mesh.add_point(p);
///         mesher.add_point(p, global, None, true)
///     })
///     .collect();
/// for i in 0..3 {
///     mesher.add_boundary_line(ids[i], ids[(i + 1) % 3], gi, gi);
/// }
///
/// let mut chart = FlatChart::default();
/// let report = mesher
///     .generate(&mut mesh, &mut chart, &MeshingParams::default(), 1.0, 1)
///     .unwrap();
/// assert!(report.is_complete());
/// assert_eq!(mesh.element_count(), 1);
/// ```
#[derive(Debug)]
pub struct Mesher<'r> {
    rules: &'r RuleLibrary,
    front: AdvancingFront,
    bounds: Aabb,
    max_element_area: Option<f64>,
}

impl<'r> Mesher<'r> {
    /// A driver over a rule library and the domain's bounding box.
    #[must_use]
    pub fn new(rules: &'r RuleLibrary, bounds: Aabb) -> Self {
        Self {
            rules,
            front: AdvancingFront::new(),
            bounds,
            max_element_area: None,
        }
    }

    /// Register a boundary point.
    ///
    /// `global` is the point's index in the mesh passed to `generate`.
    /// `multi_info` carries candidate chart placements for seam points;
    /// `on_surface = false` marks interior seeds that block geometry but
    /// never become element corners.
    pub fn add_point(
        &mut self,
        position: Point3<f64>,
        global: u32,
        multi_info: Option<MultiChartInfo>,
        on_surface: bool,
    ) -> u32 {
        self.front.add_point(position, global, multi_info, on_surface)
    }

    /// Register one boundary segment between points returned by
    /// [`Mesher::add_point`], oriented with the unmeshed domain on its
    /// left, with per-endpoint chart placement info.
    pub fn add_boundary_line(
        &mut self,
        p1: u32,
        p2: u32,
        gi1: ChartPointInfo,
        gi2: ChartPointInfo,
    ) {
        self.front.add_line(p1, p2, gi1, gi2);
    }

    /// Cap the area of newly generated elements.
    ///
    /// Enforced as a rule-acceptance filter: boundary constraints may
    /// force smaller elements, but no accepted element exceeds the cap.
    pub fn set_max_element_area(&mut self, area: f64) {
        self.max_element_area = (area > 0.0).then_some(area);
    }

    /// The advancing front (for inspection; empty after a completed run).
    #[must_use]
    pub fn front(&self) -> &AdvancingFront {
        &self.front
    }

    /// Advance the front until the domain is meshed or a budget runs out.
    ///
    /// New points and elements (tagged `face_id`) are appended to `mesh`;
    /// `gh` is the global mesh size target. See [`MeshingReport`] for what
    /// a run reports and [`MeshingOutcome`] for the completion semantics.
    ///
    /// # Errors
    ///
    /// [`MeshingError`] on constructive misuse: invalid parameters or mesh
    /// size, an empty front, or a boundary that is not closed. Hard
    /// domains are not errors; they end with
    /// [`MeshingOutcome::GaveUp`].
    pub fn generate(
        &mut self,
        mesh: &mut SurfaceMesh,
        chart: &mut dyn ChartTransform,
        params: &MeshingParams,
        gh: f64,
        face_id: u32,
    ) -> MeshingResult<MeshingReport> {
        params.validate()?;
        if !gh.is_finite() || gh <= 0.0 {
            return Err(MeshingError::InvalidMeshSize(gh));
        }
        if self.front.is_empty() {
            return Err(MeshingError::EmptyFront);
        }
        if !self.front.is_closed() {
            return Err(MeshingError::OpenFront);
        }

        chart.start_mesh();

        let initial_lines = self.front.active_line_count();
        let budget = params
            .attempt_budget
            .unwrap_or(10_000 + 50 * initial_lines);
        let degenerate_length = 1e-12 * (1.0 + self.bounds.diagonal());

        let mut stats = RuleStats::new(self.rules.len());
        let mut attempts = 0usize;
        let mut failed_attempts = 0usize;
        let mut points_created = 0usize;
        let mut elements_created = 0usize;
        let mut meshed_area = 0.0f64;

        debug!(initial_lines, budget, gh, face_id, "starting generation");

        let outcome = loop {
            let Some(base) = self.front.select_base_line(params.strategy) else {
                break MeshingOutcome::Completed;
            };
            if base.class > params.giveup_failures {
                warn!(
                    class = base.class,
                    budget = params.giveup_failures,
                    "every remaining segment exhausted its failure budget"
                );
                break MeshingOutcome::GaveUp;
            }
            if attempts >= budget {
                warn!(attempts, "attempt budget exhausted");
                break MeshingOutcome::GaveUp;
            }
            attempts += 1;

            let p1 = self.front.point(base.points[0]).position;
            let p2 = self.front.point(base.points[1]).position;
            let length = (p2 - p1).norm();
            if length <= degenerate_length {
                debug!(line = base.id, "degenerate base segment");
                self.front.increment_class(base.id);
                failed_attempts += 1;
                continue;
            }

            chart.define_transformation(&p1, &p2, &base.geom_info[0], &base.geom_info[1]);

            let mid = nalgebra::center(&p1, &p2);
            let h = chart
                .local_h(&mid, gh)
                .clamp(length / (1.0 + params.grading), length * (1.0 + params.grading));
            let tolerance = base.class.min(params.max_tolerance);
            let match_radius = params.neighborhood_factor * h * f64::from(tolerance);

            let locals = self
                .front
                .collect_locals(base.id, match_radius, 2.0 * match_radius);
            let (env, env_line_front) = build_plain_environment(&locals, chart, h);

            let options = MatchOptions {
                max_element_area: self.max_element_area.map(|a| a / (h * h)),
                ..MatchOptions::default()
            };

            // Back-transformation failures reject a candidate rule and ask
            // the engine for the next one.
            let mut excluded = vec![false; self.rules.len()];
            let accepted = loop {
                let Some(application) =
                    apply_rules(&env, self.rules, tolerance, &options, &excluded, &mut stats)
                else {
                    break None;
                };
                match realize_application(&application, &locals, chart, h) {
                    Ok(realized) => break Some((application, realized)),
                    Err(err) => {
                        debug!(rule = application.rule, %err, "rule rejected by chart");
                        excluded[application.rule] = true;
                    }
                }
            };

            let Some((application, realized)) = accepted else {
                self.front.increment_class(base.id);
                failed_attempts += 1;
                continue;
            };

            // Commit: new points first, then elements, then the front.
            let mut new_front_ids = Vec::with_capacity(realized.new_points.len());
            let mut new_globals = Vec::with_capacity(realized.new_points.len());
            for (position, _info) in &realized.new_points {
                let global = mesh.add_point(*position);
                new_globals.push(global);
                new_front_ids.push(self.front.add_point(*position, global, None, true));
                points_created += 1;
            }

            let global_of = |r: LocalRef| -> u32 {
                match r {
                    LocalRef::Point(local) => {
                        self.front.point(locals.points[local].front_id).global
                    }
                    LocalRef::NewPoint(new) => new_globals[new],
                }
            };
            for element in &application.elements {
                let corners: Vec<u32> = element.corners.iter().map(|&c| global_of(c)).collect();
                let element = match corners.as_slice() {
                    &[a, b, c] => Element2d::triangle([a, b, c], face_id),
                    &[a, b, c, d] => Element2d::quad([a, b, c, d], face_id),
                    _ => continue, // rule validation keeps this unreachable
                };
                meshed_area += mesh.element_area(&element).unwrap_or(0.0);
                mesh.add_element(element);
                elements_created += 1;
            }

            for &env_line in &application.delete_lines {
                if let Some(front_line) = env_line_front[env_line] {
                    self.front.delete_line(front_line);
                }
            }
            for line in &application.new_lines {
                let front_of = |r: LocalRef| -> u32 {
                    match r {
                        LocalRef::Point(local) => locals.points[local].front_id,
                        LocalRef::NewPoint(new) => new_front_ids[new],
                    }
                };
                let info_of = |r: LocalRef| -> ChartPointInfo {
                    match r {
                        LocalRef::Point(local) => realized.existing_info[&local],
                        LocalRef::NewPoint(new) => realized.new_points[new].1,
                    }
                };
                self.front.add_line(
                    front_of(line[0]),
                    front_of(line[1]),
                    info_of(line[0]),
                    info_of(line[1]),
                );
            }
            stats.note_applied(application.rule);

            if let Some(total) = chart.domain_area() {
                if meshed_area > 1.05 * total {
                    warn!(meshed_area, total, "meshed area exceeds the domain");
                    break MeshingOutcome::GaveUp;
                }
            }
        };

        let report = MeshingReport {
            outcome,
            points_created,
            elements_created,
            attempts,
            failed_attempts,
            meshed_area,
            rule_usage: self
                .rules
                .names()
                .iter()
                .enumerate()
                .map(|(index, name)| RuleUsage {
                    name: (*name).to_string(),
                    matched: stats.matched()[index],
                    usable: stats.usable()[index],
                    applied: stats.applied()[index],
                })
                .collect(),
        };
        info!(%report, "generation finished");
        Ok(report)
    }
}

/// Project the 3D neighborhood into the active chart's plain coordinates.
///
/// Returns the plain environment plus, per plain line, the front line it
/// came from (`None` for chart-boundary blockers).
fn build_plain_environment(
    locals: &LocalEnvironment,
    chart: &dyn ChartTransform,
    h: f64,
) -> (PlainEnvironment, Vec<Option<usize>>) {
    let mut env = PlainEnvironment::default();
    let mut env_line_front = Vec::with_capacity(locals.lines.len());

    for point in &locals.points {
        let (plain, zone) = chart.to_plain(&point.position, point.multi_info.as_ref(), h);
        env.points.push(PlainPoint {
            position: plain,
            matchable: point.matchable && zone == 0,
        });
    }

    for (index, line) in locals.lines.iter().enumerate() {
        if index > 0 {
            let a = &locals.points[line.ends[0]].position;
            let b = &locals.points[line.ends[1]].position;
            let on_chart = chart.is_line_vertex_on_chart(a, b, 0, &line.geom_info[0])
                && chart.is_line_vertex_on_chart(a, b, 1, &line.geom_info[1]);
            if !on_chart {
                // The segment still blocks, but rules must not build on it.
                env.points[line.ends[0]].matchable = false;
                env.points[line.ends[1]].matchable = false;
            }
        }
        env.lines.push(PlainLine { ends: line.ends });
        env_line_front.push(Some(line.line_id));
    }

    for segment in chart.chart_boundary(h) {
        let start = env.points.len();
        env.points.push(PlainPoint {
            position: segment[0],
            matchable: false,
        });
        env.points.push(PlainPoint {
            position: segment[1],
            matchable: false,
        });
        env.lines.push(PlainLine {
            ends: [start, start + 1],
        });
        env_line_front.push(None);
    }

    (env, env_line_front)
}

/// The chart-side realization of an accepted rule application.
struct Realized {
    /// New points in model space with their chart placement.
    new_points: Vec<(Point3<f64>, ChartPointInfo)>,
    /// Resolved placement info for every reused local point.
    existing_info: HashMap<usize, ChartPointInfo>,
}

/// Carry an application's new points back to the surface and resolve chart
/// placement for every reused point.
///
/// Any failure here (non-representable point, ambiguous or missing chart)
/// rejects the candidate application.
fn realize_application(
    application: &RuleApplication,
    locals: &LocalEnvironment,
    chart: &dyn ChartTransform,
    h: f64,
) -> Result<Realized, ChartError> {
    let mut new_points = Vec::with_capacity(application.new_points.len());
    for plain in &application.new_points {
        new_points.push(chart.from_plain(plain, h)?);
    }

    let mut needed: Vec<usize> = Vec::new();
    let mut note = |r: LocalRef| {
        if let LocalRef::Point(local) = r {
            if !needed.contains(&local) {
                needed.push(local);
            }
        }
    };
    for element in &application.elements {
        for &corner in &element.corners {
            note(corner);
        }
    }
    for line in &application.new_lines {
        note(line[0]);
        note(line[1]);
    }

    let mut existing_info = HashMap::new();
    for local in needed {
        let point = &locals.points[local];
        let info = if let Some(multi) = &point.multi_info {
            chart.choose_chart_point_geom_info(multi)?
        } else {
            // Info stored on an adjacent segment is reusable only while it
            // is valid for the active chart.
            let stored = locals.lines.iter().find_map(|line| {
                line.ends
                    .iter()
                    .position(|&end| end == local)
                    .map(|which| line.geom_info[which])
            });
            match stored {
                Some(gi) if chart.belongs_to_active_chart(&point.position, &gi) => gi,
                _ => chart.compute_point_geom_info(&point.position)?,
            }
        };
        existing_info.insert(local, info);
    }

    Ok(Realized {
        new_points,
        existing_info,
    })
}
