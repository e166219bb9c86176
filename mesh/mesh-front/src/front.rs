//! Front storage: reference-counted points and slotted, oriented segments.

use hashbrown::HashMap;
use mesh_surface::{ChartPointInfo, MultiChartInfo, Point3};
use tracing::{debug, warn};

use crate::locals::{LocalEnvironment, LocalLine, LocalPoint};
use crate::select::{BaseLine, SelectionStrategy};

/// A point on the advancing front.
#[derive(Debug, Clone)]
pub struct FrontPoint {
    /// Model-space position.
    pub position: Point3<f64>,
    /// Index of the committed point in the global mesh point table.
    pub global: u32,
    /// Candidate chart placements, for points that may lie on several charts.
    pub multi_info: Option<MultiChartInfo>,
    /// Whether the point lies exactly on the surface being meshed.
    ///
    /// Interior seed points are kept on the front as blocking geometry but
    /// must never become element corners.
    pub on_surface: bool,
    /// Number of live front lines referencing this point.
    line_count: u32,
    /// Whether any line ever referenced this point. A point whose last line
    /// is retracted retires; a point that never had lines stays live as
    /// blocking geometry.
    ever_connected: bool,
}

impl FrontPoint {
    /// Whether the point still participates in the front.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.line_count > 0 || !self.ever_connected
    }

    /// Number of live front lines referencing this point.
    #[must_use]
    pub fn line_count(&self) -> u32 {
        self.line_count
    }
}

/// An active boundary segment of the front.
///
/// Oriented so the unmeshed domain lies to the left of `points[0]` →
/// `points[1]`.
#[derive(Debug, Clone)]
pub struct FrontLine {
    /// Front point ids of the two endpoints, in orientation order.
    pub points: [u32; 2],
    /// Chart placement info per endpoint, valid for the chart that was
    /// active when the segment was created.
    pub geom_info: [ChartPointInfo; 2],
    /// Quality class: 1 plus the number of failed advancement attempts.
    pub class: u32,
    /// Insertion stamp, monotonically increasing; used as the oldest-first
    /// selection tiebreak.
    pub stamp: u64,
}

/// Result of [`AdvancingFront::add_line`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddLineOutcome {
    /// The segment was inserted under the returned line id.
    Inserted(usize),
    /// The reverse segment was already active; both were removed.
    Cancelled,
}

/// The advancing front data structure.
///
/// See the [crate docs](crate) for the role it plays in generation.
#[derive(Debug, Default)]
pub struct AdvancingFront {
    points: Vec<FrontPoint>,
    lines: Vec<Option<FrontLine>>,
    free_slots: Vec<usize>,
    /// Oriented endpoint pair → line slot, for inverse cancellation.
    lookup: HashMap<(u32, u32), usize>,
    active: usize,
    next_stamp: u64,
}

impl AdvancingFront {
    /// Create an empty front.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a boundary point and return its front point id.
    ///
    /// `global` is the point's index in the mesh the front advances into.
    /// `multi_info` carries candidate chart placements for seam points;
    /// `on_surface = false` marks interior seed points that block geometry
    /// but must not become element corners.
    #[allow(clippy::cast_possible_truncation)] // front point tables stay far below u32::MAX
    pub fn add_point(
        &mut self,
        position: Point3<f64>,
        global: u32,
        multi_info: Option<MultiChartInfo>,
        on_surface: bool,
    ) -> u32 {
        self.points.push(FrontPoint {
            position,
            global,
            multi_info,
            on_surface,
            line_count: 0,
            ever_connected: false,
        });
        (self.points.len() - 1) as u32
    }

    /// Insert an oriented segment, or cancel it against its reverse.
    ///
    /// If the reverse segment `(p2, p1)` is active, both segments vanish and
    /// nothing is inserted: the two fronts have met along this edge.
    ///
    /// # Panics
    ///
    /// Panics if an endpoint id was never registered via
    /// [`AdvancingFront::add_point`].
    pub fn add_line(
        &mut self,
        p1: u32,
        p2: u32,
        gi1: ChartPointInfo,
        gi2: ChartPointInfo,
    ) -> AddLineOutcome {
        assert!((p1 as usize) < self.points.len() && (p2 as usize) < self.points.len());

        if let Some(&reverse) = self.lookup.get(&(p2, p1)) {
            debug!(p1, p2, "segment cancels against its reverse");
            self.delete_line(reverse);
            return AddLineOutcome::Cancelled;
        }
        let duplicate = self.lookup.contains_key(&(p1, p2));
        if duplicate {
            // Caller error; keep reference counts consistent, but only the
            // first copy pairs for cancellation.
            warn!(p1, p2, "duplicate front segment inserted");
        }

        let line = FrontLine {
            points: [p1, p2],
            geom_info: [gi1, gi2],
            class: 1,
            stamp: self.next_stamp,
        };
        self.next_stamp += 1;

        let slot = match self.free_slots.pop() {
            Some(slot) => {
                self.lines[slot] = Some(line);
                slot
            }
            None => {
                self.lines.push(Some(line));
                self.lines.len() - 1
            }
        };
        if !duplicate {
            self.lookup.insert((p1, p2), slot);
        }
        self.active += 1;
        for id in [p1, p2] {
            let point = &mut self.points[id as usize];
            point.line_count += 1;
            point.ever_connected = true;
        }
        AddLineOutcome::Inserted(slot)
    }

    /// Retract a segment, releasing its endpoints' references.
    ///
    /// # Panics
    ///
    /// Panics if `line` is not a live segment.
    pub fn delete_line(&mut self, line: usize) {
        let removed = self.lines[line]
            .take()
            .unwrap_or_else(|| panic!("delete of dead front line {line}"));
        let key = (removed.points[0], removed.points[1]);
        if self.lookup.get(&key) == Some(&line) {
            self.lookup.remove(&key);
        }
        self.free_slots.push(line);
        self.active -= 1;
        for id in removed.points {
            self.points[id as usize].line_count -= 1;
        }
    }

    /// The live segment stored under `line`, if any.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<&FrontLine> {
        self.lines.get(line).and_then(Option::as_ref)
    }

    /// The front point registered under `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was never registered.
    #[must_use]
    pub fn point(&self, id: u32) -> &FrontPoint {
        &self.points[id as usize]
    }

    /// Number of active segments.
    #[must_use]
    pub fn active_line_count(&self) -> usize {
        self.active
    }

    /// Whether no segments remain: generation is complete.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active == 0
    }

    /// The lowest quality class among active segments.
    #[must_use]
    pub fn min_line_class(&self) -> Option<u32> {
        self.live_lines().map(|(_, l)| l.class).min()
    }

    /// Increment a segment's quality class after a failed advancement.
    ///
    /// # Panics
    ///
    /// Panics if `line` is not a live segment.
    pub fn increment_class(&mut self, line: usize) {
        match self.lines.get_mut(line).and_then(Option::as_mut) {
            Some(l) => l.class += 1,
            None => panic!("class increment on dead front line {line}"),
        }
    }

    /// Whether every front point balances incoming and outgoing segments.
    ///
    /// A closed (possibly multiply-connected) boundary has equal in- and
    /// out-degree at every point; anything else cannot be meshed to
    /// completion.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        let mut balance: HashMap<u32, i64> = HashMap::new();
        for (_, line) in self.live_lines() {
            *balance.entry(line.points[0]).or_default() += 1;
            *balance.entry(line.points[1]).or_default() -= 1;
        }
        balance.values().all(|&b| b == 0)
    }

    /// Select the next base segment, or `None` when the front is empty.
    pub fn select_base_line(&self, strategy: SelectionStrategy) -> Option<BaseLine> {
        let mut best: Option<(u64, usize, &FrontLine)> = None;
        for (slot, line) in self.live_lines() {
            let tiebreak = match strategy {
                SelectionStrategy::QualityClass => line.stamp,
                SelectionStrategy::Shortest => {
                    let len = (self.points[line.points[1] as usize].position
                        - self.points[line.points[0] as usize].position)
                        .norm();
                    // Order lengths through their bit pattern; front segment
                    // lengths are finite and non-negative.
                    len.to_bits()
                }
            };
            let better = match best {
                None => true,
                Some((best_tie, _, best_line)) => {
                    (line.class, tiebreak) < (best_line.class, best_tie)
                }
            };
            if better {
                best = Some((tiebreak, slot, line));
            }
        }
        best.map(|(_, slot, line)| BaseLine {
            id: slot,
            points: line.points,
            geom_info: line.geom_info,
            class: line.class,
        })
    }

    /// Collect the local neighborhood of a base segment.
    ///
    /// Returns every live point within `block_radius` of the base segment's
    /// midpoint, and every segment with at least one endpoint in that range.
    /// Points inside `match_radius` are matchable by rules; points beyond it
    /// (and off-surface seeds) only block free zones. The base segment is
    /// always `lines[0]` with its endpoints at point indices 0 and 1.
    ///
    /// # Panics
    ///
    /// Panics if `base` is not a live segment.
    pub fn collect_locals(
        &self,
        base: usize,
        match_radius: f64,
        block_radius: f64,
    ) -> LocalEnvironment {
        let base_line = match self.line(base) {
            Some(l) => l,
            None => panic!("neighborhood of dead front line {base}"),
        };
        let mid = nalgebra::center(
            &self.points[base_line.points[0] as usize].position,
            &self.points[base_line.points[1] as usize].position,
        );
        let block_radius = block_radius.max(match_radius);

        let mut env = LocalEnvironment::default();
        let mut local_index: HashMap<u32, usize> = HashMap::new();

        let mut intern = |env: &mut LocalEnvironment, front_id: u32| -> usize {
            *local_index.entry(front_id).or_insert_with(|| {
                let point = &self.points[front_id as usize];
                let dist = (point.position - mid).norm();
                env.points.push(LocalPoint {
                    front_id,
                    position: point.position,
                    on_surface: point.on_surface,
                    matchable: point.on_surface && dist <= match_radius,
                    multi_info: point.multi_info.clone(),
                });
                env.points.len() - 1
            })
        };

        // Base segment first, endpoints at local indices 0 and 1.
        intern(&mut env, base_line.points[0]);
        intern(&mut env, base_line.points[1]);
        env.lines.push(LocalLine {
            line_id: base,
            ends: [0, 1],
            geom_info: base_line.geom_info,
        });

        for (slot, line) in self.live_lines() {
            if slot == base {
                continue;
            }
            let near = line.points.iter().any(|&p| {
                (self.points[p as usize].position - mid).norm() <= block_radius
            });
            if !near {
                continue;
            }
            let a = intern(&mut env, line.points[0]);
            let b = intern(&mut env, line.points[1]);
            env.lines.push(LocalLine {
                line_id: slot,
                ends: [a, b],
                geom_info: line.geom_info,
            });
        }

        // Lone live points (interior seeds, unconnected boundary points)
        // within range still block free zones.
        for (id, point) in self.points.iter().enumerate() {
            if point.line_count == 0
                && point.is_live()
                && (point.position - mid).norm() <= block_radius
            {
                #[allow(clippy::cast_possible_truncation)]
                intern(&mut env, id as u32);
            }
        }

        env
    }

    fn live_lines(&self) -> impl Iterator<Item = (usize, &FrontLine)> {
        self.lines
            .iter()
            .enumerate()
            .filter_map(|(slot, line)| line.as_ref().map(|l| (slot, l)))
    }
}
