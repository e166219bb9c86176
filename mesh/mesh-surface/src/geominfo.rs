//! Chart-relative placement metadata for points on parametrized surfaces.

use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Placement of a point on one chart of a (possibly multi-chart) surface.
///
/// A `ChartPointInfo` records which chart a point was placed on and its
/// parameter coordinates there. The value is meaningful only relative to the
/// chart that was active when it was computed: before reusing stored info
/// under a different active chart it must be re-validated (see the driver's
/// `belongs_to_active_chart` protocol call).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChartPointInfo {
    /// Identifier of the chart this placement refers to.
    pub chart: u32,
    /// First parameter coordinate on the chart.
    pub u: f64,
    /// Second parameter coordinate on the chart.
    pub v: f64,
}

impl ChartPointInfo {
    /// Create placement info for a chart.
    #[inline]
    #[must_use]
    pub const fn new(chart: u32, u: f64, v: f64) -> Self {
        Self { chart, u, v }
    }
}

/// All candidate chart placements of a point before a unique chart is chosen.
///
/// Points on chart seams (e.g. where two parametrization patches meet) are
/// representable on more than one chart. A `MultiChartInfo` aggregates every
/// candidate placement; the active chart picks one of them during
/// generation, or reports ambiguity if it cannot.
///
/// # Example
///
/// ```
/// use mesh_surface::{ChartPointInfo, MultiChartInfo};
///
/// let mut multi = MultiChartInfo::new();
/// multi.push(ChartPointInfo::new(0, 0.25, 0.5));
/// multi.push(ChartPointInfo::new(3, 0.0, 0.5));
///
/// assert_eq!(multi.len(), 2);
/// assert!(multi.on_chart(3).is_some());
/// assert!(multi.on_chart(7).is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiChartInfo {
    candidates: SmallVec<[ChartPointInfo; 4]>,
}

impl MultiChartInfo {
    /// Create an empty candidate set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a candidate set holding a single placement.
    #[must_use]
    pub fn single(info: ChartPointInfo) -> Self {
        let mut candidates = SmallVec::new();
        candidates.push(info);
        Self { candidates }
    }

    /// Add a candidate placement.
    pub fn push(&mut self, info: ChartPointInfo) {
        self.candidates.push(info);
    }

    /// Number of candidate placements.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidates.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Iterate over the candidate placements.
    pub fn iter(&self) -> impl Iterator<Item = &ChartPointInfo> {
        self.candidates.iter()
    }

    /// The placement on a specific chart, if the point has one.
    #[must_use]
    pub fn on_chart(&self, chart: u32) -> Option<&ChartPointInfo> {
        self.candidates.iter().find(|c| c.chart == chart)
    }
}

impl<'a> IntoIterator for &'a MultiChartInfo {
    type Item = &'a ChartPointInfo;
    type IntoIter = std::slice::Iter<'a, ChartPointInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

impl FromIterator<ChartPointInfo> for MultiChartInfo {
    fn from_iter<I: IntoIterator<Item = ChartPointInfo>>(iter: I) -> Self {
        Self {
            candidates: iter.into_iter().collect(),
        }
    }
}
