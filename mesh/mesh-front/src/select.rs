//! Base segment selection.

use mesh_surface::ChartPointInfo;

/// Policy for picking the next segment to advance.
///
/// Both strategies first prefer the lowest quality class, so segments that
/// keep failing are revisited only once everything easier is exhausted and
/// the giveup accounting stays meaningful; they differ in the tiebreak.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionStrategy {
    /// Lowest class, oldest segment first. The default: deterministic,
    /// breadth-first advancement around the boundary.
    #[default]
    QualityClass,
    /// Lowest class, shortest segment first. Biases toward convex,
    /// easy-to-close regions and reduces worst-case element size variance.
    Shortest,
}

/// The segment chosen to advance from, with what the driver needs to anchor
/// the local frame.
#[derive(Debug, Clone, Copy)]
pub struct BaseLine {
    /// Front line id, for retraction and class bookkeeping.
    pub id: usize,
    /// Front point ids of the endpoints, in orientation order.
    pub points: [u32; 2],
    /// Chart placement info per endpoint.
    pub geom_info: [ChartPointInfo; 2],
    /// The segment's current quality class.
    pub class: u32,
}
