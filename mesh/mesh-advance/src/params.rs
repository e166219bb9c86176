//! Generation parameters.

use mesh_front::SelectionStrategy;

use crate::error::{MeshingError, MeshingResult};

/// Parameters for one mesh generation run.
///
/// The escalation schedule and budgets are tunables, not a correctness
/// contract: the defaults below terminate on well-posed inputs, and harder
/// domains may need a higher tolerance cap or failure budget.
#[derive(Debug, Clone, Copy)]
pub struct MeshingParams {
    /// Highest tolerance level rule matching may escalate to.
    ///
    /// A front segment that failed `n` times is matched at level `n + 1`
    /// (capped here); higher levels grow point tolerances and relax free
    /// zones, trading element quality for termination.
    pub max_tolerance: u32,

    /// Failure budget per front segment before the run gives up.
    ///
    /// When even the best remaining segment has failed this many times,
    /// generation stops with [`MeshingOutcome::GaveUp`](crate::MeshingOutcome).
    pub giveup_failures: u32,

    /// Neighborhood radius as a multiple of the local mesh size; the
    /// radius additionally grows with the tolerance level, so repeated
    /// failures search a wider area.
    pub neighborhood_factor: f64,

    /// How far the working mesh size may deviate from the base segment
    /// length (as a fraction): the sizing target is clamped to
    /// `[len / (1 + grading), len * (1 + grading)]`.
    pub grading: f64,

    /// Base segment selection policy.
    pub strategy: SelectionStrategy,

    /// Global cap on advancement attempts; `None` derives
    /// `10_000 + 50 * initial_front_lines`. A backstop against runaway
    /// fronts on malformed input.
    pub attempt_budget: Option<usize>,
}

impl Default for MeshingParams {
    fn default() -> Self {
        Self {
            max_tolerance: 3,
            giveup_failures: 20,
            neighborhood_factor: 3.0,
            grading: 0.3,
            strategy: SelectionStrategy::QualityClass,
            attempt_budget: None,
        }
    }
}

impl MeshingParams {
    /// Parameters with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tolerance cap.
    #[must_use]
    pub const fn with_max_tolerance(mut self, max_tolerance: u32) -> Self {
        self.max_tolerance = max_tolerance;
        self
    }

    /// Set the per-segment failure budget.
    #[must_use]
    pub const fn with_giveup_failures(mut self, giveup_failures: u32) -> Self {
        self.giveup_failures = giveup_failures;
        self
    }

    /// Set the neighborhood radius factor.
    #[must_use]
    pub const fn with_neighborhood_factor(mut self, factor: f64) -> Self {
        self.neighborhood_factor = factor;
        self
    }

    /// Set the mesh size grading bound.
    #[must_use]
    pub const fn with_grading(mut self, grading: f64) -> Self {
        self.grading = grading;
        self
    }

    /// Set the base segment selection strategy.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set an explicit attempt budget.
    #[must_use]
    pub const fn with_attempt_budget(mut self, budget: usize) -> Self {
        self.attempt_budget = Some(budget);
        self
    }

    /// Check the parameters for constructive misuse.
    ///
    /// # Errors
    ///
    /// Returns the first [`MeshingError`] among: zero tolerance cap, zero
    /// failure budget, non-positive neighborhood factor, negative or
    /// non-finite grading.
    pub fn validate(&self) -> MeshingResult<()> {
        if self.max_tolerance < 1 {
            return Err(MeshingError::InvalidTolerance(self.max_tolerance));
        }
        if self.giveup_failures < 1 {
            return Err(MeshingError::InvalidFailureBudget(self.giveup_failures));
        }
        if !(self.neighborhood_factor > 0.0) || !self.neighborhood_factor.is_finite() {
            return Err(MeshingError::InvalidNeighborhoodFactor(
                self.neighborhood_factor,
            ));
        }
        if !(self.grading >= 0.0) || !self.grading.is_finite() {
            return Err(MeshingError::InvalidGrading(self.grading));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(MeshingParams::default().validate().is_ok());
    }

    #[test]
    fn builder_round_trip() {
        let params = MeshingParams::new()
            .with_max_tolerance(5)
            .with_giveup_failures(8)
            .with_neighborhood_factor(2.5)
            .with_strategy(SelectionStrategy::Shortest)
            .with_attempt_budget(123);
        assert_eq!(params.max_tolerance, 5);
        assert_eq!(params.giveup_failures, 8);
        assert_eq!(params.strategy, SelectionStrategy::Shortest);
        assert_eq!(params.attempt_budget, Some(123));
    }

    #[test]
    fn bad_values_are_rejected() {
        assert_eq!(
            MeshingParams::new().with_max_tolerance(0).validate(),
            Err(MeshingError::InvalidTolerance(0))
        );
        assert_eq!(
            MeshingParams::new().with_giveup_failures(0).validate(),
            Err(MeshingError::InvalidFailureBudget(0))
        );
        assert!(MeshingParams::new()
            .with_neighborhood_factor(0.0)
            .validate()
            .is_err());
        assert!(MeshingParams::new().with_grading(-1.0).validate().is_err());
    }
}
