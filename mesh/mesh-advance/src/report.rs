//! Generation outcome and statistics.

/// How a generation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshingOutcome {
    /// The front was advanced to empty: the mesh covers the whole domain
    /// delimited by the input boundary.
    Completed,

    /// A budget was exhausted before the front emptied. The mesh is
    /// partially extended and internally consistent, but callers must not
    /// assume closure.
    GaveUp,
}

/// Usage counters for one rule over a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleUsage {
    /// Rule name, as declared in the library.
    pub name: String,
    /// How often the rule's pattern matched a neighborhood.
    pub matched: u64,
    /// How often a match passed every admissibility check.
    pub usable: u64,
    /// How often the rule's replacement was committed.
    pub applied: u64,
}

/// Result of one generation run.
#[derive(Debug, Clone)]
pub struct MeshingReport {
    /// How the run ended.
    pub outcome: MeshingOutcome,
    /// Points appended to the mesh.
    pub points_created: usize,
    /// Elements appended to the mesh.
    pub elements_created: usize,
    /// Front advancement attempts, successful or not.
    pub attempts: usize,
    /// Attempts that failed to advance their base segment.
    pub failed_attempts: usize,
    /// Total area of the committed elements, in model units.
    pub meshed_area: f64,
    /// Per-rule usage, parallel to the rule library.
    pub rule_usage: Vec<RuleUsage>,
}

impl MeshingReport {
    /// Whether the run covered the whole domain.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.outcome == MeshingOutcome::Completed
    }

    /// The most frequently applied rule, if any rule was applied.
    #[must_use]
    pub fn dominant_rule(&self) -> Option<&RuleUsage> {
        self.rule_usage
            .iter()
            .filter(|usage| usage.applied > 0)
            .max_by_key(|usage| usage.applied)
    }
}

impl std::fmt::Display for MeshingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} elements, {} points in {} attempts ({} failed)",
            match self.outcome {
                MeshingOutcome::Completed => "completed",
                MeshingOutcome::GaveUp => "gave up",
            },
            self.elements_created,
            self.points_created,
            self.attempts,
            self.failed_attempts,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> MeshingReport {
        MeshingReport {
            outcome: MeshingOutcome::Completed,
            points_created: 7,
            elements_created: 18,
            attempts: 25,
            failed_attempts: 4,
            meshed_area: 16.0,
            rule_usage: vec![
                RuleUsage {
                    name: "close triangle".into(),
                    matched: 3,
                    usable: 2,
                    applied: 2,
                },
                RuleUsage {
                    name: "free triangle".into(),
                    matched: 20,
                    usable: 16,
                    applied: 16,
                },
            ],
        }
    }

    #[test]
    fn completion_flag() {
        assert!(report().is_complete());
        let gave_up = MeshingReport {
            outcome: MeshingOutcome::GaveUp,
            ..report()
        };
        assert!(!gave_up.is_complete());
    }

    #[test]
    fn dominant_rule_by_applications() {
        let report = report();
        assert_eq!(
            report.dominant_rule().map(|u| u.name.as_str()),
            Some("free triangle")
        );
    }

    #[test]
    fn display_summary() {
        let text = format!("{}", report());
        assert!(text.contains("completed"));
        assert!(text.contains("18 elements"));
    }
}
