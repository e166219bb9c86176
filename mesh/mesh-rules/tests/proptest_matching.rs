//! Property-based tests for the rule matching engine.
//!
//! Random neighborhoods are thrown at the engine to pin down two spec-level
//! guarantees: escalating the tolerance level never loses a match, and
//! matching is deterministic for identical input.

use mesh_rules::{
    apply_rules, match_rule, standard_triangle_rules, MatchOptions, PlainEnvironment, PlainLine,
    PlainPoint, RuleLibrary, RuleStats,
};
use nalgebra::Point2;
use proptest::prelude::*;

/// A base segment plus up to three extra matchable points, optionally with
/// a segment chaining off the base's right end.
fn arb_environment() -> impl Strategy<Value = PlainEnvironment> {
    let extra = prop::collection::vec((-2.0..2.0f64, -2.0..2.0f64), 0..3);
    (extra, any::<bool>()).prop_map(|(extra, chain)| {
        let mut points = vec![
            PlainPoint {
                position: Point2::new(0.0, 0.0),
                matchable: true,
            },
            PlainPoint {
                position: Point2::new(1.0, 0.0),
                matchable: true,
            },
        ];
        points.extend(extra.iter().map(|&(x, y)| PlainPoint {
            position: Point2::new(x, y),
            matchable: true,
        }));

        let mut lines = vec![PlainLine { ends: [0, 1] }];
        if chain && points.len() > 2 {
            lines.push(PlainLine { ends: [1, 2] });
        }
        PlainEnvironment { points, lines }
    })
}

proptest! {
    #[test]
    fn tolerance_escalation_never_loses_a_match(env in arb_environment()) {
        let options = MatchOptions::default();
        for rule in standard_triangle_rules() {
            for level in 1..3u32 {
                if match_rule(&env, &rule, level, &options).is_some() {
                    prop_assert!(
                        match_rule(&env, &rule, level + 1, &options).is_some(),
                        "rule '{}' matched at level {} but not at {}",
                        rule.name,
                        level,
                        level + 1,
                    );
                }
            }
        }
    }

    #[test]
    fn rule_selection_is_deterministic(env in arb_environment(), tolerance in 1..4u32) {
        let library = RuleLibrary::standard();
        let options = MatchOptions::default();
        let excluded = vec![false; library.len()];

        let mut stats = RuleStats::new(library.len());
        let first = apply_rules(&env, &library, tolerance, &options, &excluded, &mut stats);
        let mut stats = RuleStats::new(library.len());
        let second = apply_rules(&env, &library, tolerance, &options, &excluded, &mut stats);

        prop_assert_eq!(first, second);
    }

    #[test]
    fn area_cap_is_respected(env in arb_environment(), cap in 0.05..1.0f64) {
        let library = RuleLibrary::standard();
        let options = MatchOptions {
            max_element_area: Some(cap),
            ..MatchOptions::default()
        };
        let excluded = vec![false; library.len()];
        let mut stats = RuleStats::new(library.len());

        if let Some(application) =
            apply_rules(&env, &library, 3, &options, &excluded, &mut stats)
        {
            // Reconstruct each element's plain polygon and check its area.
            let position = |r: mesh_rules::LocalRef| match r {
                mesh_rules::LocalRef::Point(i) => env.points[i].position,
                mesh_rules::LocalRef::NewPoint(j) => application.new_points[j],
            };
            for element in &application.elements {
                let polygon: Vec<Point2<f64>> =
                    element.corners.iter().map(|&c| position(c)).collect();
                let area = mesh_rules::geom::signed_area(&polygon);
                prop_assert!(area <= cap + 1e-12);
            }
        }
    }
}
