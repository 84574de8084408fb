use super::error::ScaleError;
use super::model::{GradeDefinition, GradeRange, MAX_PERCENT, MIN_PERCENT};

/// Map a percentage to its tier in a validated definition.
///
/// Marks outside 0..=100 are rejected rather than clamped. Zero or multiple
/// matching tiers means the definition skipped validation.
pub fn resolve(definition: &GradeDefinition, mark: f64) -> Result<&GradeRange, ScaleError> {
    check_domain(mark)?;

    let mut found: Option<&GradeRange> = None;
    let mut matches = 0usize;
    for range in &definition.grade_ranges {
        if range.contains(mark) {
            matches += 1;
            found.get_or_insert(range);
        }
    }

    match (found, matches) {
        (Some(range), 1) => Ok(range),
        _ => Err(ScaleError::CorruptDefinition { mark, matches }),
    }
}

fn check_domain(mark: f64) -> Result<(), ScaleError> {
    if !mark.is_finite() || mark < MIN_PERCENT as f64 || mark > MAX_PERCENT as f64 {
        return Err(ScaleError::OutOfDomain { mark });
    }
    Ok(())
}

/// Resolve with optional half-up rounding, returning the mark actually used.
///
/// The domain check runs on the raw mark, so rounding never pulls -0.4 or
/// 100.4 back into range.
pub fn resolve_rounded<'a>(
    definition: &'a GradeDefinition,
    mark: f64,
    round: bool,
) -> Result<(f64, &'a GradeRange), ScaleError> {
    check_domain(mark)?;
    let effective = if round { round_mark(mark) } else { mark };
    Ok((effective, resolve(definition, effective)?))
}

/// Resolve each mark in order, stopping at the first failure.
pub fn resolve_many<'a>(
    definition: &'a GradeDefinition,
    marks: &[f64],
    round: bool,
) -> Result<Vec<(f64, &'a GradeRange)>, ScaleError> {
    marks
        .iter()
        .map(|m| resolve_rounded(definition, *m, round))
        .collect()
}

/// Round half up to a whole percentage.
pub fn round_mark(mark: f64) -> f64 {
    (mark + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::lifecycle::instantiate_template;
    use crate::scale::model::Origin;
    use proptest::prelude::*;

    fn cbse() -> GradeDefinition {
        let out = instantiate_template(&[], "cbse", None, None, false).expect("cbse");
        out.definitions.into_iter().next().expect("one definition")
    }

    fn custom(ranges: Vec<GradeRange>) -> GradeDefinition {
        GradeDefinition {
            id: "x".into(),
            name: "X".into(),
            code: "X".into(),
            description: None,
            is_default: false,
            origin: Origin::Custom,
            template_id: None,
            grade_ranges: ranges,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn cbse_boundaries_resolve_to_expected_tiers() {
        let def = cbse();
        let top = resolve(&def, 95.0).expect("95");
        assert_eq!((top.grade.as_str(), top.grade_point), ("A+", 10.0));
        let lower_edge = resolve(&def, 91.0).expect("91");
        assert_eq!((lower_edge.grade.as_str(), lower_edge.grade_point), ("A+", 10.0));
        let next = resolve(&def, 90.0).expect("90");
        assert_eq!((next.grade.as_str(), next.grade_point), ("A", 9.0));
        assert_eq!(resolve(&def, 0.0).expect("0").grade, "E");
        assert_eq!(resolve(&def, 33.0).expect("33").grade, "E");
        assert_eq!(resolve(&def, 34.0).expect("34").grade, "D");
        assert_eq!(resolve(&def, 100.0).expect("100").grade, "A+");
    }

    #[test]
    fn fractional_mark_stays_in_lower_tier() {
        let def = cbse();
        assert_eq!(resolve(&def, 90.5).expect("90.5").grade, "A");
        assert_eq!(resolve(&def, 33.9).expect("33.9").grade, "E");
    }

    #[test]
    fn out_of_domain_marks_are_rejected() {
        let def = cbse();
        assert_eq!(
            resolve(&def, -0.5),
            Err(ScaleError::OutOfDomain { mark: -0.5 })
        );
        assert!(matches!(
            resolve(&def, 100.01),
            Err(ScaleError::OutOfDomain { .. })
        ));
        assert!(matches!(
            resolve(&def, f64::NAN),
            Err(ScaleError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn unvalidated_gap_and_overlap_are_reported_as_corrupt() {
        let gap = custom(vec![
            GradeRange::new("F", 0, 50, 0.0),
            GradeRange::new("P", 52, 100, 1.0),
        ]);
        assert_eq!(
            resolve(&gap, 51.0),
            Err(ScaleError::CorruptDefinition {
                mark: 51.0,
                matches: 0
            })
        );

        let overlap = custom(vec![
            GradeRange::new("F", 0, 60, 0.0),
            GradeRange::new("P", 50, 100, 1.0),
        ]);
        assert_eq!(
            resolve(&overlap, 55.0),
            Err(ScaleError::CorruptDefinition {
                mark: 55.0,
                matches: 2
            })
        );
    }

    #[test]
    fn resolve_many_stops_at_first_bad_mark() {
        let def = cbse();
        let ok = resolve_many(&def, &[95.0, 62.0, 10.0], false).expect("all valid");
        let grades: Vec<&str> = ok.iter().map(|(_, r)| r.grade.as_str()).collect();
        assert_eq!(grades, vec!["A+", "B", "E"]);
        assert!(matches!(
            resolve_many(&def, &[95.0, 101.0], false),
            Err(ScaleError::OutOfDomain { .. })
        ));
        assert!(matches!(
            resolve_many(&def, &[95.0, 100.2], true),
            Err(ScaleError::OutOfDomain { .. })
        ));
    }

    #[test]
    fn rounding_does_not_pull_outside_marks_into_range() {
        let def = cbse();
        assert_eq!(
            resolve_rounded(&def, -0.4, true),
            Err(ScaleError::OutOfDomain { mark: -0.4 })
        );
        assert_eq!(
            resolve_rounded(&def, 100.4, true),
            Err(ScaleError::OutOfDomain { mark: 100.4 })
        );

        let (used, top) = resolve_rounded(&def, 99.6, true).expect("99.6");
        assert_eq!((used, top.grade.as_str()), (100.0, "A+"));
        let (used, a) = resolve_rounded(&def, 90.6, false).expect("90.6");
        assert_eq!((used, a.grade.as_str()), (90.6, "A"));
        let (used, edge) = resolve_rounded(&def, 90.5, true).expect("90.5");
        assert_eq!((used, edge.grade.as_str()), (91.0, "A+"));
    }

    #[test]
    fn round_mark_is_half_up() {
        assert_eq!(round_mark(90.5), 91.0);
        assert_eq!(round_mark(90.49), 90.0);
        assert_eq!(round_mark(0.0), 0.0);
    }

    fn cut_points() -> impl Strategy<Value = Vec<i64>> {
        prop::collection::btree_set(1i64..=100, 0..12).prop_map(|s| s.into_iter().collect())
    }

    fn ranges_from_cuts(cuts: &[i64]) -> Vec<GradeRange> {
        let mut starts = vec![0i64];
        starts.extend_from_slice(cuts);
        starts
            .iter()
            .enumerate()
            .map(|(i, lo)| {
                let hi = starts.get(i + 1).map(|n| n - 1).unwrap_or(100);
                GradeRange::new(&format!("G{i}"), *lo, hi, i as f64)
            })
            .collect()
    }

    proptest! {
        #[test]
        fn every_integer_mark_resolves_to_exactly_one_tier(cuts in cut_points()) {
            let mut ranges = ranges_from_cuts(&cuts);
            ranges.reverse();
            let out = crate::scale::lifecycle::create(
                &[],
                &crate::scale::model::DefinitionInput::new("P", "P", ranges),
                false,
            ).expect("generated tiling is valid");
            let def = &out.definitions[0];
            for m in 0..=100i64 {
                let hit = resolve(def, m as f64).expect("covered");
                prop_assert!(hit.min_marks <= m && m <= hit.max_marks);
            }
        }

        #[test]
        fn tier_boundaries_round_trip(cuts in cut_points()) {
            let ranges = ranges_from_cuts(&cuts);
            let out = crate::scale::lifecycle::create(
                &[],
                &crate::scale::model::DefinitionInput::new("P", "P", ranges),
                false,
            ).expect("valid");
            let def = &out.definitions[0];
            for tier in &def.grade_ranges {
                prop_assert_eq!(&resolve(def, tier.min_marks as f64).expect("min").grade, &tier.grade);
                prop_assert_eq!(&resolve(def, tier.max_marks as f64).expect("max").grade, &tier.grade);
            }
            for pair in def.grade_ranges.windows(2) {
                prop_assert!(pair[0].max_marks < pair[1].min_marks);
            }
        }
    }
}
