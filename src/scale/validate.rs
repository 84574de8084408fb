use std::cmp::Ordering;
use std::collections::HashSet;

use super::error::{ScaleError, Warning};
use super::model::{GradeDefinition, GradeRange, MAX_PERCENT, MIN_PERCENT};

/// A candidate that passed validation: trimmed name, ranges sorted by `min_marks`.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedDefinition {
    pub name: String,
    pub grade_ranges: Vec<GradeRange>,
    pub warnings: Vec<Warning>,
}

/// Check that `ranges` tile 0..=100 exactly, as closed integer intervals.
///
/// Pure: nothing is stored. Grade-point inversions come back as warnings on the
/// `Ok` value and never fail the call.
pub fn validate(name: &str, ranges: &[GradeRange]) -> Result<NormalizedDefinition, ScaleError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ScaleError::validation("name must not be empty", &[]));
    }
    if ranges.is_empty() {
        return Err(ScaleError::validation(
            "at least one grade range is required",
            &[],
        ));
    }

    let mut seen: HashSet<String> = HashSet::new();
    for r in ranges {
        let grade = r.grade.trim();
        if grade.is_empty() {
            return Err(ScaleError::validation("grade label must not be empty", &[r]));
        }
        if !seen.insert(grade.to_string()) {
            let dupes: Vec<&GradeRange> =
                ranges.iter().filter(|o| o.grade.trim() == grade).collect();
            return Err(ScaleError::validation(
                format!("grade {} is used by more than one range", grade),
                &dupes,
            ));
        }
        if r.min_marks < MIN_PERCENT || r.max_marks > MAX_PERCENT {
            return Err(ScaleError::validation(
                format!("range {} must lie within 0-100", r.label()),
                &[r],
            ));
        }
        if r.min_marks > r.max_marks {
            return Err(ScaleError::validation(
                format!("range {} has minMarks greater than maxMarks", r.label()),
                &[r],
            ));
        }
        if !r.grade_point.is_finite() || r.grade_point < 0.0 {
            return Err(ScaleError::validation(
                format!("grade point for {} must be a non-negative number", grade),
                &[r],
            ));
        }
    }

    let mut sorted: Vec<GradeRange> = ranges
        .iter()
        .map(|r| GradeRange {
            grade: r.grade.trim().to_string(),
            description: r
                .description
                .as_ref()
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            ..r.clone()
        })
        .collect();
    sorted.sort_by(|a, b| {
        a.min_marks
            .cmp(&b.min_marks)
            .then(a.max_marks.cmp(&b.max_marks))
    });

    check_coverage(&sorted)?;

    Ok(NormalizedDefinition {
        name: name.to_string(),
        warnings: grade_point_warnings(&sorted),
        grade_ranges: sorted,
    })
}

/// Walk ranges sorted by `min_marks` and require exact `+1` succession from 0 to 100.
fn check_coverage(sorted: &[GradeRange]) -> Result<(), ScaleError> {
    let (Some(first), Some(last)) = (sorted.first(), sorted.last()) else {
        return Err(ScaleError::validation(
            "at least one grade range is required",
            &[],
        ));
    };
    if first.min_marks != MIN_PERCENT {
        return Err(ScaleError::validation(
            format!(
                "ranges must start at 0 (lowest range {} starts at {})",
                first.grade, first.min_marks
            ),
            &[first],
        ));
    }

    for pair in sorted.windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);
        let expected = prev.max_marks + 1;
        match next.min_marks.cmp(&expected) {
            Ordering::Equal => {}
            Ordering::Greater => {
                let gap = if next.min_marks - 1 == expected {
                    expected.to_string()
                } else {
                    format!("{}-{}", expected, next.min_marks - 1)
                };
                return Err(ScaleError::validation(
                    format!(
                        "gap between {} and {}: {} is not covered",
                        prev.label(),
                        next.label(),
                        gap
                    ),
                    &[prev, next],
                ));
            }
            Ordering::Less => {
                let overlap_hi = prev.max_marks.min(next.max_marks);
                return Err(ScaleError::validation(
                    format!(
                        "{} and {} overlap on {}-{}",
                        prev.label(),
                        next.label(),
                        next.min_marks,
                        overlap_hi
                    ),
                    &[prev, next],
                ));
            }
        }
    }

    if last.max_marks != MAX_PERCENT {
        return Err(ScaleError::validation(
            format!(
                "ranges must end at 100 (highest range {} ends at {})",
                last.grade, last.max_marks
            ),
            &[last],
        ));
    }
    Ok(())
}

/// Pairs of adjacent tiers where the lower band carries the higher grade point.
pub fn grade_point_warnings(sorted: &[GradeRange]) -> Vec<Warning> {
    sorted
        .windows(2)
        .filter(|pair| pair[0].grade_point > pair[1].grade_point)
        .map(|pair| Warning::GradePointInversion {
            lower_grade: pair[0].grade.clone(),
            higher_grade: pair[1].grade.clone(),
        })
        .collect()
}

/// Soft uniqueness: `code` should not repeat within a school's set.
pub fn code_warnings(
    definitions: &[GradeDefinition],
    code: &str,
    exclude_id: Option<&str>,
) -> Vec<Warning> {
    let code = code.trim();
    if code.is_empty() {
        return Vec::new();
    }
    let clash = definitions.iter().any(|d| {
        Some(d.id.as_str()) != exclude_id && d.code.trim().eq_ignore_ascii_case(code)
    });
    if clash {
        vec![Warning::DuplicateCode {
            code: code.to_string(),
        }]
    } else {
        Vec::new()
    }
}
