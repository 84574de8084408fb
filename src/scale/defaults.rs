use super::error::ScaleError;
use super::model::GradeDefinition;

/// Return a copy of `definitions` where only `target_id` is the default.
///
/// Idempotent. Timestamps are left alone so repeated calls compare equal.
pub fn set_default(
    definitions: &[GradeDefinition],
    target_id: &str,
) -> Result<Vec<GradeDefinition>, ScaleError> {
    if !definitions.iter().any(|d| d.id == target_id) {
        return Err(ScaleError::NotFound {
            id: target_id.to_string(),
        });
    }
    Ok(definitions
        .iter()
        .map(|d| GradeDefinition {
            is_default: d.id == target_id,
            ..d.clone()
        })
        .collect())
}

pub fn default_definition(definitions: &[GradeDefinition]) -> Option<&GradeDefinition> {
    definitions.iter().find(|d| d.is_default)
}

/// Restore the single-default rule after an insert or removal.
///
/// Several defaults keep the first; none promotes the first template-seeded
/// definition, else the first one in the set.
pub(crate) fn ensure_single_default(definitions: &mut [GradeDefinition]) {
    let keep = definitions
        .iter()
        .position(|d| d.is_default)
        .or_else(|| definitions.iter().position(|d| d.is_protected()))
        .or(if definitions.is_empty() { None } else { Some(0) });
    for (i, d) in definitions.iter_mut().enumerate() {
        d.is_default = Some(i) == keep;
    }
}
