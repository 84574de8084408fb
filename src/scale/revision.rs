use sha2::{Digest, Sha256};

use super::error::ScaleError;
use super::model::GradeDefinition;

/// Content token for a school's definition set: hex SHA-256 of its JSON form.
pub fn revision(definitions: &[GradeDefinition]) -> Result<String, ScaleError> {
    let bytes = serde_json::to_vec(definitions).map_err(|e| ScaleError::Encoding {
        message: e.to_string(),
    })?;
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

/// Compare-and-swap guard for read-modify-write callers. `None` skips the check.
pub fn check_revision(
    definitions: &[GradeDefinition],
    expected: Option<&str>,
) -> Result<(), ScaleError> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = revision(definitions)?;
    if actual != expected.trim().to_ascii_lowercase() {
        return Err(ScaleError::RevisionConflict {
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(())
}
