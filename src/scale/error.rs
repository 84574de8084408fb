use std::fmt;

use serde_json::json;
use thiserror::Error;

use super::model::GradeRange;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScaleError {
    #[error("{reason}")]
    ValidationFailure {
        reason: String,
        offending_ranges: Vec<GradeRange>,
    },

    #[error("grade definition not found: {id}")]
    NotFound { id: String },

    #[error(
        "grade definition {id} comes from a standard template and cannot be changed or deleted; \
         set a different definition as default instead"
    )]
    ProtectedDefinition { id: String },

    #[error("mark {mark} is outside 0..=100")]
    OutOfDomain { mark: f64 },

    #[error("grade definition is inconsistent: mark {mark} matched {matches} ranges")]
    CorruptDefinition { mark: f64, matches: usize },

    #[error("unknown grading template: {scale_id}")]
    TemplateNotFound { scale_id: String },

    #[error("grade definitions changed since revision {expected} (now {actual})")]
    RevisionConflict { expected: String, actual: String },

    #[error("could not encode grade definitions: {message}")]
    Encoding { message: String },
}

impl ScaleError {
    pub(crate) fn validation(reason: impl Into<String>, offending: &[&GradeRange]) -> Self {
        Self::ValidationFailure {
            reason: reason.into(),
            offending_ranges: offending.iter().map(|r| (*r).clone()).collect(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::ValidationFailure { .. } => "validation_failed",
            Self::NotFound { .. } => "not_found",
            Self::ProtectedDefinition { .. } => "protected_definition",
            Self::OutOfDomain { .. } => "out_of_domain",
            Self::CorruptDefinition { .. } => "corrupt_definition",
            Self::TemplateNotFound { .. } => "template_not_found",
            Self::RevisionConflict { .. } => "revision_conflict",
            Self::Encoding { .. } => "encoding_failed",
        }
    }

    /// True for failures that mean a caller skipped validation, not a user mistake.
    pub fn is_logic_error(&self) -> bool {
        matches!(
            self,
            Self::OutOfDomain { .. } | Self::CorruptDefinition { .. } | Self::Encoding { .. }
        )
    }

    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::ValidationFailure {
                reason,
                offending_ranges,
            } => Some(json!({
                "reason": reason,
                "offendingRanges": offending_ranges,
            })),
            Self::NotFound { id } | Self::ProtectedDefinition { id } => {
                Some(json!({ "definitionId": id }))
            }
            Self::OutOfDomain { mark } => Some(json!({ "mark": mark })),
            Self::CorruptDefinition { mark, matches } => {
                Some(json!({ "mark": mark, "matches": matches }))
            }
            Self::TemplateNotFound { scale_id } => Some(json!({ "scaleId": scale_id })),
            Self::RevisionConflict { expected, actual } => Some(json!({
                "expectedRevision": expected,
                "revision": actual,
            })),
            Self::Encoding { .. } => None,
        }
    }
}

/// Non-fatal findings reported alongside a successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A lower tier carries a higher grade point than the tier above it.
    GradePointInversion {
        lower_grade: String,
        higher_grade: String,
    },
    DuplicateCode { code: String },
}

impl Warning {
    pub fn code(&self) -> &'static str {
        match self {
            Self::GradePointInversion { .. } => "grade_point_inversion",
            Self::DuplicateCode { .. } => "duplicate_code",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "code": self.code(),
            "message": self.to_string(),
        })
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GradePointInversion {
                lower_grade,
                higher_grade,
            } => write!(
                f,
                "grade {} has a higher grade point than {}",
                lower_grade, higher_grade
            ),
            Self::DuplicateCode { code } => {
                write!(f, "code {} is already used by another grade definition", code)
            }
        }
    }
}
