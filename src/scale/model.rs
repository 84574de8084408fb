use serde::{Deserialize, Serialize};

/// Lowest and highest percentage a grade range may cover.
pub const MIN_PERCENT: i64 = 0;
pub const MAX_PERCENT: i64 = 100;

/// One tier of a grading scale: a closed `[min_marks, max_marks]` percentage band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeRange {
    pub grade: String,
    pub min_marks: i64,
    pub max_marks: i64,
    pub grade_point: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GradeRange {
    pub fn new(grade: &str, min_marks: i64, max_marks: i64, grade_point: f64) -> Self {
        Self {
            grade: grade.to_string(),
            min_marks,
            max_marks,
            grade_point,
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Band used for resolution. Fractional marks between `max_marks` and the next
    /// tier's `min_marks` belong to this tier; the top of the scale closes at 100.
    pub fn contains(&self, mark: f64) -> bool {
        let lo = self.min_marks as f64;
        if mark < lo {
            return false;
        }
        if self.max_marks >= MAX_PERCENT {
            mark <= MAX_PERCENT as f64
        } else {
            mark < (self.max_marks + 1) as f64
        }
    }

    pub fn label(&self) -> String {
        format!("{} ({}-{})", self.grade, self.min_marks, self.max_marks)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    StandardTemplate,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeDefinition {
    pub id: String,
    pub name: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    pub is_default: bool,
    pub origin: Origin,
    /// Catalog id (`cbse`, `state`, `icse`) for template-seeded definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Canonical order: `min_marks` ascending.
    pub grade_ranges: Vec<GradeRange>,
    pub created_at: String,
    pub updated_at: String,
}

impl GradeDefinition {
    pub fn is_protected(&self) -> bool {
        self.origin == Origin::StandardTemplate
    }
}

/// Raw definition as submitted by an editing form. Ranges may arrive in any order.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub grade_ranges: Vec<GradeRange>,
}

impl DefinitionInput {
    #[allow(dead_code)]
    pub fn new(name: &str, code: &str, grade_ranges: Vec<GradeRange>) -> Self {
        Self {
            name: name.to_string(),
            code: code.to_string(),
            description: None,
            grade_ranges,
        }
    }
}
