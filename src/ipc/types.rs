use std::borrow::Cow;
use std::collections::HashMap;

use serde::Deserialize;

use super::handlers::setup::GradingSettings;
use crate::config::Config;
use crate::scale::lifecycle::{instantiate_template, now_rfc3339};
use crate::scale::GradeDefinition;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Everything the sidecar holds for one school tenant.
#[derive(Debug, Clone, Default)]
pub struct SchoolState {
    pub definitions: Vec<GradeDefinition>,
    pub settings: GradingSettings,
}

pub struct AppState {
    pub config: Config,
    pub schools: HashMap<String, SchoolState>,
    /// Timestamp stamped on seeded template definitions.
    seeded_at: String,
}

/// Fresh state for a school, with the configured templates seeded in order.
///
/// Seeded ids are derived from the school id and the timestamps are fixed at
/// startup, so the same school always seeds to the same set.
fn seeded_school(seeds: &[String], school_id: &str, seeded_at: &str) -> SchoolState {
    let mut school = SchoolState::default();
    for scale_id in seeds {
        match instantiate_template(&school.definitions, scale_id, None, None, false) {
            Ok(out) => {
                school.definitions = out.definitions;
                if let Some(def) = school
                    .definitions
                    .iter_mut()
                    .find(|d| d.id == out.definition_id)
                {
                    def.id = format!("{}-std-{}", school_id, scale_id);
                    def.created_at = seeded_at.to_string();
                    def.updated_at = seeded_at.to_string();
                }
            }
            Err(e) => {
                tracing::warn!(school_id, scale_id = %scale_id, error = %e, "template seed skipped")
            }
        }
    }
    school
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            schools: HashMap::new(),
            seeded_at: now_rfc3339(),
        }
    }

    pub fn school(&self, school_id: &str) -> Option<&SchoolState> {
        self.schools.get(school_id)
    }

    /// Read-only view. A school that has never been written reads as its seeded
    /// state without being stored.
    pub fn school_view(&self, school_id: &str) -> Cow<'_, SchoolState> {
        match self.school(school_id) {
            Some(school) => Cow::Borrowed(school),
            None => Cow::Owned(seeded_school(
                &self.config.seed_templates,
                school_id,
                &self.seeded_at,
            )),
        }
    }

    /// The school's state for a write, storing its seeded state the first time.
    pub fn school_mut(&mut self, school_id: &str) -> &mut SchoolState {
        let seeds = &self.config.seed_templates;
        let seeded_at = &self.seeded_at;
        self.schools
            .entry(school_id.to_string())
            .or_insert_with(|| {
                let school = seeded_school(seeds, school_id, seeded_at);
                tracing::info!(
                    school_id,
                    seeded = school.definitions.len(),
                    "school initialized"
                );
                school
            })
    }
}
