use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{require_str, school_id};
use crate::ipc::types::{AppState, Request};
use crate::scale::templates::{get_template, TEMPLATE_IDS};
use crate::scale::Warning;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Per-school grading preferences (`setup` section `grading`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingSettings {
    pub round_marks: bool,
    pub warn_on_grade_point_inversion: bool,
    pub warn_on_duplicate_code: bool,
    pub default_template: String,
}

impl Default for GradingSettings {
    fn default() -> Self {
        Self {
            round_marks: false,
            warn_on_grade_point_inversion: true,
            warn_on_duplicate_code: true,
            default_template: "cbse".to_string(),
        }
    }
}

impl GradingSettings {
    /// Apply a patch field by field; the first bad field rejects the whole patch.
    pub fn merge_patch(&self, patch: &Map<String, Value>) -> Result<Self, String> {
        let mut next = self.clone();
        for (k, v) in patch {
            match k.as_str() {
                "roundMarks" => next.round_marks = parse_bool(v, k)?,
                "warnOnGradePointInversion" => {
                    next.warn_on_grade_point_inversion = parse_bool(v, k)?
                }
                "warnOnDuplicateCode" => next.warn_on_duplicate_code = parse_bool(v, k)?,
                "defaultTemplate" => {
                    let id = parse_string_max(v, k, 16)?.to_ascii_lowercase();
                    let template = get_template(&id).map_err(|_| {
                        format!("defaultTemplate must be one of: {}", TEMPLATE_IDS.join(", "))
                    })?;
                    next.default_template = template.id.to_string();
                }
                _ => return Err(format!("unknown grading field: {}", k)),
            }
        }
        Ok(next)
    }

    /// Drop warnings the school has switched off.
    pub fn visible_warnings(&self, warnings: &[Warning]) -> Vec<Value> {
        warnings
            .iter()
            .filter(|w| match w {
                Warning::GradePointInversion { .. } => self.warn_on_grade_point_inversion,
                Warning::DuplicateCode { .. } => self.warn_on_duplicate_code,
            })
            .map(Warning::to_json)
            .collect()
    }
}

fn parse_bool(v: &Value, key: &str) -> Result<bool, String> {
    v.as_bool().ok_or_else(|| format!("{} must be boolean", key))
}

fn parse_string_max(v: &Value, key: &str, max_len: usize) -> Result<String, String> {
    let s = v.as_str().ok_or_else(|| format!("{} must be string", key))?;
    let s = s.trim();
    if s.len() > max_len {
        return Err(format!("{} length must be <= {}", key, max_len));
    }
    Ok(s.to_string())
}

fn handle_setup_get(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let school = state.school_view(&school_id);
    Ok(json!({ "grading": school.settings }))
}

fn handle_setup_update(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let section = require_str(req, "section")?;
    if section != "grading" {
        return Err(HandlerErr::bad_params("unknown section"));
    }
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return Err(HandlerErr::bad_params("patch must be an object"));
    };

    let school = state.school_mut(&school_id);
    let next = school
        .settings
        .merge_patch(patch)
        .map_err(HandlerErr::bad_params)?;
    school.settings = next;
    tracing::info!(school_id = %school_id, "grading settings updated");
    Ok(json!({ "ok": true, "grading": school.settings }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "setup.get" => Some(respond(&req.id, handle_setup_get(state, req))),
        "setup.update" => Some(respond(&req.id, handle_setup_update(state, req))),
        _ => None,
    }
}
