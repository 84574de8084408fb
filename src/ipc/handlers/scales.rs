use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{bool_param, optional_str, require_f64, require_str, school_id};
use crate::ipc::types::{AppState, Request, SchoolState};
use crate::scale::defaults::{default_definition, set_default};
use crate::scale::lifecycle::{self, Outcome};
use crate::scale::resolve::{resolve_many, resolve_rounded};
use crate::scale::revision::{check_revision, revision};
use crate::scale::validate::validate;
use crate::scale::{DefinitionInput, GradeDefinition, GradeRange, ScaleError};
use serde_json::{json, Value};

fn definition_input(req: &Request) -> Result<DefinitionInput, HandlerErr> {
    serde_json::from_value(req.params.clone())
        .map_err(|e| HandlerErr::bad_params(format!("invalid grade definition: {}", e)))
}

fn expected_revision(req: &Request) -> Result<Option<String>, HandlerErr> {
    optional_str(req, "expectedRevision")
}

fn find_definition<'a>(
    school: &'a SchoolState,
    definition_id: Option<&str>,
) -> Result<&'a GradeDefinition, HandlerErr> {
    match definition_id {
        Some(id) => school
            .definitions
            .iter()
            .find(|d| d.id == id)
            .ok_or_else(|| ScaleError::NotFound { id: id.to_string() }.into()),
        None => default_definition(&school.definitions).ok_or_else(|| HandlerErr {
            code: "not_found",
            message: "school has no default grade definition".to_string(),
            details: None,
        }),
    }
}

/// Store a new set for the school and return its revision.
fn commit(
    school: &mut SchoolState,
    school_id: &str,
    action: &str,
    definition_id: &str,
    definitions: Vec<GradeDefinition>,
) -> Result<String, HandlerErr> {
    let rev = revision(&definitions)?;
    school.definitions = definitions;
    tracing::info!(
        school_id,
        definition_id,
        action,
        revision = %rev,
        "grade definitions updated"
    );
    Ok(rev)
}

fn outcome_json(school: &SchoolState, outcome: &Outcome, rev: &str) -> Value {
    json!({
        "definitionId": outcome.definition_id,
        "definition": outcome.definition(),
        "warnings": school.settings.visible_warnings(&outcome.warnings),
        "revision": rev,
    })
}

fn range_json(range: &GradeRange) -> Value {
    json!({
        "grade": range.grade,
        "gradePoint": range.grade_point,
        "minMarks": range.min_marks,
        "maxMarks": range.max_marks,
        "description": range.description,
    })
}

fn handle_scales_list(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let school = state.school_view(&school_id);
    Ok(json!({
        "definitions": school.definitions,
        "defaultId": default_definition(&school.definitions).map(|d| d.id.clone()),
        "revision": revision(&school.definitions)?,
    }))
}

fn handle_scales_get(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let definition_id = require_str(req, "definitionId")?;
    let school = state.school_view(&school_id);
    let def = find_definition(&school, Some(definition_id.as_str()))?;
    Ok(json!({ "definition": def }))
}

fn handle_scales_validate(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let input = definition_input(req)?;
    let school = state.school_view(&school_id);
    let normalized = validate(&input.name, &input.grade_ranges)?;
    Ok(json!({
        "name": normalized.name,
        "gradeRanges": normalized.grade_ranges,
        "warnings": school.settings.visible_warnings(&normalized.warnings),
    }))
}

fn handle_scales_create(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let input = definition_input(req)?;
    let make_default = bool_param(req, "makeDefault")?;
    let expected = expected_revision(req)?;

    let school = state.school_mut(&school_id);
    check_revision(&school.definitions, expected.as_deref())?;
    let outcome = lifecycle::create(&school.definitions, &input, make_default)?;
    let rev = commit(
        school,
        &school_id,
        "create",
        &outcome.definition_id,
        outcome.definitions.clone(),
    )?;
    Ok(outcome_json(school, &outcome, &rev))
}

fn handle_scales_instantiate_template(
    state: &mut AppState,
    req: &Request,
) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let scale_id = optional_str(req, "scaleId")?.filter(|s| !s.is_empty());
    let name = optional_str(req, "name")?;
    let code = optional_str(req, "code")?;
    let make_default = bool_param(req, "makeDefault")?;
    let expected = expected_revision(req)?;

    let school = state.school_mut(&school_id);
    check_revision(&school.definitions, expected.as_deref())?;
    let scale_id = scale_id.unwrap_or_else(|| school.settings.default_template.clone());
    let outcome = lifecycle::instantiate_template(
        &school.definitions,
        &scale_id,
        name.as_deref(),
        code.as_deref(),
        make_default,
    )?;
    let rev = commit(
        school,
        &school_id,
        "instantiate_template",
        &outcome.definition_id,
        outcome.definitions.clone(),
    )?;
    Ok(outcome_json(school, &outcome, &rev))
}

fn handle_scales_update(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let definition_id = require_str(req, "definitionId")?;
    let input = definition_input(req)?;
    let expected = expected_revision(req)?;

    let school = state.school_mut(&school_id);
    check_revision(&school.definitions, expected.as_deref())?;
    let outcome = lifecycle::update(&school.definitions, &definition_id, &input)?;
    let rev = commit(
        school,
        &school_id,
        "update",
        &definition_id,
        outcome.definitions.clone(),
    )?;
    Ok(outcome_json(school, &outcome, &rev))
}

fn handle_scales_clone(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let definition_id = require_str(req, "definitionId")?;
    let name = require_str(req, "name")?;
    let code = optional_str(req, "code")?.unwrap_or_default();
    let make_default = bool_param(req, "makeDefault")?;
    let expected = expected_revision(req)?;

    let school = state.school_mut(&school_id);
    check_revision(&school.definitions, expected.as_deref())?;
    let outcome = lifecycle::clone_definition(
        &school.definitions,
        &definition_id,
        &name,
        &code,
        make_default,
    )?;
    let rev = commit(
        school,
        &school_id,
        "clone",
        &outcome.definition_id,
        outcome.definitions.clone(),
    )?;
    Ok(outcome_json(school, &outcome, &rev))
}

fn handle_scales_delete(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let definition_id = require_str(req, "definitionId")?;
    let expected = expected_revision(req)?;

    let school = state.school_mut(&school_id);
    check_revision(&school.definitions, expected.as_deref())?;
    let remaining = lifecycle::delete(&school.definitions, &definition_id)?;
    let rev = commit(school, &school_id, "delete", &definition_id, remaining)?;
    Ok(json!({
        "deleted": definition_id,
        "defaultId": default_definition(&school.definitions).map(|d| d.id.clone()),
        "revision": rev,
    }))
}

fn handle_scales_set_default(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let definition_id = require_str(req, "definitionId")?;
    let expected = expected_revision(req)?;

    let school = state.school_mut(&school_id);
    check_revision(&school.definitions, expected.as_deref())?;
    let next = set_default(&school.definitions, &definition_id)?;
    let rev = commit(school, &school_id, "set_default", &definition_id, next)?;
    Ok(json!({ "defaultId": definition_id, "revision": rev }))
}

fn handle_scales_resolve(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let definition_id = optional_str(req, "definitionId")?.filter(|s| !s.is_empty());
    let mark = require_f64(req, "mark")?;

    let school = state.school_view(&school_id);
    let def = find_definition(&school, definition_id.as_deref())?;
    let (resolved_mark, range) = resolve_rounded(def, mark, school.settings.round_marks)?;
    let mut out = range_json(range);
    out["definitionId"] = json!(def.id);
    out["mark"] = json!(mark);
    out["resolvedMark"] = json!(resolved_mark);
    Ok(out)
}

fn handle_scales_resolve_batch(state: &mut AppState, req: &Request) -> Result<Value, HandlerErr> {
    let school_id = school_id(req)?;
    let definition_id = optional_str(req, "definitionId")?.filter(|s| !s.is_empty());
    let Some(raw_marks) = req.params.get("marks").and_then(|v| v.as_array()) else {
        return Err(HandlerErr::bad_params("marks must be an array"));
    };
    let marks = raw_marks
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_f64()
                .ok_or_else(|| HandlerErr::bad_params(format!("marks[{}] must be a number", i)))
        })
        .collect::<Result<Vec<f64>, _>>()?;

    let school = state.school_view(&school_id);
    let def = find_definition(&school, definition_id.as_deref())?;
    let hits = resolve_many(def, &marks, school.settings.round_marks)?;
    let results: Vec<Value> = hits
        .iter()
        .zip(marks.iter())
        .map(|((resolved, range), mark)| {
            let mut row = range_json(range);
            row["mark"] = json!(mark);
            row["resolvedMark"] = json!(resolved);
            row
        })
        .collect();
    Ok(json!({ "definitionId": def.id, "results": results }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<Value> {
    let result = match req.method.as_str() {
        "scales.list" => handle_scales_list(state, req),
        "scales.get" => handle_scales_get(state, req),
        "scales.validate" => handle_scales_validate(state, req),
        "scales.create" => handle_scales_create(state, req),
        "scales.instantiateTemplate" => handle_scales_instantiate_template(state, req),
        "scales.update" => handle_scales_update(state, req),
        "scales.clone" => handle_scales_clone(state, req),
        "scales.delete" => handle_scales_delete(state, req),
        "scales.setDefault" => handle_scales_set_default(state, req),
        "scales.resolve" => handle_scales_resolve(state, req),
        "scales.resolveBatch" => handle_scales_resolve_batch(state, req),
        _ => return None,
    };
    Some(respond(&req.id, result))
}
