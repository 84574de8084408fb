use crate::ipc::error::{respond, HandlerErr};
use crate::ipc::helpers::{bool_param, require_str};
use crate::ipc::types::{AppState, Request};
use crate::scale::templates::{get_template, list_templates, Template};
use serde_json::{json, Value};

fn template_json(t: &Template, with_ranges: bool) -> Value {
    let mut out = json!({
        "scaleId": t.id,
        "name": t.name,
        "code": t.code,
        "tierCount": t.ranges.len(),
    });
    if with_ranges {
        out["ranges"] = json!(t.ranges);
    }
    out
}

fn handle_templates_list(req: &Request) -> Result<Value, HandlerErr> {
    let include_ranges = bool_param(req, "includeRanges")?;
    let templates: Vec<Value> = list_templates()
        .iter()
        .map(|t| template_json(t, include_ranges))
        .collect();
    Ok(json!({ "templates": templates }))
}

fn handle_templates_get(req: &Request) -> Result<Value, HandlerErr> {
    let scale_id = require_str(req, "scaleId")?;
    let template = get_template(&scale_id)?;
    Ok(json!({ "template": template_json(&template, true) }))
}

pub fn try_handle(_state: &mut AppState, req: &Request) -> Option<Value> {
    match req.method.as_str() {
        "templates.list" => Some(respond(&req.id, handle_templates_list(req))),
        "templates.get" => Some(respond(&req.id, handle_templates_get(req))),
        _ => None,
    }
}
