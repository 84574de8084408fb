use super::error::HandlerErr;
use super::types::Request;

pub fn str_param<'a>(req: &'a Request, key: &str) -> Option<&'a str> {
    req.params.get(key).and_then(|v| v.as_str())
}

pub fn require_str(req: &Request, key: &str) -> Result<String, HandlerErr> {
    match str_param(req, key).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        Some(_) => Err(HandlerErr::bad_params(format!("{} must not be empty", key))),
        None => Err(HandlerErr::bad_params(format!("missing {}", key))),
    }
}

pub fn optional_str(req: &Request, key: &str) -> Result<Option<String>, HandlerErr> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.trim().to_string()))
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a string", key))),
    }
}

pub fn bool_param(req: &Request, key: &str) -> Result<bool, HandlerErr> {
    match req.params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(false),
        Some(v) => v
            .as_bool()
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be boolean", key))),
    }
}

pub fn require_f64(req: &Request, key: &str) -> Result<f64, HandlerErr> {
    match req.params.get(key) {
        None => Err(HandlerErr::bad_params(format!("missing {}", key))),
        Some(v) => v
            .as_f64()
            .ok_or_else(|| HandlerErr::bad_params(format!("{} must be a number", key))),
    }
}

pub fn school_id(req: &Request) -> Result<String, HandlerErr> {
    require_str(req, "schoolId")
}
