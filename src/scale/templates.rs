use super::error::ScaleError;
use super::model::GradeRange;

/// Built-in grading scale. Ranges are listed top tier first, as schools print them.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub id: &'static str,
    pub name: &'static str,
    pub code: &'static str,
    pub ranges: Vec<GradeRange>,
}

pub const TEMPLATE_IDS: [&str; 3] = ["cbse", "state", "icse"];

pub fn get_template(scale_id: &str) -> Result<Template, ScaleError> {
    let id = scale_id.trim().to_ascii_lowercase();
    match id.as_str() {
        "cbse" => Ok(cbse()),
        "state" => Ok(state_board()),
        "icse" => Ok(icse()),
        _ => Err(ScaleError::TemplateNotFound {
            scale_id: scale_id.to_string(),
        }),
    }
}

pub fn list_templates() -> Vec<Template> {
    vec![cbse(), state_board(), icse()]
}

fn cbse() -> Template {
    Template {
        id: "cbse",
        name: "CBSE Grading Scale",
        code: "CBSE",
        ranges: vec![
            GradeRange::new("A+", 91, 100, 10.0).with_description("Outstanding"),
            GradeRange::new("A", 81, 90, 9.0).with_description("Excellent"),
            GradeRange::new("B+", 71, 80, 8.0).with_description("Very Good"),
            GradeRange::new("B", 61, 70, 7.0).with_description("Good"),
            GradeRange::new("C+", 51, 60, 6.0).with_description("Above Average"),
            GradeRange::new("C", 41, 50, 5.0).with_description("Average"),
            GradeRange::new("D", 34, 40, 4.0).with_description("Pass"),
            GradeRange::new("E", 0, 33, 0.0).with_description("Needs Improvement"),
        ],
    }
}

fn state_board() -> Template {
    Template {
        id: "state",
        name: "State Board Grading Scale",
        code: "STATE",
        ranges: vec![
            GradeRange::new("A+", 90, 100, 10.0).with_description("Distinction"),
            GradeRange::new("A", 75, 89, 9.0).with_description("First Class"),
            GradeRange::new("B", 60, 74, 8.0).with_description("Second Class"),
            GradeRange::new("C", 50, 59, 7.0).with_description("Third Class"),
            GradeRange::new("D", 35, 49, 6.0).with_description("Pass"),
            GradeRange::new("F", 0, 34, 0.0).with_description("Fail"),
        ],
    }
}

fn icse() -> Template {
    Template {
        id: "icse",
        name: "ICSE Grading Scale",
        code: "ICSE",
        ranges: vec![
            GradeRange::new("A+", 90, 100, 10.0).with_description("Excellent"),
            GradeRange::new("A", 80, 89, 9.0).with_description("Very Good"),
            GradeRange::new("B+", 70, 79, 8.0).with_description("Good"),
            GradeRange::new("B", 60, 69, 7.0).with_description("Above Average"),
            GradeRange::new("C", 50, 59, 6.0).with_description("Average"),
            GradeRange::new("D", 40, 49, 5.0).with_description("Below Average"),
            GradeRange::new("E", 0, 39, 0.0).with_description("Needs Improvement"),
        ],
    }
}
