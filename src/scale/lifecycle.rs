//! Create, update, clone and delete grade definitions.
//!
//! Every operation takes the school's current set and returns a new one, so a
//! failed call never leaves a partial mutation behind.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

use super::defaults::{ensure_single_default, set_default};
use super::error::{ScaleError, Warning};
use super::model::{DefinitionInput, GradeDefinition, Origin};
use super::templates::get_template;
use super::validate::{code_warnings, validate};

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub definitions: Vec<GradeDefinition>,
    pub definition_id: String,
    pub warnings: Vec<Warning>,
}

impl Outcome {
    pub fn definition(&self) -> Option<&GradeDefinition> {
        self.definitions.iter().find(|d| d.id == self.definition_id)
    }
}

pub(crate) fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn clean_optional(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

fn find<'a>(definitions: &'a [GradeDefinition], id: &str) -> Result<&'a GradeDefinition, ScaleError> {
    definitions
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| ScaleError::NotFound { id: id.to_string() })
}

/// Append `new_def`, then settle the default flag.
fn insert(
    definitions: &[GradeDefinition],
    new_def: GradeDefinition,
    make_default: bool,
    warnings: Vec<Warning>,
) -> Result<Outcome, ScaleError> {
    let id = new_def.id.clone();
    let mut next = definitions.to_vec();
    next.push(new_def);
    let mut next = if make_default {
        set_default(&next, &id)?
    } else {
        next
    };
    ensure_single_default(&mut next);
    Ok(Outcome {
        definitions: next,
        definition_id: id,
        warnings,
    })
}

pub fn create(
    definitions: &[GradeDefinition],
    input: &DefinitionInput,
    make_default: bool,
) -> Result<Outcome, ScaleError> {
    let normalized = validate(&input.name, &input.grade_ranges)?;
    let code = input.code.trim().to_string();
    let mut warnings = normalized.warnings;
    warnings.extend(code_warnings(definitions, &code, None));

    let now = now_rfc3339();
    let def = GradeDefinition {
        id: Uuid::new_v4().to_string(),
        name: normalized.name,
        code,
        description: clean_optional(input.description.as_deref()),
        is_default: false,
        origin: Origin::Custom,
        template_id: None,
        grade_ranges: normalized.grade_ranges,
        created_at: now.clone(),
        updated_at: now,
    };
    insert(definitions, def, make_default, warnings)
}

/// Seed a protected definition from the built-in catalog.
pub fn instantiate_template(
    definitions: &[GradeDefinition],
    scale_id: &str,
    name: Option<&str>,
    code: Option<&str>,
    make_default: bool,
) -> Result<Outcome, ScaleError> {
    let template = get_template(scale_id)?;
    let name = clean_optional(name).unwrap_or_else(|| template.name.to_string());
    let code = clean_optional(code).unwrap_or_else(|| template.code.to_string());
    let normalized = validate(&name, &template.ranges)?;
    let mut warnings = normalized.warnings;
    warnings.extend(code_warnings(definitions, &code, None));

    let now = now_rfc3339();
    let def = GradeDefinition {
        id: format!("{}-std-{}", Uuid::new_v4(), template.id),
        name: normalized.name,
        code,
        description: None,
        is_default: false,
        origin: Origin::StandardTemplate,
        template_id: Some(template.id.to_string()),
        grade_ranges: normalized.grade_ranges,
        created_at: now.clone(),
        updated_at: now,
    };
    insert(definitions, def, make_default, warnings)
}

/// Replace name, code, description and the full range set of a custom definition.
pub fn update(
    definitions: &[GradeDefinition],
    id: &str,
    input: &DefinitionInput,
) -> Result<Outcome, ScaleError> {
    let current = find(definitions, id)?;
    if current.is_protected() {
        return Err(ScaleError::ProtectedDefinition { id: id.to_string() });
    }
    let normalized = validate(&input.name, &input.grade_ranges)?;
    let code = input.code.trim().to_string();
    let mut warnings = normalized.warnings;
    warnings.extend(code_warnings(definitions, &code, Some(id)));

    let updated = GradeDefinition {
        name: normalized.name,
        code,
        description: clean_optional(input.description.as_deref()),
        grade_ranges: normalized.grade_ranges,
        updated_at: now_rfc3339(),
        ..current.clone()
    };
    let next = definitions
        .iter()
        .map(|d| if d.id == id { updated.clone() } else { d.clone() })
        .collect();
    Ok(Outcome {
        definitions: next,
        definition_id: id.to_string(),
        warnings,
    })
}

/// Copy any definition, including a protected one, into a new custom definition.
pub fn clone_definition(
    definitions: &[GradeDefinition],
    id: &str,
    name: &str,
    code: &str,
    make_default: bool,
) -> Result<Outcome, ScaleError> {
    let source = find(definitions, id)?;
    let input = DefinitionInput {
        name: name.to_string(),
        code: code.to_string(),
        description: source.description.clone(),
        grade_ranges: source.grade_ranges.clone(),
    };
    create(definitions, &input, make_default)
}

pub fn delete(
    definitions: &[GradeDefinition],
    id: &str,
) -> Result<Vec<GradeDefinition>, ScaleError> {
    let target = find(definitions, id)?;
    if target.is_protected() {
        return Err(ScaleError::ProtectedDefinition { id: id.to_string() });
    }
    let mut next: Vec<GradeDefinition> =
        definitions.iter().filter(|d| d.id != id).cloned().collect();
    ensure_single_default(&mut next);
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale::model::GradeRange;

    fn pass_fail(name: &str, code: &str) -> DefinitionInput {
        DefinitionInput::new(
            name,
            code,
            vec![
                GradeRange::new("P", 40, 100, 1.0),
                GradeRange::new("F", 0, 39, 0.0),
            ],
        )
    }

    fn default_ids(defs: &[GradeDefinition]) -> Vec<String> {
        defs.iter()
            .filter(|d| d.is_default)
            .map(|d| d.id.clone())
            .collect()
    }

    #[test]
    fn create_assigns_custom_origin_and_first_default() {
        let out = create(&[], &pass_fail("Pass/Fail", "PF"), false).expect("create");
        let def = out.definition().expect("created");
        assert_eq!(def.origin, Origin::Custom);
        assert!(def.is_default, "first definition becomes default");
        assert_eq!(def.grade_ranges[0].grade, "F");
        assert_eq!(def.created_at, def.updated_at);

        let second = create(&out.definitions, &pass_fail("Other", "OT"), false).expect("second");
        assert_eq!(default_ids(&second.definitions), vec![out.definition_id.clone()]);

        let third = create(&second.definitions, &pass_fail("Third", "TH"), true).expect("third");
        assert_eq!(default_ids(&third.definitions), vec![third.definition_id.clone()]);
    }

    #[test]
    fn create_reports_duplicate_code_without_failing() {
        let first = create(&[], &pass_fail("One", "PF"), false).expect("one");
        let second = create(&first.definitions, &pass_fail("Two", "pf"), false).expect("two");
        assert_eq!(
            second.warnings,
            vec![Warning::DuplicateCode { code: "pf".into() }]
        );
        assert_eq!(second.definitions.len(), 2);
    }

    #[test]
    fn invalid_create_leaves_set_untouched() {
        let first = create(&[], &pass_fail("One", "PF"), false).expect("one");
        let bad = DefinitionInput::new("Bad", "B", vec![GradeRange::new("P", 10, 100, 1.0)]);
        let e = create(&first.definitions, &bad, true).unwrap_err();
        assert_eq!(e.code(), "validation_failed");
    }

    #[test]
    fn template_definitions_are_protected() {
        let seeded = instantiate_template(&[], "cbse", None, None, false).expect("seed");
        let def = seeded.definition().expect("seeded");
        assert_eq!(def.origin, Origin::StandardTemplate);
        assert!(def.id.ends_with("-std-cbse"));
        assert_eq!(def.name, "CBSE Grading Scale");
        assert_eq!(def.grade_ranges.len(), 8);

        assert_eq!(
            delete(&seeded.definitions, &def.id),
            Err(ScaleError::ProtectedDefinition { id: def.id.clone() })
        );
        assert_eq!(
            update(&seeded.definitions, &def.id, &pass_fail("Edit", "E")).unwrap_err(),
            ScaleError::ProtectedDefinition { id: def.id.clone() }
        );
    }

    #[test]
    fn unknown_template_is_reported() {
        assert_eq!(
            instantiate_template(&[], "ib", None, None, false).unwrap_err(),
            ScaleError::TemplateNotFound {
                scale_id: "ib".into()
            }
        );
    }

    #[test]
    fn update_replaces_ranges_and_keeps_identity() {
        let made = create(&[], &pass_fail("One", "PF"), false).expect("one");
        let id = made.definition_id.clone();
        let replacement = DefinitionInput::new(
            "Three tier",
            "T3",
            vec![
                GradeRange::new("H", 70, 100, 2.0),
                GradeRange::new("M", 40, 69, 1.0),
                GradeRange::new("L", 0, 39, 0.0),
            ],
        );
        let out = update(&made.definitions, &id, &replacement).expect("update");
        let def = out.definition().expect("updated");
        assert_eq!(def.id, id);
        assert_eq!(def.name, "Three tier");
        assert!(def.is_default);
        assert_eq!(def.grade_ranges.len(), 3);
        assert_eq!(def.created_at, made.definition().expect("orig").created_at);

        let broken = DefinitionInput::new("Broken", "B", vec![GradeRange::new("X", 0, 99, 1.0)]);
        assert_eq!(
            update(&made.definitions, &id, &broken).unwrap_err().code(),
            "validation_failed"
        );
        assert_eq!(
            update(&made.definitions, "missing", &replacement).unwrap_err(),
            ScaleError::NotFound {
                id: "missing".into()
            }
        );
    }

    #[test]
    fn clone_of_template_is_an_editable_copy() {
        let seeded = instantiate_template(&[], "icse", None, None, false).expect("seed");
        let src = seeded.definition_id.clone();
        let copy = clone_definition(&seeded.definitions, &src, "ICSE (edited)", "ICSE2", true)
            .expect("clone");
        let def = copy.definition().expect("copy");
        assert_eq!(def.origin, Origin::Custom);
        assert!(def.is_default);
        assert_eq!(def.grade_ranges, seeded.definition().expect("src").grade_ranges);
        assert_eq!(default_ids(&copy.definitions), vec![def.id.clone()]);
    }

    #[test]
    fn deleting_default_promotes_a_template() {
        let seeded = instantiate_template(&[], "state", None, None, false).expect("seed");
        let custom = create(&seeded.definitions, &pass_fail("Mine", "M"), true).expect("custom");
        let remaining = delete(&custom.definitions, &custom.definition_id).expect("delete");
        assert_eq!(remaining.len(), 1);
        assert_eq!(default_ids(&remaining), vec![seeded.definition_id.clone()]);

        assert_eq!(
            delete(&remaining, "missing"),
            Err(ScaleError::NotFound {
                id: "missing".into()
            })
        );
    }

    #[test]
    fn deleting_last_custom_leaves_empty_set() {
        let made = create(&[], &pass_fail("Only", "O"), false).expect("one");
        let remaining = delete(&made.definitions, &made.definition_id).expect("delete");
        assert!(remaining.is_empty());
    }
}
