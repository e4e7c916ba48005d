//! Form renderer and interpreter.
//!
//! Templates describe *what* to collect; this module turns them into ordered
//! input descriptors, folds user edits into a draft value map, and checks
//! required fields before a submission is accepted. Rendering is pure: the
//! same template and data always produce the same descriptor sequence.

use std::fmt::Write as _;

use serde::Serialize;

use crate::errors::{SchemaError, ValidationError};
use crate::reporting::{FieldKind, FieldValue, ReportData, ReportField, ReportTemplate};

/// One renderable input, in final display order. `value` is already
/// resolved through the hydration precedence (draft edit, then previously
/// saved data, then the kind's empty default).
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldInput {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
    pub value: FieldValue,
}

/// A user edit against a single field, shaped like the widget that produced
/// it.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldEdit {
    /// Text-like input, including dropdown selection and numeric strings.
    Scalar(String),
    /// Checkbox state.
    Checkbox(bool),
    /// Multiselect membership toggle: adds the choice when absent, removes
    /// it when present.
    ToggleChoice(String),
    /// File picker result; only the display name is retained.
    FileName(String),
}

impl FieldEdit {
    fn describe(&self) -> &'static str {
        match self {
            FieldEdit::Scalar(_) => "scalar",
            FieldEdit::Checkbox(_) => "checkbox",
            FieldEdit::ToggleChoice(_) => "choice-toggle",
            FieldEdit::FileName(_) => "file",
        }
    }
}

/// In-progress edits for one form, keyed by field name. Held in caller
/// memory until explicitly saved or submitted; two sessions editing the same
/// draft resolve last-write-wins at save time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftValues {
    values: ReportData,
}

impl DraftValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resumes editing from a previously saved value map.
    pub fn from_saved(data: ReportData) -> Self {
        Self { values: data }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.values.get(name)
    }

    /// Folds one edit into the draft, enforcing the field's kind.
    pub fn apply(&mut self, field: &ReportField, edit: FieldEdit) -> Result<(), SchemaError> {
        let value = match (&field.kind, edit) {
            (
                FieldKind::Text | FieldKind::Textarea | FieldKind::Number | FieldKind::Date,
                FieldEdit::Scalar(text),
            ) => FieldValue::Text(text),
            (FieldKind::Dropdown { choices }, FieldEdit::Scalar(selection)) => {
                if !selection.is_empty() && !choices.contains(&selection) {
                    return Err(SchemaError::UnknownChoice {
                        field: field.name.clone(),
                        choice: selection,
                    });
                }
                FieldValue::Text(selection)
            }
            (FieldKind::Checkbox, FieldEdit::Checkbox(state)) => FieldValue::Bool(state),
            (FieldKind::Multiselect { choices }, FieldEdit::ToggleChoice(choice)) => {
                if !choices.contains(&choice) {
                    return Err(SchemaError::UnknownChoice {
                        field: field.name.clone(),
                        choice,
                    });
                }
                let mut selected = match self.values.get(&field.name) {
                    Some(FieldValue::List(items)) => items.clone(),
                    _ => Vec::new(),
                };
                if let Some(position) = selected.iter().position(|item| item == &choice) {
                    selected.remove(position);
                } else {
                    selected.push(choice);
                }
                FieldValue::List(selected)
            }
            (FieldKind::File, FieldEdit::FileName(name)) => FieldValue::Text(name),
            (_, edit) => {
                return Err(SchemaError::ValueMismatch {
                    field: field.name.clone(),
                    given: edit.describe(),
                })
            }
        };
        self.values.insert(field.name.clone(), value);
        Ok(())
    }

    /// Consumes the draft into the value map persisted on a report.
    pub fn into_data(self) -> ReportData {
        self.values
    }

    pub fn as_data(&self) -> &ReportData {
        &self.values
    }
}

/// Renders a template into its ordered input descriptors. Hydration
/// precedence per field: draft edit, then `existing` (a previously saved
/// report's data), then the kind's empty default.
pub fn render(
    template: &ReportTemplate,
    existing: Option<&ReportData>,
    draft: &DraftValues,
) -> Vec<FieldInput> {
    template
        .ordered_fields()
        .into_iter()
        .map(|field| {
            let value = draft
                .get(&field.name)
                .or_else(|| existing.and_then(|data| data.get(&field.name)))
                .cloned()
                .unwrap_or_else(|| FieldValue::default_for(&field.kind));
            FieldInput {
                name: field.name.clone(),
                label: field.label.clone(),
                kind: field.kind.clone(),
                required: field.required,
                placeholder: field.placeholder.clone(),
                help_text: field.help_text.clone(),
                value,
            }
        })
        .collect()
}

/// Checks required fields against a value map. A field is missing when it is
/// required and its value is absent or empty; checkboxes are exempt because
/// `false` is a valid answer.
pub fn validate(template: &ReportTemplate, data: &ReportData) -> Result<(), ValidationError> {
    let missing: Vec<String> = template
        .ordered_fields()
        .into_iter()
        .filter(|field| field.required && !matches!(field.kind, FieldKind::Checkbox))
        .filter(|field| data.get(&field.name).map_or(true, FieldValue::is_empty))
        .map(|field| field.name.clone())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::new(missing))
    }
}

/// Side-effect-free markup projection used for admin preview before a
/// template is committed. Runs the same descriptor pipeline as [`render`]
/// against empty data.
pub fn preview(name: &str, description: &str, fields: &[ReportField]) -> String {
    let template = ReportTemplate::new(
        name,
        description,
        crate::reporting::DEFAULT_CATEGORY,
        fields.to_vec(),
        uuid::Uuid::nil(),
    );
    let inputs = render(&template, None, &DraftValues::new());

    let mut markup = String::new();
    let _ = writeln!(markup, "<div class=\"template-preview\">");
    let _ = writeln!(markup, "  <h3>{}</h3>", name);
    if !description.is_empty() {
        let _ = writeln!(markup, "  <p>{}</p>", description);
    }
    let _ = writeln!(markup, "  <form>");
    for input in &inputs {
        let marker = if input.required { " *" } else { "" };
        let _ = writeln!(markup, "    <label>{}{}</label>", input.label, marker);
        let placeholder = input.placeholder.as_deref().unwrap_or("");
        match &input.kind {
            FieldKind::Text | FieldKind::Number | FieldKind::Date => {
                let _ = writeln!(
                    markup,
                    "    <input type=\"{}\" name=\"{}\" placeholder=\"{}\" disabled>",
                    input.kind.type_name(),
                    input.name,
                    placeholder
                );
            }
            FieldKind::Textarea => {
                let _ = writeln!(
                    markup,
                    "    <textarea name=\"{}\" placeholder=\"{}\" disabled></textarea>",
                    input.name, placeholder
                );
            }
            FieldKind::Dropdown { choices } => {
                let _ = writeln!(markup, "    <select name=\"{}\" disabled>", input.name);
                let _ = writeln!(markup, "      <option>Select an option</option>");
                for choice in choices {
                    let _ = writeln!(markup, "      <option>{}</option>", choice);
                }
                let _ = writeln!(markup, "    </select>");
            }
            FieldKind::Multiselect { choices } => {
                let _ = writeln!(markup, "    <select name=\"{}\" multiple disabled>", input.name);
                for choice in choices {
                    let _ = writeln!(markup, "      <option>{}</option>", choice);
                }
                let _ = writeln!(markup, "    </select>");
            }
            FieldKind::Checkbox => {
                let _ = writeln!(
                    markup,
                    "    <input type=\"checkbox\" name=\"{}\" disabled>",
                    input.name
                );
            }
            FieldKind::File => {
                let _ = writeln!(
                    markup,
                    "    <input type=\"file\" name=\"{}\" disabled>",
                    input.name
                );
            }
        }
    }
    let _ = writeln!(markup, "  </form>");
    let _ = write!(markup, "</div>");
    markup
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporting::DEFAULT_CATEGORY;
    use uuid::Uuid;

    fn field(name: &str, kind: FieldKind, required: bool, order: u32) -> ReportField {
        ReportField {
            id: Uuid::new_v4(),
            name: name.into(),
            label: name.into(),
            kind,
            required,
            placeholder: None,
            help_text: None,
            order,
        }
    }

    fn sample_template() -> ReportTemplate {
        ReportTemplate::new(
            "Monthly Review",
            "",
            DEFAULT_CATEGORY,
            vec![
                field("summary", FieldKind::Text, true, 0),
                field(
                    "status",
                    FieldKind::Dropdown {
                        choices: vec!["Active".into(), "Inactive".into()],
                    },
                    true,
                    1,
                ),
                field(
                    "projects",
                    FieldKind::Multiselect {
                        choices: vec!["Atlas".into(), "Borealis".into()],
                    },
                    false,
                    2,
                ),
                field("on_call", FieldKind::Checkbox, true, 3),
            ],
            Uuid::new_v4(),
        )
    }

    #[test]
    fn render_is_deterministic() {
        let template = sample_template();
        let draft = DraftValues::new();
        let first = render(&template, None, &draft);
        let second = render(&template, None, &draft);
        assert_eq!(first, second);
        let names: Vec<&str> = first.iter().map(|input| input.name.as_str()).collect();
        assert_eq!(names, ["summary", "status", "projects", "on_call"]);
    }

    #[test]
    fn hydration_prefers_draft_over_saved_over_default() {
        let template = sample_template();
        let mut saved = ReportData::new();
        saved.insert("summary".into(), FieldValue::Text("saved text".into()));
        saved.insert("status".into(), FieldValue::Text("Active".into()));

        let mut draft = DraftValues::new();
        draft
            .apply(
                template.field_by_name("summary").unwrap(),
                FieldEdit::Scalar("edited text".into()),
            )
            .unwrap();

        let inputs = render(&template, Some(&saved), &draft);
        assert_eq!(inputs[0].value, FieldValue::Text("edited text".into()));
        assert_eq!(inputs[1].value, FieldValue::Text("Active".into()));
        assert_eq!(inputs[2].value, FieldValue::List(Vec::new()));
        assert_eq!(inputs[3].value, FieldValue::Bool(false));
    }

    #[test]
    fn multiselect_toggle_adds_and_removes_without_duplicates() {
        let template = sample_template();
        let projects = template.field_by_name("projects").unwrap();
        let mut draft = DraftValues::new();

        draft
            .apply(projects, FieldEdit::ToggleChoice("Atlas".into()))
            .unwrap();
        draft
            .apply(projects, FieldEdit::ToggleChoice("Borealis".into()))
            .unwrap();
        assert_eq!(
            draft.get("projects"),
            Some(&FieldValue::List(vec!["Atlas".into(), "Borealis".into()]))
        );

        draft
            .apply(projects, FieldEdit::ToggleChoice("Atlas".into()))
            .unwrap();
        assert_eq!(
            draft.get("projects"),
            Some(&FieldValue::List(vec!["Borealis".into()]))
        );
    }

    #[test]
    fn unknown_choice_is_rejected() {
        let template = sample_template();
        let status = template.field_by_name("status").unwrap();
        let mut draft = DraftValues::new();
        let err = draft
            .apply(status, FieldEdit::Scalar("Dormant".into()))
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::UnknownChoice {
                field: "status".into(),
                choice: "Dormant".into(),
            }
        );
    }

    #[test]
    fn mismatched_edit_is_rejected() {
        let template = sample_template();
        let summary = template.field_by_name("summary").unwrap();
        let mut draft = DraftValues::new();
        let err = draft.apply(summary, FieldEdit::Checkbox(true)).unwrap_err();
        assert_eq!(
            err,
            SchemaError::ValueMismatch {
                field: "summary".into(),
                given: "checkbox",
            }
        );
    }

    #[test]
    fn validate_reports_every_missing_required_field() {
        let template = sample_template();
        let mut data = ReportData::new();
        data.insert("summary".into(), FieldValue::Text("".into()));

        let err = validate(&template, &data).unwrap_err();
        assert_eq!(err.missing, vec!["summary".to_string(), "status".to_string()]);
    }

    #[test]
    fn required_checkbox_is_satisfied_by_either_state() {
        let template = sample_template();
        let mut data = ReportData::new();
        data.insert("summary".into(), FieldValue::Text("done".into()));
        data.insert("status".into(), FieldValue::Text("Active".into()));
        // on_call stays absent entirely
        assert!(validate(&template, &data).is_ok());
    }

    #[test]
    fn preview_lists_fields_in_render_order() {
        let template = sample_template();
        let markup = preview("Monthly Review", "Team status", &template.fields);
        let summary_at = markup.find("name=\"summary\"").unwrap();
        let status_at = markup.find("name=\"status\"").unwrap();
        assert!(summary_at < status_at);
        assert!(markup.contains("<option>Active</option>"));
        assert!(markup.contains("Team status"));
    }
}
