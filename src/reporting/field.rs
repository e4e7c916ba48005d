use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::SchemaError;

/// Closed enumeration of input kinds a form can render. Choice-backed kinds
/// carry their options so an option-less dropdown cannot be represented
/// accidentally; emptiness is still rejected by [`FieldKind::validate`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "field_type", rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Textarea,
    Number,
    Date,
    Dropdown { choices: Vec<String> },
    Multiselect { choices: Vec<String> },
    Checkbox,
    File,
}

impl FieldKind {
    /// Builds a kind from the wire-level type name plus its choice list.
    /// Choices are ignored for kinds that do not use them.
    pub fn parse(field_type: &str, choices: Vec<String>) -> Result<Self, SchemaError> {
        let kind = match field_type {
            "text" => FieldKind::Text,
            "textarea" => FieldKind::Textarea,
            "number" => FieldKind::Number,
            "date" => FieldKind::Date,
            "dropdown" => FieldKind::Dropdown { choices },
            "multiselect" => FieldKind::Multiselect { choices },
            "checkbox" => FieldKind::Checkbox,
            "file" => FieldKind::File,
            other => return Err(SchemaError::UnknownFieldType(other.to_string())),
        };
        Ok(kind)
    }

    /// Wire-level name of the kind.
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Textarea => "textarea",
            FieldKind::Number => "number",
            FieldKind::Date => "date",
            FieldKind::Dropdown { .. } => "dropdown",
            FieldKind::Multiselect { .. } => "multiselect",
            FieldKind::Checkbox => "checkbox",
            FieldKind::File => "file",
        }
    }

    /// The resolved choice list, when the kind carries one.
    pub fn choices(&self) -> Option<&[String]> {
        match self {
            FieldKind::Dropdown { choices } | FieldKind::Multiselect { choices } => {
                Some(choices.as_slice())
            }
            _ => None,
        }
    }

    /// Rejects choice-backed kinds whose choice list is empty. `label` names
    /// the owning field in the error.
    pub fn validate(&self, label: &str) -> Result<(), SchemaError> {
        match self.choices() {
            Some(choices) if choices.is_empty() => {
                Err(SchemaError::MissingChoices(label.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Static descriptions of every supported kind, for admin tooling.
    pub fn catalog() -> &'static [FieldTypeInfo] {
        &FIELD_TYPE_CATALOG
    }
}

/// Human-readable description of a field kind.
#[derive(Debug, Clone, Serialize)]
pub struct FieldTypeInfo {
    pub name: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub supports_choices: bool,
    pub supports_placeholder: bool,
}

static FIELD_TYPE_CATALOG: Lazy<Vec<FieldTypeInfo>> = Lazy::new(|| {
    vec![
        FieldTypeInfo {
            name: "text",
            label: "Text Input",
            description: "Single line text input",
            supports_choices: false,
            supports_placeholder: true,
        },
        FieldTypeInfo {
            name: "textarea",
            label: "Text Area",
            description: "Multi-line text input",
            supports_choices: false,
            supports_placeholder: true,
        },
        FieldTypeInfo {
            name: "number",
            label: "Number Input",
            description: "Numeric input, collected as a numeric string",
            supports_choices: false,
            supports_placeholder: true,
        },
        FieldTypeInfo {
            name: "date",
            label: "Date Picker",
            description: "Date selection input",
            supports_choices: false,
            supports_placeholder: false,
        },
        FieldTypeInfo {
            name: "dropdown",
            label: "Dropdown Select",
            description: "Single selection from predefined choices",
            supports_choices: true,
            supports_placeholder: false,
        },
        FieldTypeInfo {
            name: "multiselect",
            label: "Multi-Select",
            description: "Multiple selection from predefined choices",
            supports_choices: true,
            supports_placeholder: false,
        },
        FieldTypeInfo {
            name: "checkbox",
            label: "Checkbox",
            description: "Boolean yes/no input",
            supports_choices: false,
            supports_placeholder: false,
        },
        FieldTypeInfo {
            name: "file",
            label: "File Upload",
            description: "File attachment; only the display name is stored",
            supports_choices: false,
            supports_placeholder: false,
        },
    ]
});

/// A reusable input specification maintained independently of any template.
/// Soft-deleted definitions stay referenceable by templates that already
/// bound them; they are only excluded from new compositions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub id: Uuid,
    pub section: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    #[serde(default)]
    pub deleted: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FieldDefinition {
    pub fn new(
        section: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            section: section.into(),
            label: label.into(),
            kind,
            placeholder: None,
            help_text: None,
            deleted: false,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
        self.help_text = Some(help_text.into());
        self
    }

    /// Re-checks the choice invariant against the current kind.
    pub fn validate(&self) -> Result<(), SchemaError> {
        self.kind.validate(&self.label)
    }

    /// Flags the definition as deleted. Content fields are left untouched so
    /// a restore brings the definition back unchanged.
    pub fn soft_delete(&mut self) {
        self.deleted = true;
        self.updated_at = Utc::now();
    }

    pub fn restore(&mut self) {
        self.deleted = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rejects_unknown_type() {
        let err = FieldKind::parse("color", Vec::new()).unwrap_err();
        assert_eq!(err, SchemaError::UnknownFieldType("color".into()));
    }

    #[test]
    fn validate_rejects_empty_choice_list() {
        let kind = FieldKind::parse("dropdown", Vec::new()).unwrap();
        assert_eq!(
            kind.validate("Status"),
            Err(SchemaError::MissingChoices("Status".into()))
        );
        let kind = FieldKind::parse("dropdown", vec!["Active".into()]).unwrap();
        assert!(kind.validate("Status").is_ok());
    }

    #[test]
    fn kind_serializes_with_wire_tag() {
        let def = FieldDefinition::new(
            "General",
            "Status",
            FieldKind::Dropdown {
                choices: vec!["Active".into(), "Inactive".into()],
            },
            Uuid::new_v4(),
        );
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["field_type"], "dropdown");
        assert_eq!(json["choices"][1], "Inactive");

        let back: FieldDefinition = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, def.kind);
    }

    #[test]
    fn catalog_covers_every_kind() {
        let catalog = FieldKind::catalog();
        assert_eq!(catalog.len(), 8);
        let dropdown = catalog
            .iter()
            .find(|info| info.name == "dropdown")
            .unwrap();
        assert!(dropdown.supports_choices);
        assert!(!dropdown.supports_placeholder);
    }

    #[test]
    fn soft_delete_and_restore_flip_only_the_flag() {
        let mut def =
            FieldDefinition::new("General", "Notes", FieldKind::Textarea, Uuid::new_v4());
        let id = def.id;
        def.soft_delete();
        assert!(def.deleted);
        def.restore();
        assert!(!def.deleted);
        assert_eq!(def.id, id);
        assert_eq!(def.label, "Notes");
    }
}
