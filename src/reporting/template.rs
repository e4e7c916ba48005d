use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::{FieldDefinition, FieldKind};
use crate::utils::slugify;

pub const DEFAULT_CATEGORY: &str = "General";

/// A field definition bound into a template. Carries its own copy of the
/// kind (and therefore the choice list) resolved at compose time, so later
/// edits to the source definition never change an existing template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportField {
    pub id: Uuid,
    /// Stable key used in submitted data maps; distinct from `label`.
    pub name: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_text: Option<String>,
    pub order: u32,
}

impl ReportField {
    /// Binds a definition at the given selection position.
    pub fn from_definition(definition: &FieldDefinition, order: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: slugify(&definition.label),
            label: definition.label.clone(),
            kind: definition.kind.clone(),
            required: false,
            placeholder: definition.placeholder.clone(),
            help_text: definition.help_text.clone(),
            order,
        }
    }

}

/// A named, ordered composition of field definitions used to generate a
/// fillable form. Inactive templates stay resolvable for existing reports
/// but are hidden from users starting new ones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportTemplate {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    #[serde(default = "default_category")]
    pub category: String,
    pub fields: Vec<ReportField>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

fn default_active() -> bool {
    true
}

impl ReportTemplate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
        fields: Vec<ReportField>,
        created_by: Uuid,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            category: category.into(),
            fields,
            active: true,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Fields in render order: ascending `order`, storage position breaking
    /// ties. The sort is stable, so identical inputs always produce the same
    /// sequence.
    pub fn ordered_fields(&self) -> Vec<&ReportField> {
        let mut fields: Vec<&ReportField> = self.fields.iter().collect();
        fields.sort_by_key(|field| field.order);
        fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&ReportField> {
        self.fields.iter().find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template_with_orders(orders: &[u32]) -> ReportTemplate {
        let fields = orders
            .iter()
            .enumerate()
            .map(|(position, order)| ReportField {
                id: Uuid::new_v4(),
                name: format!("field_{position}"),
                label: format!("Field {position}"),
                kind: FieldKind::Text,
                required: false,
                placeholder: None,
                help_text: None,
                order: *order,
            })
            .collect();
        ReportTemplate::new("Monthly Review", "", DEFAULT_CATEGORY, fields, Uuid::new_v4())
    }

    #[test]
    fn ordered_fields_sorts_ascending() {
        let template = template_with_orders(&[2, 0, 1]);
        let names: Vec<&str> = template
            .ordered_fields()
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        assert_eq!(names, ["field_1", "field_2", "field_0"]);
    }

    #[test]
    fn ordered_fields_breaks_ties_by_insertion() {
        let template = template_with_orders(&[1, 0, 0]);
        let names: Vec<&str> = template
            .ordered_fields()
            .iter()
            .map(|field| field.name.as_str())
            .collect();
        assert_eq!(names, ["field_1", "field_2", "field_0"]);
    }

    #[test]
    fn binding_resolves_choices_at_compose_time() {
        let definition = FieldDefinition::new(
            "General",
            "Status",
            FieldKind::Dropdown {
                choices: vec!["Active".into(), "Inactive".into()],
            },
            Uuid::new_v4(),
        );
        let bound = ReportField::from_definition(&definition, 0);
        assert_eq!(bound.name, "status");
        assert_eq!(
            bound.kind.choices().unwrap(),
            ["Active".to_string(), "Inactive".to_string()]
        );
    }
}
