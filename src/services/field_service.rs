use uuid::Uuid;

use crate::reporting::{FieldDefinition, FieldKind, Hub, Session};

use super::{ensure_admin, ServiceError, ServiceResult};

/// Wire-level payload for creating a field definition.
#[derive(Debug, Clone)]
pub struct FieldDraft {
    pub section: String,
    pub label: String,
    pub field_type: String,
    pub choices: Vec<String>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct FieldPatch {
    pub section: Option<String>,
    pub label: Option<String>,
    pub kind: Option<FieldKind>,
    pub placeholder: Option<String>,
    pub help_text: Option<String>,
}

pub struct FieldService;

impl FieldService {
    /// Validates and appends a new reusable field definition.
    pub fn create(
        hub: &mut Hub,
        session: &Session,
        draft: FieldDraft,
    ) -> ServiceResult<FieldDefinition> {
        ensure_admin(session, "creating fields")?;
        let kind = FieldKind::parse(&draft.field_type, draft.choices)?;
        kind.validate(&draft.label)?;

        let mut field = FieldDefinition::new(draft.section, draft.label, kind, session.user_id);
        if let Some(placeholder) = draft.placeholder {
            field = field.with_placeholder(placeholder);
        }
        if let Some(help_text) = draft.help_text {
            field = field.with_help_text(help_text);
        }
        let created = field.clone();
        hub.add_field(field);
        tracing::info!(field = %created.label, "field definition created");
        Ok(created)
    }

    /// Applies a partial update. Templates that already bound the old shape
    /// keep their resolved copy.
    pub fn update(
        hub: &mut Hub,
        session: &Session,
        id: Uuid,
        patch: FieldPatch,
    ) -> ServiceResult<FieldDefinition> {
        ensure_admin(session, "updating fields")?;
        let field = hub
            .field_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("field `{id}`")))?;

        if let Some(section) = patch.section {
            field.section = section;
        }
        if let Some(label) = patch.label {
            field.label = label;
        }
        if let Some(kind) = patch.kind {
            kind.validate(&field.label)?;
            field.kind = kind;
        }
        if let Some(placeholder) = patch.placeholder {
            field.placeholder = Some(placeholder);
        }
        if let Some(help_text) = patch.help_text {
            field.help_text = Some(help_text);
        }
        field.updated_at = chrono::Utc::now();
        let updated = field.clone();
        hub.touch();
        Ok(updated)
    }

    /// Flags a definition as deleted; it disappears from composition but
    /// templates already referencing it are unaffected.
    pub fn soft_delete(hub: &mut Hub, session: &Session, id: Uuid) -> ServiceResult<()> {
        ensure_admin(session, "deleting fields")?;
        let field = hub
            .field_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("field `{id}`")))?;
        field.soft_delete();
        hub.touch();
        Ok(())
    }

    pub fn restore(hub: &mut Hub, session: &Session, id: Uuid) -> ServiceResult<()> {
        ensure_admin(session, "restoring fields")?;
        let field = hub
            .field_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("field `{id}`")))?;
        field.restore();
        hub.touch();
        Ok(())
    }

    pub fn list(hub: &Hub, include_deleted: bool) -> Vec<&FieldDefinition> {
        hub.fields
            .iter()
            .filter(|field| include_deleted || !field.deleted)
            .collect()
    }

    /// Static descriptions of every supported field type, for admin tooling.
    pub fn field_types() -> &'static [crate::reporting::FieldTypeInfo] {
        FieldKind::catalog()
    }

    /// Distinct section labels across live definitions, in first-seen order.
    pub fn sections(hub: &Hub) -> Vec<String> {
        let mut sections: Vec<String> = Vec::new();
        for field in hub.fields.iter().filter(|field| !field.deleted) {
            if !sections.contains(&field.section) {
                sections.push(field.section.clone());
            }
        }
        sections
    }
}
