use uuid::Uuid;

use crate::errors::SchemaError;
use crate::render;
use crate::reporting::{Hub, ReportField, ReportTemplate, Session};

use super::{ensure_admin, ServiceError, ServiceResult};

/// Partial update for an existing template.
#[derive(Debug, Clone, Default)]
pub struct TemplatePatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub active: Option<bool>,
}

pub struct TemplateService;

impl TemplateService {
    /// Assembles selected field definitions into a new template. `field_ids`
    /// is caller-ordered: position in the slice becomes the bound field's
    /// `order`, and no implicit re-sort happens.
    pub fn compose(
        hub: &mut Hub,
        session: &Session,
        name: &str,
        description: &str,
        category: &str,
        field_ids: &[Uuid],
    ) -> ServiceResult<ReportTemplate> {
        ensure_admin(session, "composing templates")?;
        if field_ids.is_empty() {
            return Err(SchemaError::EmptySelection.into());
        }
        Self::ensure_unique_name(hub, None, name)?;

        let mut fields = Vec::with_capacity(field_ids.len());
        for (position, field_id) in field_ids.iter().enumerate() {
            let definition = hub
                .field(*field_id)
                .filter(|definition| !definition.deleted)
                .ok_or(SchemaError::UnknownFieldReference(*field_id))?;
            definition.validate()?;
            fields.push(ReportField::from_definition(definition, position as u32));
        }

        let template =
            ReportTemplate::new(name, description, category, fields, session.user_id);
        let created = template.clone();
        hub.add_template(template);
        tracing::info!(template = %created.name, fields = created.fields.len(), "template composed");
        Ok(created)
    }

    /// Markup preview of a template draft, using the same rendering rules as
    /// the live form against empty data.
    pub fn preview(name: &str, description: &str, fields: &[ReportField]) -> String {
        render::preview(name, description, fields)
    }

    /// Admins see every template; users only active ones.
    pub fn list<'a>(hub: &'a Hub, session: &Session) -> Vec<&'a ReportTemplate> {
        hub.templates
            .iter()
            .filter(|template| session.is_admin() || template.active)
            .collect()
    }

    pub fn update(
        hub: &mut Hub,
        session: &Session,
        id: Uuid,
        patch: TemplatePatch,
    ) -> ServiceResult<ReportTemplate> {
        ensure_admin(session, "updating templates")?;
        if hub.template(id).is_none() {
            return Err(ServiceError::NotFound(format!("template `{id}`")));
        }
        if let Some(name) = patch.name.as_deref() {
            Self::ensure_unique_name(hub, Some(id), name)?;
        }

        let template = hub
            .template_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("template `{id}`")))?;
        if let Some(name) = patch.name {
            template.name = name;
        }
        if let Some(description) = patch.description {
            template.description = description;
        }
        if let Some(category) = patch.category {
            template.category = category;
        }
        if let Some(active) = patch.active {
            template.active = active;
        }
        template.updated_at = chrono::Utc::now();
        let updated = template.clone();
        hub.touch();
        Ok(updated)
    }

    /// Hard-deletes a template, refusing while submissions still reference
    /// it.
    pub fn delete(hub: &mut Hub, session: &Session, id: Uuid) -> ServiceResult<()> {
        ensure_admin(session, "deleting templates")?;
        if hub.reports.iter().any(|report| report.template_id == id) {
            return Err(ServiceError::Invalid(
                "template has existing submissions".into(),
            ));
        }
        let before = hub.templates.len();
        hub.templates.retain(|template| template.id != id);
        if hub.templates.len() == before {
            return Err(ServiceError::NotFound(format!("template `{id}`")));
        }
        hub.touch();
        Ok(())
    }

    fn ensure_unique_name(hub: &Hub, exclude: Option<Uuid>, candidate: &str) -> ServiceResult<()> {
        let normalized = candidate.trim().to_ascii_lowercase();
        let duplicate = hub.templates.iter().any(|template| {
            template.name.trim().to_ascii_lowercase() == normalized
                && exclude.map_or(true, |id| template.id != id)
        });
        if duplicate {
            Err(ServiceError::Invalid(format!(
                "template `{candidate}` already exists"
            )))
        } else {
            Ok(())
        }
    }
}
