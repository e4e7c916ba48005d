use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::directory::{Location, User};
use super::field::FieldDefinition;
use super::period::ReportPeriod;
use super::report::Report;
use super::template::ReportTemplate;

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// Aggregate root for one reporting workspace: the field catalog, the
/// templates composed from it, every report filed against them, and the
/// user/location directory. Services mutate a `Hub` in memory; persistence
/// goes through [`crate::storage::StorageBackend`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub templates: Vec<ReportTemplate>,
    #[serde(default)]
    pub reports: Vec<Report>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub locations: Vec<Location>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "Hub::schema_version_default")]
    pub schema_version: u8,
}

impl Hub {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            fields: Vec::new(),
            templates: Vec::new(),
            reports: Vec::new(),
            users: Vec::new(),
            locations: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_field(&mut self, field: FieldDefinition) -> Uuid {
        let id = field.id;
        self.fields.push(field);
        self.touch();
        id
    }

    pub fn add_template(&mut self, template: ReportTemplate) -> Uuid {
        let id = template.id;
        self.templates.push(template);
        self.touch();
        id
    }

    pub fn add_report(&mut self, report: Report) -> Uuid {
        let id = report.id;
        self.reports.push(report);
        self.touch();
        id
    }

    pub fn add_user(&mut self, user: User) -> Uuid {
        let id = user.id;
        self.users.push(user);
        self.touch();
        id
    }

    pub fn add_location(&mut self, location: Location) -> Uuid {
        let id = location.id;
        self.locations.push(location);
        self.touch();
        id
    }

    pub fn field(&self, id: Uuid) -> Option<&FieldDefinition> {
        self.fields.iter().find(|field| field.id == id)
    }

    pub fn field_mut(&mut self, id: Uuid) -> Option<&mut FieldDefinition> {
        self.fields.iter_mut().find(|field| field.id == id)
    }

    pub fn template(&self, id: Uuid) -> Option<&ReportTemplate> {
        self.templates.iter().find(|template| template.id == id)
    }

    pub fn template_mut(&mut self, id: Uuid) -> Option<&mut ReportTemplate> {
        self.templates.iter_mut().find(|template| template.id == id)
    }

    pub fn report(&self, id: Uuid) -> Option<&Report> {
        self.reports.iter().find(|report| report.id == id)
    }

    pub fn report_mut(&mut self, id: Uuid) -> Option<&mut Report> {
        self.reports.iter_mut().find(|report| report.id == id)
    }

    /// The single report a user may hold for a template/period pair.
    pub fn report_for(
        &self,
        user_id: Uuid,
        template_id: Uuid,
        period: &ReportPeriod,
    ) -> Option<&Report> {
        self.reports.iter().find(|report| {
            report.user_id == user_id
                && report.template_id == template_id
                && &report.report_period == period
        })
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn location(&self, id: Uuid) -> Option<&Location> {
        self.locations.iter().find(|location| location.id == id)
    }

    pub fn report_count(&self) -> usize {
        self.reports.len()
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}
