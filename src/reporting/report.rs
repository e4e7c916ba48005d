use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::FieldKind;
use super::period::ReportPeriod;

/// A submitted value, shaped by the owning field's kind: scalar strings for
/// text-like kinds (numbers stay numeric strings), a boolean for checkboxes,
/// and a selection list for multiselects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    /// The empty default appropriate to a field kind.
    pub fn default_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Checkbox => FieldValue::Bool(false),
            FieldKind::Multiselect { .. } => FieldValue::List(Vec::new()),
            _ => FieldValue::Text(String::new()),
        }
    }

    /// Whether the value counts as "no answer" for required-field checks.
    /// An unchecked checkbox is a valid boolean answer, never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Bool(_) => false,
            FieldValue::Text(text) => text.trim().is_empty(),
            FieldValue::List(items) => items.is_empty(),
        }
    }

    /// Flat string rendering used by exports.
    pub fn to_export_string(&self) -> String {
        match self {
            FieldValue::Bool(value) => value.to_string(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::List(items) => items.join("; "),
        }
    }
}

/// The value map of one report, keyed by [`super::template::ReportField`]
/// `name`. Consumers must not assume a fixed key set across templates.
pub type ReportData = BTreeMap<String, FieldValue>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    Draft,
    Submitted,
    Reviewed,
    Approved,
    Rejected,
}

impl ReportStatus {
    /// Only drafts may be re-edited by their owner.
    pub fn is_editable(self) -> bool {
        matches!(self, ReportStatus::Draft)
    }

    /// Review transitions (approve, reject, mark reviewed) are legal from
    /// `Submitted` and `Reviewed`.
    pub fn accepts_review(self) -> bool {
        matches!(self, ReportStatus::Submitted | ReportStatus::Reviewed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReportStatus::Draft => "draft",
            ReportStatus::Submitted => "submitted",
            ReportStatus::Reviewed => "reviewed",
            ReportStatus::Approved => "approved",
            ReportStatus::Rejected => "rejected",
        }
    }
}

/// One user's filled-in instance of a template for a specific period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: Uuid,
    pub template_id: Uuid,
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<Uuid>,
    pub report_period: ReportPeriod,
    pub data: ReportData,
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    pub fn new(
        template_id: Uuid,
        user_id: Uuid,
        location_id: Option<Uuid>,
        report_period: ReportPeriod,
        data: ReportData,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            template_id,
            user_id,
            location_id,
            report_period,
            data,
            status: ReportStatus::Draft,
            submitted_at: None,
            reviewed_at: None,
            reviewed_by: None,
            review_notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the report into `Submitted`, stamping `submitted_at` only on
    /// the transition itself.
    pub fn mark_submitted(&mut self) {
        if self.status != ReportStatus::Submitted {
            self.submitted_at = Some(Utc::now());
        }
        self.status = ReportStatus::Submitted;
        self.updated_at = Utc::now();
    }

    /// Records a review outcome together with who performed it.
    pub fn mark_reviewed_as(
        &mut self,
        status: ReportStatus,
        reviewer: Uuid,
        notes: Option<String>,
    ) {
        self.status = status;
        self.reviewed_at = Some(Utc::now());
        self.reviewed_by = Some(reviewer);
        if notes.is_some() {
            self.review_notes = notes;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_values_round_trip() {
        let mut data = ReportData::new();
        data.insert("name".into(), FieldValue::Text("Jane".into()));
        data.insert("on_call".into(), FieldValue::Bool(true));
        data.insert(
            "projects".into(),
            FieldValue::List(vec!["Atlas".into(), "Borealis".into()]),
        );

        let json = serde_json::to_string(&data).unwrap();
        let back: ReportData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn emptiness_follows_field_semantics() {
        assert!(FieldValue::Text("  ".into()).is_empty());
        assert!(FieldValue::List(Vec::new()).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Text("0".into()).is_empty());
    }

    #[test]
    fn submitted_at_is_stamped_once() {
        let mut report = Report::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            None,
            "2025-06".parse().unwrap(),
            ReportData::new(),
        );
        report.mark_submitted();
        let first = report.submitted_at.unwrap();
        report.mark_submitted();
        assert_eq!(report.submitted_at.unwrap(), first);
    }
}
