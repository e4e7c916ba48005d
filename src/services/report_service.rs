use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::render;
use crate::reporting::{Hub, Report, ReportData, ReportPeriod, ReportStatus, Session};

use super::{ensure_admin, ServiceError, ServiceResult};

/// Payload for saving or submitting one report. `status` selects the target
/// state and must be `Draft` or `Submitted`; review states are only
/// reachable through admin transitions.
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    pub template_id: Uuid,
    pub period: String,
    pub data: ReportData,
    pub status: ReportStatus,
}

/// Result of an upsert: the stored report plus whether it was newly created.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub report: Report,
    pub created: bool,
}

/// A report enriched with the display names admins and users see in lists.
#[derive(Debug, Clone)]
pub struct ReportRow {
    pub report: Report,
    pub template_name: String,
    pub username: String,
    pub location_name: Option<String>,
}

/// Admin search filters. Every populated filter must match; reports keep
/// their storage order in the result.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Case-insensitive substring matched against the template name, the
    /// submitting username, and the period token.
    pub search_term: Option<String>,
    pub status: Option<ReportStatus>,
    pub template_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    /// Inclusive range over `submitted_at`; unsubmitted drafts never match a
    /// date-bounded search.
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

impl ReportFilter {
    fn matches(&self, hub: &Hub, report: &Report) -> bool {
        if let Some(status) = self.status {
            if report.status != status {
                return false;
            }
        }
        if let Some(template_id) = self.template_id {
            if report.template_id != template_id {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if report.user_id != user_id {
                return false;
            }
        }
        if let Some(location_id) = self.location_id {
            if report.location_id != Some(location_id) {
                return false;
            }
        }
        if self.date_from.is_some() || self.date_to.is_some() {
            let submitted_at = match report.submitted_at {
                Some(timestamp) => timestamp,
                None => return false,
            };
            if self.date_from.is_some_and(|from| submitted_at < from) {
                return false;
            }
            if self.date_to.is_some_and(|to| submitted_at > to) {
                return false;
            }
        }
        if let Some(term) = self.search_term.as_deref() {
            let needle = term.to_lowercase();
            let template_name = hub
                .template(report.template_id)
                .map(|template| template.name.to_lowercase())
                .unwrap_or_default();
            let username = hub
                .user(report.user_id)
                .map(|user| user.username.to_lowercase())
                .unwrap_or_default();
            let period = report.report_period.as_str().to_lowercase();
            if !template_name.contains(&needle)
                && !username.contains(&needle)
                && !period.contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Bulk operations admins may apply to a set of reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Approve,
    Reject,
    MarkReviewed,
    Delete,
}

impl BulkAction {
    pub fn as_str(self) -> &'static str {
        match self {
            BulkAction::Approve => "approve",
            BulkAction::Reject => "reject",
            BulkAction::MarkReviewed => "mark_reviewed",
            BulkAction::Delete => "delete",
        }
    }
}

#[derive(Debug)]
pub struct BulkFailure {
    pub id: Uuid,
    pub reason: ServiceError,
}

/// Outcome of a bulk action: ids that went through plus per-id failures.
/// One failing id never aborts the rest of the batch.
#[derive(Debug, Default)]
pub struct BulkReport {
    pub applied: Vec<Uuid>,
    pub failures: Vec<BulkFailure>,
}

pub struct ReportService;

impl ReportService {
    /// Upserts the caller's report for `(template, period)`. Drafts may be
    /// overwritten freely; once a report has left `Draft` it is frozen for
    /// its owner. Submitting validates required fields first and stamps
    /// `submitted_at` on the transition.
    pub fn save(hub: &mut Hub, session: &Session, request: SubmitRequest) -> ServiceResult<SaveOutcome> {
        if !matches!(request.status, ReportStatus::Draft | ReportStatus::Submitted) {
            return Err(ServiceError::Invalid(format!(
                "reports can only be saved as draft or submitted, not {}",
                request.status.as_str()
            )));
        }
        let period: ReportPeriod = request
            .period
            .parse()
            .map_err(|err: crate::reporting::ParsePeriodError| {
                ServiceError::Invalid(err.to_string())
            })?;
        let template = hub
            .template(request.template_id)
            .filter(|template| template.active)
            .ok_or_else(|| {
                ServiceError::NotFound(format!("active template `{}`", request.template_id))
            })?;

        if request.status == ReportStatus::Submitted {
            render::validate(template, &request.data)?;
        }

        let existing = hub
            .report_for(session.user_id, request.template_id, &period)
            .map(|report| (report.id, report.status));
        let outcome = match existing {
            Some((_, status)) if !status.is_editable() => {
                return Err(ServiceError::Invalid(format!(
                    "report is already {} and can no longer be edited",
                    status.as_str()
                )));
            }
            Some((id, _)) => {
                let report = hub
                    .report_mut(id)
                    .ok_or_else(|| ServiceError::NotFound(format!("report `{id}`")))?;
                report.data = request.data;
                report.updated_at = Utc::now();
                if request.status == ReportStatus::Submitted {
                    report.mark_submitted();
                }
                SaveOutcome {
                    report: report.clone(),
                    created: false,
                }
            }
            None => {
                let location_id = hub
                    .user(session.user_id)
                    .and_then(|user| user.location_id);
                let mut report = Report::new(
                    request.template_id,
                    session.user_id,
                    location_id,
                    period,
                    request.data,
                );
                if request.status == ReportStatus::Submitted {
                    report.mark_submitted();
                }
                let stored = report.clone();
                hub.add_report(report);
                SaveOutcome {
                    report: stored,
                    created: true,
                }
            }
        };
        hub.touch();
        tracing::info!(
            report = %outcome.report.id,
            status = outcome.report.status.as_str(),
            "report saved"
        );
        Ok(outcome)
    }

    pub fn approve(
        hub: &mut Hub,
        session: &Session,
        id: Uuid,
        notes: Option<String>,
    ) -> ServiceResult<Report> {
        Self::review(hub, session, id, ReportStatus::Approved, notes)
    }

    pub fn reject(
        hub: &mut Hub,
        session: &Session,
        id: Uuid,
        notes: Option<String>,
    ) -> ServiceResult<Report> {
        Self::review(hub, session, id, ReportStatus::Rejected, notes)
    }

    pub fn mark_reviewed(
        hub: &mut Hub,
        session: &Session,
        id: Uuid,
        notes: Option<String>,
    ) -> ServiceResult<Report> {
        Self::review(hub, session, id, ReportStatus::Reviewed, notes)
    }

    /// Shared transition logic: legal from `Submitted` or `Reviewed`, and
    /// re-applying the state a report already holds is a no-op rather than
    /// an error.
    fn review(
        hub: &mut Hub,
        session: &Session,
        id: Uuid,
        target: ReportStatus,
        notes: Option<String>,
    ) -> ServiceResult<Report> {
        ensure_admin(session, "reviewing reports")?;
        let reviewer = session.user_id;
        let report = hub
            .report_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("report `{id}`")))?;

        if report.status == target {
            return Ok(report.clone());
        }
        if !report.status.accepts_review() {
            return Err(ServiceError::Invalid(format!(
                "cannot move a {} report to {}",
                report.status.as_str(),
                target.as_str()
            )));
        }
        report.mark_reviewed_as(target, reviewer, notes);
        let updated = report.clone();
        hub.touch();
        tracing::info!(report = %id, status = target.as_str(), "report reviewed");
        Ok(updated)
    }

    pub fn delete(hub: &mut Hub, session: &Session, id: Uuid) -> ServiceResult<()> {
        ensure_admin(session, "deleting reports")?;
        let before = hub.reports.len();
        hub.reports.retain(|report| report.id != id);
        if hub.reports.len() == before {
            return Err(ServiceError::NotFound(format!("report `{id}`")));
        }
        hub.touch();
        Ok(())
    }

    /// Applies `action` to every id independently. Failures are collected
    /// per id; they never abort the remaining ids.
    pub fn bulk(
        hub: &mut Hub,
        session: &Session,
        action: BulkAction,
        ids: &[Uuid],
    ) -> ServiceResult<BulkReport> {
        ensure_admin(session, "bulk report actions")?;
        let mut outcome = BulkReport::default();
        for id in ids {
            let result = match action {
                BulkAction::Approve => Self::approve(hub, session, *id, None).map(|_| ()),
                BulkAction::Reject => Self::reject(hub, session, *id, None).map(|_| ()),
                BulkAction::MarkReviewed => {
                    Self::mark_reviewed(hub, session, *id, None).map(|_| ())
                }
                BulkAction::Delete => Self::delete(hub, session, *id),
            };
            match result {
                Ok(()) => outcome.applied.push(*id),
                Err(reason) => outcome.failures.push(BulkFailure { id: *id, reason }),
            }
        }
        tracing::info!(
            action = action.as_str(),
            applied = outcome.applied.len(),
            failed = outcome.failures.len(),
            "bulk action finished"
        );
        Ok(outcome)
    }

    /// Order-preserving filtered view over every report. Admin-only.
    pub fn search(hub: &Hub, session: &Session, filter: &ReportFilter) -> ServiceResult<Vec<ReportRow>> {
        ensure_admin(session, "searching reports")?;
        Ok(hub
            .reports
            .iter()
            .filter(|report| filter.matches(hub, report))
            .map(|report| Self::enrich(hub, report))
            .collect())
    }

    /// The caller's own reports, enriched for display.
    pub fn list_for_user(hub: &Hub, session: &Session) -> Vec<ReportRow> {
        hub.reports
            .iter()
            .filter(|report| report.user_id == session.user_id)
            .map(|report| Self::enrich(hub, report))
            .collect()
    }

    /// Every report in the hub. Admin-only.
    pub fn list_all(hub: &Hub, session: &Session) -> ServiceResult<Vec<ReportRow>> {
        ensure_admin(session, "listing all reports")?;
        Ok(hub
            .reports
            .iter()
            .map(|report| Self::enrich(hub, report))
            .collect())
    }

    /// Fetches one report; users may only read their own.
    pub fn get(hub: &Hub, session: &Session, id: Uuid) -> ServiceResult<ReportRow> {
        let report = hub
            .report(id)
            .ok_or_else(|| ServiceError::NotFound(format!("report `{id}`")))?;
        if !session.is_admin() && report.user_id != session.user_id {
            return Err(ServiceError::Unauthorized(
                "only admins may read other users' reports".into(),
            ));
        }
        Ok(Self::enrich(hub, report))
    }

    pub(crate) fn enrich(hub: &Hub, report: &Report) -> ReportRow {
        let template_name = hub
            .template(report.template_id)
            .map(|template| template.name.clone())
            .unwrap_or_else(|| "Unknown Template".into());
        let username = hub
            .user(report.user_id)
            .map(|user| user.username.clone())
            .unwrap_or_else(|| "Unknown User".into());
        let location_name = report
            .location_id
            .and_then(|id| hub.location(id))
            .map(|location| location.name.clone());
        ReportRow {
            report: report.clone(),
            template_name,
            username,
            location_name,
        }
    }
}
