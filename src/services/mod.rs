//! Stateless service layer. Each service validates a [`Session`] and applies
//! one logical operation to a [`crate::reporting::Hub`]; transports (HTTP,
//! RPC, CLI) stay outside this crate.

pub mod export_service;
pub mod field_service;
pub mod report_service;
pub mod template_service;

pub use export_service::{Export, ExportFormat, ExportService};
pub use field_service::{FieldDraft, FieldPatch, FieldService};
pub use report_service::{
    BulkAction, BulkFailure, BulkReport, ReportFilter, ReportRow, ReportService, SaveOutcome,
    SubmitRequest,
};
pub use template_service::{TemplatePatch, TemplateService};

use crate::errors::{SchemaError, StorageError, ValidationError};
use crate::reporting::Session;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("{0} not found")]
    NotFound(String),
    #[error("not authorized: {0}")]
    Unauthorized(String),
    #[error("{0}")]
    Invalid(String),
}

/// Admin gate shared by every privileged operation.
pub(crate) fn ensure_admin(session: &Session, action: &str) -> ServiceResult<()> {
    if session.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized(format!(
            "{action} requires an admin session"
        )))
    }
}
