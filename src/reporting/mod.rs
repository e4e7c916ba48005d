//! Reporting domain models, persistence-friendly types, and helpers.

pub mod directory;
pub mod field;
pub mod hub;
pub mod period;
pub mod report;
pub mod template;

pub use directory::{Location, Role, Session, User};
pub use field::{FieldDefinition, FieldKind, FieldTypeInfo};
pub use hub::Hub;
pub use period::{ParsePeriodError, ReportPeriod};
pub use report::{FieldValue, Report, ReportData, ReportStatus};
pub use template::{ReportField, ReportTemplate, DEFAULT_CATEGORY};
