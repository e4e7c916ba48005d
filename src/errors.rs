use thiserror::Error;
use uuid::Uuid;

/// Error type that captures invalid field schemas and template composition
/// failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("unknown field type `{0}`")]
    UnknownFieldType(String),
    #[error("field `{0}` needs at least one choice")]
    MissingChoices(String),
    #[error("a template needs at least one field")]
    EmptySelection,
    #[error("field reference `{0}` is unknown or deleted")]
    UnknownFieldReference(Uuid),
    #[error("field `{field}` does not accept a {given} value")]
    ValueMismatch { field: String, given: &'static str },
    #[error("`{choice}` is not a choice of field `{field}`")]
    UnknownChoice { field: String, choice: String },
}

/// Raised when a submission leaves required fields empty. Carries the data
/// keys of every offending field so callers can highlight them.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<String>,
}

impl ValidationError {
    pub fn new(missing: Vec<String>) -> Self {
        Self { missing }
    }
}

/// Error type for the persistence layer.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("hub `{0}` not found")]
    NotFound(String),
}
