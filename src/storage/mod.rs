pub mod json_backend;

use std::path::Path;

use crate::{errors::StorageError, reporting::Hub};

pub type Result<T> = std::result::Result<T, StorageError>;

/// Abstraction over persistence backends capable of storing hubs. The core
/// never talks to a datastore directly; everything goes through this trait.
pub trait StorageBackend: Send + Sync {
    fn save(&self, hub: &Hub, name: &str) -> Result<()>;
    fn load(&self, name: &str) -> Result<Hub>;
    fn list_hubs(&self) -> Result<Vec<String>>;
    fn delete(&self, name: &str) -> Result<()>;

    /// Optional helpers for ad-hoc file operations. Default implementations
    /// forward to the JSON codec when not overridden.
    fn save_to_path(&self, hub: &Hub, path: &Path) -> Result<()> {
        json_backend::save_hub_to_path(hub, path)
    }

    fn load_from_path(&self, path: &Path) -> Result<Hub> {
        json_backend::load_hub_from_path(path)
    }
}

pub use json_backend::JsonStorage;
