use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::StorageError;
use crate::utils::{app_data_dir, config_file_in, ensure_dir};

const TMP_SUFFIX: &str = "tmp";

/// Application-level settings persisted alongside the hubs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Category assigned to templates composed without an explicit one.
    pub default_category: String,
    /// Hub opened when the caller does not name one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_hub: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_category: crate::reporting::DEFAULT_CATEGORY.into(),
            default_hub: None,
        }
    }
}

pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self, StorageError> {
        Self::from_base(app_data_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, StorageError> {
        Self::from_base(base)
    }

    fn from_base(base: PathBuf) -> Result<Self, StorageError> {
        ensure_dir(&base)?;
        Ok(Self {
            path: config_file_in(&base),
        })
    }

    /// Loads the stored configuration, falling back to defaults when none
    /// has been saved yet.
    pub fn load(&self) -> Result<Config, StorageError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            Ok(serde_json::from_str(&data)?)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension(TMP_SUFFIX)
}

fn write_file(path: &Path, data: &str) -> Result<(), StorageError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
