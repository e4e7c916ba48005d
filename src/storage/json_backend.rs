use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    errors::StorageError,
    reporting::Hub,
    utils::{ensure_dir, hubs_dir_in},
};

use super::{Result, StorageBackend};

const HUB_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// File-per-hub JSON persistence under the app data directory. Writes stage
/// through a temporary file so a crash never leaves a half-written hub.
#[derive(Clone)]
pub struct JsonStorage {
    hubs_dir: PathBuf,
}

impl JsonStorage {
    pub fn new(root: Option<PathBuf>) -> Result<Self> {
        let base = root.unwrap_or_else(crate::utils::app_data_dir);
        ensure_dir(&base)?;
        let hubs_dir = hubs_dir_in(&base);
        ensure_dir(&hubs_dir)?;
        Ok(Self { hubs_dir })
    }

    pub fn new_default() -> Result<Self> {
        Self::new(None)
    }

    pub fn hub_path(&self, name: &str) -> PathBuf {
        self.hubs_dir
            .join(format!("{}.{}", canonical_name(name), HUB_EXTENSION))
    }
}

impl StorageBackend for JsonStorage {
    fn save(&self, hub: &Hub, name: &str) -> Result<()> {
        save_hub_to_path(hub, &self.hub_path(name))
    }

    fn load(&self, name: &str) -> Result<Hub> {
        let path = self.hub_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        load_hub_from_path(&path)
    }

    fn list_hubs(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.hubs_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(HUB_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let path = self.hub_path(name);
        if !path.exists() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}

/// Writes the provided hub to disk atomically by staging to a temporary file.
pub fn save_hub_to_path(hub: &Hub, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    let json = serde_json::to_string_pretty(hub)?;
    let tmp = path.with_extension(TMP_SUFFIX);
    let mut file = File::create(&tmp)?;
    file.write_all(json.as_bytes())?;
    file.flush()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// Loads a hub snapshot from disk, returning structured errors on failure.
pub fn load_hub_from_path(path: &Path) -> Result<Hub> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn canonical_name(name: &str) -> String {
    let sanitized: String = name
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect();
    if sanitized.trim_matches('_').is_empty() {
        "hub".into()
    } else {
        sanitized
    }
}
