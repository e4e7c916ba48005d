use std::sync::Once;
use std::{env, fs, io, path::Path, path::PathBuf};

use dirs::home_dir;

const DEFAULT_DIR_NAME: &str = ".report_core";
const HUB_DIR: &str = "hubs";
const CONFIG_FILE: &str = "config.json";

static TRACING_INIT: Once = Once::new();

/// Initializes the global tracing subscriber with sensible defaults.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter =
            EnvFilter::from_default_env().add_directive("report_core=info".parse().unwrap());

        fmt().with_env_filter(filter).init();
    });
}

/// Returns the application-specific data directory, defaulting to `~/.report_core`.
pub fn app_data_dir() -> PathBuf {
    if let Some(custom) = env::var_os("REPORT_CORE_HOME") {
        return PathBuf::from(custom);
    }
    home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

/// Absolute path to the managed hubs directory.
pub fn hubs_dir_in(base: &Path) -> PathBuf {
    base.join(HUB_DIR)
}

/// Path to the configuration file inside the app data directory.
pub fn config_file_in(base: &Path) -> PathBuf {
    base.join(CONFIG_FILE)
}

/// Creates a directory (and parents) when it does not exist yet.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Derives the stable data key used for a field label (`"Employee Name"` →
/// `"employee_name"`). Non-alphanumeric runs collapse into single underscores.
pub fn slugify(label: &str) -> String {
    let mut slug = String::with_capacity(label.len());
    let mut last_was_separator = true;
    for ch in label.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_was_separator = false;
        } else if !last_was_separator {
            slug.push('_');
            last_was_separator = true;
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::slugify;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Employee Name"), "employee_name");
        assert_eq!(slugify("  Amount (USD) "), "amount_usd");
        assert_eq!(slugify("On-call?"), "on_call");
    }

    #[test]
    fn slugify_keeps_plain_labels() {
        assert_eq!(slugify("status"), "status");
    }
}
