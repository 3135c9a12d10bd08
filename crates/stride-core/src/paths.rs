use crate::error::{Result, StrideError};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const DEFAULT_DIR: &str = ".stride";
pub const STORE_DIR: &str = "store";
pub const CONFIG_FILE: &str = "stride.yaml";
pub const RECORD_EXT: &str = "json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

pub fn store_dir(data_dir: &Path) -> PathBuf {
    data_dir.join(STORE_DIR)
}

pub fn record_path(store_dir: &Path, key: &str) -> PathBuf {
    store_dir.join(format!("{key}.{RECORD_EXT}"))
}

/// Default data directory: `~/.stride`.
pub fn default_data_dir() -> Result<PathBuf> {
    home::home_dir()
        .map(|h| h.join(DEFAULT_DIR))
        .ok_or(StrideError::HomeNotFound)
}
