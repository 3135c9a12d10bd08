use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stride_core::clock::SystemClock;
use stride_core::config::Config;
use stride_core::store::FileStore;
use stride_core::Tracker;

/// Resolve the data directory.
///
/// Priority:
/// 1. `--data-dir` flag / `STRIDE_HOME` env var (passed in as `explicit`)
/// 2. `~/.stride`
/// 3. `./.stride`
pub fn resolve_data_dir(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }
    match stride_core::paths::default_data_dir() {
        Ok(dir) => dir,
        Err(e) => {
            tracing::debug!(error = %e, "falling back to working directory");
            PathBuf::from(stride_core::paths::DEFAULT_DIR)
        }
    }
}

/// Load config and open a file-backed tracker under `data_dir`.
pub fn open(data_dir: &Path) -> anyhow::Result<(Tracker, Config)> {
    let config = Config::load(data_dir)
        .with_context(|| format!("reading config in {}", data_dir.display()))?;
    let curriculum = config
        .curriculum_source(data_dir)
        .context("loading curriculum")?;
    let tracker = Tracker::new(
        Arc::new(FileStore::open(data_dir)),
        curriculum,
        Arc::new(SystemClock),
    )?;
    Ok((tracker, config))
}

/// The requested week, or the current one.
pub fn week_or_current(tracker: &Tracker, week: Option<u32>) -> anyhow::Result<u32> {
    match week {
        Some(n) => Ok(n),
        None => Ok(tracker.current_week()?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_dir_wins() {
        let dir = TempDir::new().unwrap();
        assert_eq!(resolve_data_dir(Some(dir.path())), dir.path());
    }

    #[test]
    fn open_empty_dir() {
        let dir = TempDir::new().unwrap();
        let (tracker, config) = open(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(week_or_current(&tracker, None).unwrap(), 1);
        assert_eq!(week_or_current(&tracker, Some(9)).unwrap(), 9);
    }
}
