use std::path::Path;
use std::sync::Arc;

use stride_core::clock::SystemClock;
use stride_core::config::Config;
use stride_core::store::FileStore;
use stride_core::Tracker;
use tokio::sync::broadcast;

/// Shared state for all routes.
#[derive(Clone)]
pub struct AppState {
    pub tracker: Tracker,
    pub config: Arc<Config>,
    /// Bearer token for the upstream gateway; the relay refuses requests
    /// without one.
    pub gateway_key: Option<String>,
    pub http: reqwest::Client,
    /// Record key of every store write.
    pub event_tx: broadcast::Sender<String>,
}

impl AppState {
    pub fn new(tracker: Tracker, config: Config) -> Self {
        let (tx, _) = broadcast::channel(64);
        let gateway_key = std::env::var(&config.gateway.api_key_env)
            .ok()
            .filter(|k| !k.is_empty());

        // Forward store writes to SSE subscribers. The thread ends when the
        // store, and with it the sending side, is dropped.
        let writes = tracker.store().subscribe();
        let forward = tx.clone();
        let spawned = std::thread::Builder::new()
            .name("stride-events".into())
            .spawn(move || {
                while let Ok(key) = writes.recv() {
                    let _ = forward.send(key);
                }
            });
        if let Err(e) = spawned {
            tracing::warn!(error = %e, "store change events disabled");
        }

        Self {
            tracker,
            config: Arc::new(config),
            gateway_key,
            http: reqwest::Client::new(),
            event_tx: tx,
        }
    }

    /// File-backed state rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> anyhow::Result<Self> {
        let config = Config::load(data_dir)?;
        let curriculum = config.curriculum_source(data_dir)?;
        let tracker = Tracker::new(
            Arc::new(FileStore::open(data_dir)),
            curriculum,
            Arc::new(SystemClock),
        )?;
        Ok(Self::new(tracker, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stride_core::curriculum::BuiltinCurriculum;
    use stride_core::store::MemoryStore;
    use stride_core::types::Theme;

    #[test]
    fn store_writes_reach_event_subscribers() {
        let tracker = Tracker::new(
            Arc::new(MemoryStore::new()),
            Arc::new(BuiltinCurriculum::default()),
            Arc::new(SystemClock),
        )
        .unwrap();
        let state = AppState::new(tracker, Config::default());
        let mut rx = state.event_tx.subscribe();
        state.tracker.set_theme(Theme::Ocean).unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(2);
        loop {
            match rx.try_recv() {
                Ok(key) => {
                    assert_eq!(key, "theme");
                    break;
                }
                Err(_) if std::time::Instant::now() < deadline => {
                    std::thread::sleep(std::time::Duration::from_millis(10));
                }
                Err(e) => panic!("no event: {e}"),
            }
        }
    }

    #[test]
    fn open_uses_defaults_for_empty_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let state = AppState::open(dir.path()).unwrap();
        assert_eq!(state.tracker.total_weeks(), 175);
        assert_eq!(state.tracker.current_week().unwrap(), 1);
    }
}
