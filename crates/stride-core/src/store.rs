//! Persisted key-value store.
//!
//! Every piece of tracker state lives in one of a handful of named records.
//! Records are opaque serialized strings to the store; the typed helpers
//! [`load_record`] and [`save_record`] own the JSON encoding. A record that
//! is present but cannot be decoded is treated as absent.

use crate::error::{Result, StrideError};
use crate::paths;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Mutex;

/// Record names.
pub mod keys {
    /// Daily completion grid and current week.
    pub const PROGRESS: &str = "progress";
    /// Per-week notes.
    pub const NOTES: &str = "notes";
    pub const THEME: &str = "theme";
    /// Streak counter and last activity date.
    pub const STREAK: &str = "streak";
    /// Per-week custom task additions and removals.
    pub const OVERLAY: &str = "overlay";

    pub const ALL: &[&str] = &[PROGRESS, NOTES, THEME, STREAK, OVERLAY];
}

// ---------------------------------------------------------------------------
// KvStore
// ---------------------------------------------------------------------------

pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `value` under `key`. Last write wins.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Receive the key name after every successful `set`.
    fn subscribe(&self) -> mpsc::Receiver<String>;
}

#[derive(Default)]
struct Subscribers {
    senders: Mutex<Vec<mpsc::Sender<String>>>,
}

impl Subscribers {
    fn add(&self) -> mpsc::Receiver<String> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut s) = self.senders.lock() {
            s.push(tx);
        }
        rx
    }

    fn notify(&self, key: &str) {
        if let Ok(mut s) = self.senders.lock() {
            s.retain(|tx| tx.send(key.to_string()).is_ok());
        }
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// One JSON file per record under `<data-dir>/store/`.
pub struct FileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
    subscribers: Subscribers,
}

impl FileStore {
    /// Open the store rooted at `data_dir`. The directory is created lazily
    /// on the first write.
    pub fn open(data_dir: &Path) -> Self {
        Self {
            dir: paths::store_dir(data_dir),
            write_lock: Mutex::new(()),
            subscribers: Subscribers::default(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        crate::io::read_optional(&paths::record_path(&self.dir, key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        {
            let _guard = self
                .write_lock
                .lock()
                .map_err(|_| StrideError::Store("write lock poisoned".into()))?;
            crate::io::atomic_write(&paths::record_path(&self.dir, key), value.as_bytes())?;
        }
        self.subscribers.notify(key);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<String> {
        self.subscribers.add()
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let records = self
            .records
            .lock()
            .map_err(|_| StrideError::Store("memory store poisoned".into()))?;
        Ok(records.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        {
            let mut records = self
                .records
                .lock()
                .map_err(|_| StrideError::Store("memory store poisoned".into()))?;
            records.insert(key.to_string(), value.to_string());
        }
        self.subscribers.notify(key);
        Ok(())
    }

    fn subscribe(&self) -> mpsc::Receiver<String> {
        self.subscribers.add()
    }
}

// ---------------------------------------------------------------------------
// Typed records
// ---------------------------------------------------------------------------

/// Load and decode a record, falling back to `T::default()` when the record
/// is absent or structurally incompatible.
pub fn load_record<T>(store: &dyn KvStore, key: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key)? else {
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::debug!(key, error = %e, "discarding unreadable record");
            Ok(T::default())
        }
    }
}

pub fn save_record<T: Serialize>(store: &dyn KvStore, key: &str, value: &T) -> Result<()> {
    let data = serde_json::to_string(value)?;
    store.set(key, &data)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
