use crate::storage::records::{Counters, Session};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Session collection, one JSON array per file.
pub const SESSIONS_FILE: &str = "analytics_data.json";
/// Running totals.
pub const COUNTERS_FILE: &str = "counters.json";

/// Whole-file JSON persistence for sessions and counters.
///
/// Every mutation reads the full file, applies the change in memory, and
/// rewrites the file. A single lock serializes those cycles; without it two
/// concurrent writers would each rewrite from their own stale read and drop
/// the other's update.
///
/// Reads never fail: a missing, unreadable, or unparseable file yields the
/// empty collection so the service can always start. Writes go to a
/// temporary file first and are renamed into place, so readers never observe
/// a partially written file.
pub struct FileStore {
    data_dir: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            data_dir: data_dir.to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn sessions_path(&self) -> PathBuf {
        self.data_dir.join(SESSIONS_FILE)
    }

    pub fn counters_path(&self) -> PathBuf {
        self.data_dir.join(COUNTERS_FILE)
    }

    /// Read the full session collection.
    pub fn read_sessions(&self) -> Vec<Session> {
        let _guard = self.lock.lock();
        self.load_sessions()
    }

    /// Read the running totals.
    pub fn read_counters(&self) -> Counters {
        let _guard = self.lock.lock();
        self.load_counters()
    }

    /// Read both records under one lock acquisition, so aggregation sees a
    /// consistent pair.
    pub fn snapshot(&self) -> (Vec<Session>, Counters) {
        let _guard = self.lock.lock();
        (self.load_sessions(), self.load_counters())
    }

    /// Run one read-modify-write cycle over both records.
    ///
    /// Both files are rewritten even when the first write fails; the first
    /// failure is returned. Callers on the ingestion path treat that error
    /// as log-and-continue, since the mutation itself already happened.
    pub fn update<T>(
        &self,
        mutate: impl FnOnce(&mut Vec<Session>, &mut Counters) -> T,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.lock();
        let mut sessions = self.load_sessions();
        let mut counters = self.load_counters();

        let out = mutate(&mut sessions, &mut counters);

        let sessions_written = write_json(&self.sessions_path(), &sessions);
        let counters_written = write_json(&self.counters_path(), &counters);
        sessions_written.and(counters_written)?;

        Ok(out)
    }

    fn load_sessions(&self) -> Vec<Session> {
        read_json_or_default(&self.sessions_path())
    }

    fn load_counters(&self) -> Counters {
        read_json_or_default(&self.counters_path())
    }
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    if !path.exists() {
        return T::default();
    }
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to read store file, starting empty");
            return T::default();
        }
    };
    match serde_json::from_str(&contents) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, path = %path.display(), "Failed to parse store file, starting empty");
            T::default()
        }
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(value).map_err(StoreError::Serialize)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).map_err(StoreError::Io)?;
    fs::rename(&tmp, path).map_err(StoreError::Io)?;
    Ok(())
}

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Serialize(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "Store I/O error: {e}"),
            Self::Serialize(e) => write!(f, "Store serialization error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}
