use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::io::kv::{INBOX_KEY, KvStore, NOTES_KEY, NOW_KEY, PROJECTS_KEY, StoreError};
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::model::task::Task;
use crate::ops::store::{Outcome, TaskStore, Touched};

/// A loaded `TaskStore` bound to the key-value store it came from.
///
/// Mutations go through [`Session::apply`], which writes back exactly the
/// collections the operation touched. Writes are fire-and-forget: a failed
/// write is logged and its snapshot kept in the recovery log, and the
/// operation itself still succeeds.
pub struct Session<S: KvStore> {
    kv: S,
    store: TaskStore,
    /// Where recovery entries go; `None` disables the recovery log
    recovery_dir: Option<PathBuf>,
}

impl<S: KvStore> Session<S> {
    /// Load every collection. Missing keys load as empty; undecodable
    /// snapshots load as empty and are preserved in the recovery log.
    pub fn load(kv: S, recovery_dir: Option<&Path>) -> Result<Self, StoreError> {
        let recovery_dir = recovery_dir.map(Path::to_path_buf);
        let inbox: Vec<Task> = load_key(&kv, INBOX_KEY, recovery_dir.as_deref())?;
        let projects: IndexMap<String, Vec<Task>> =
            load_key(&kv, PROJECTS_KEY, recovery_dir.as_deref())?;
        let now: Vec<Task> = load_key(&kv, NOW_KEY, recovery_dir.as_deref())?;
        let notes: String = load_key(&kv, NOTES_KEY, recovery_dir.as_deref())?;

        let store = TaskStore::from_parts(inbox, projects, now, notes);
        info!(
            "event=store_load status=ok inbox={} projects={} now={}",
            store.inbox().len(),
            store.projects().len(),
            store.now().len()
        );
        Ok(Session {
            kv,
            store,
            recovery_dir,
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Run one store operation and persist what it touched
    pub fn apply<R: Outcome>(&mut self, op: impl FnOnce(&mut TaskStore) -> R) -> R {
        let outcome = op(&mut self.store);
        self.commit(outcome.touched());
        outcome
    }

    /// Write the snapshots named by `touched`
    pub fn commit(&mut self, touched: Touched) {
        if touched.is_empty() {
            debug!("event=commit status=skip reason=unchanged");
            return;
        }
        if touched.inbox {
            let snapshot = encode(INBOX_KEY, self.store.inbox());
            self.write(INBOX_KEY, snapshot);
        }
        if touched.projects {
            let snapshot = encode(PROJECTS_KEY, self.store.projects());
            self.write(PROJECTS_KEY, snapshot);
        }
        if touched.now {
            let snapshot = encode(NOW_KEY, self.store.now());
            self.write(NOW_KEY, snapshot);
        }
        if touched.notes {
            let snapshot = encode(NOTES_KEY, self.store.notes());
            self.write(NOTES_KEY, snapshot);
        }
    }

    fn write(&mut self, key: &str, snapshot: Result<String, StoreError>) {
        let json = match snapshot {
            Ok(json) => json,
            Err(e) => {
                warn!("event=snapshot_write status=error key={} error={}", key, e);
                return;
            }
        };
        match self.kv.set(key, &json) {
            Ok(()) => debug!(
                "event=snapshot_write status=ok key={} bytes={}",
                key,
                json.len()
            ),
            Err(e) => {
                warn!("event=snapshot_write status=error key={} error={}", key, e);
                self.record(
                    RecoveryEntry::new(RecoveryCategory::Write, "snapshot not saved", json)
                        .field("Key", key)
                        .field("Error", e.to_string()),
                );
            }
        }
    }

    fn record(&self, entry: RecoveryEntry) {
        if let Some(dir) = &self.recovery_dir {
            recovery::log_recovery(dir, entry);
        }
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string_pretty(value).map_err(|e| StoreError::SerializeError {
        key: key.to_string(),
        source: e,
    })
}

fn load_key<S: KvStore, T: DeserializeOwned + Default>(
    kv: &S,
    key: &str,
    recovery_dir: Option<&Path>,
) -> Result<T, StoreError> {
    let Some(raw) = kv.get(key)? else {
        debug!("event=snapshot_read status=missing key={}", key);
        return Ok(T::default());
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!(
                "event=snapshot_read status=error key={} error={} action=load_empty",
                key, e
            );
            if let Some(dir) = recovery_dir {
                recovery::log_recovery(
                    dir,
                    RecoveryEntry::new(RecoveryCategory::Parser, "unreadable snapshot", raw)
                        .field("Key", key)
                        .field("Error", e.to_string()),
                );
            }
            Ok(T::default())
        }
    }
}
