//! Snapshot persistence.
//!
//! Each store is saved as one JSON record under its own key:
//!
//! ```text
//! doko_cart      → {"version": 1, "state": {"items": [...], "applied_coupon": null}}
//! doko_wishlist  → {"version": 1, "state": {"items": [...]}}
//! ```
//!
//! Reads happen once when a store opens. Writes go through a background
//! [`SnapshotWriter`] task so dispatching never waits on storage; a failed
//! write is logged and superseded by the next one, which always carries the
//! full state.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, instrument, warn};

use crate::error::PersistenceError;
use crate::store::Reducer;

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Durable key-value storage for snapshots.
#[async_trait]
pub trait DurableStore: Send + Sync + std::fmt::Debug {
    /// Read the record under `key`, or `None` if there is none.
    async fn load(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace the record under `key`.
    async fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Delete the record under `key`. Missing records are not an error.
    async fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

// =============================================================================
// Backends
// =============================================================================

/// In-process storage. State lives as long as the value does.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current raw record under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Seed a raw record, bypassing encoding.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), value.into());
    }
}

#[async_trait]
impl DurableStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.get(key))
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.insert(key, value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

/// Whether `key` can name a snapshot in every backend.
///
/// ASCII letters, digits, `_`, `-` and `.`, not starting with `.`.
#[must_use]
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.')
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file first and are renamed into place, so a
/// crash mid-write leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        if !is_valid_key(key) {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl DurableStore for FileStore {
    async fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Read {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let write_err = |source| PersistenceError::Write {
            key: key.to_string(),
            source,
        };

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(write_err)?;
        tokio::fs::write(&tmp, value).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(write_err)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(PersistenceError::Write {
                key: key.to_string(),
                source,
            }),
        }
    }
}

// =============================================================================
// Encoding
// =============================================================================

#[derive(Serialize)]
struct SnapshotRef<'a, S> {
    version: u32,
    state: &'a S,
}

#[derive(Deserialize)]
struct Snapshot<S> {
    version: u32,
    state: S,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: Option<u32>,
}

/// Encode state into a versioned snapshot record.
///
/// # Errors
///
/// Returns [`PersistenceError::Serialize`] if the state cannot be encoded.
pub fn encode<S: Serialize>(state: &S) -> Result<String, PersistenceError> {
    Ok(serde_json::to_string(&SnapshotRef {
        version: SCHEMA_VERSION,
        state,
    })?)
}

/// Decode a snapshot record and check the state's invariants.
///
/// # Errors
///
/// Returns [`PersistenceError::Read`] for malformed JSON or an unsupported
/// version, and [`PersistenceError::Invalid`] when the decoded state breaks
/// an invariant.
pub fn decode<R: Reducer>(key: &str, raw: &str) -> Result<R::State, PersistenceError> {
    let read_err = |reason: String| PersistenceError::Read {
        key: key.to_string(),
        reason,
    };

    let probe: VersionProbe = serde_json::from_str(raw).map_err(|e| read_err(e.to_string()))?;
    match probe.version {
        Some(SCHEMA_VERSION) => {}
        Some(other) => return Err(read_err(format!("unsupported schema version {other}"))),
        None => return Err(read_err("missing schema version".to_string())),
    }

    let snapshot: Snapshot<R::State> =
        serde_json::from_str(raw).map_err(|e| read_err(e.to_string()))?;
    debug_assert_eq!(snapshot.version, SCHEMA_VERSION);

    R::validate(&snapshot.state).map_err(|reason| PersistenceError::Invalid {
        key: key.to_string(),
        reason,
    })?;
    Ok(snapshot.state)
}

/// Load a store's initial state.
///
/// Missing, unreadable, or invalid snapshots all yield an empty state; the
/// bad record stays in place until the next write replaces it.
#[instrument(skip(storage))]
pub async fn hydrate<R: Reducer>(storage: &dyn DurableStore, key: &str) -> R::State {
    let raw = match storage.load(key).await {
        Ok(Some(raw)) => raw,
        Ok(None) => {
            debug!("No saved snapshot, starting empty");
            return R::State::default();
        }
        Err(e) => {
            warn!(error = %e, "Could not read snapshot, starting empty");
            return R::State::default();
        }
    };

    match decode::<R>(key, &raw) {
        Ok(state) => {
            debug!("Hydrated from snapshot");
            state
        }
        Err(e) => {
            warn!(error = %e, "Discarding snapshot, starting empty");
            R::State::default()
        }
    }
}

// =============================================================================
// Background writer
// =============================================================================

enum WriteCommand {
    Save(String),
    Flush(oneshot::Sender<()>),
}

/// Handle to the background task that writes snapshots for one key.
#[derive(Debug)]
pub struct SnapshotWriter {
    key: String,
    tx: mpsc::UnboundedSender<WriteCommand>,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WriteCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Save(payload) => f.debug_tuple("Save").field(&payload.len()).finish(),
            Self::Flush(_) => f.write_str("Flush"),
        }
    }
}

impl SnapshotWriter {
    /// Spawn the writer task. Must be called inside a Tokio runtime.
    #[must_use]
    pub fn spawn(storage: Arc<dyn DurableStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(run_writer(storage, key.clone(), rx));
        Self { key, tx, task }
    }

    /// The storage key this writer owns.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Queue an encoded snapshot. Never blocks.
    pub fn queue(&self, payload: String) {
        if self.tx.send(WriteCommand::Save(payload)).is_err() {
            error!(key = %self.key, "Snapshot writer has stopped, dropping write");
        }
    }

    /// Wait until every snapshot queued so far has been attempted.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(WriteCommand::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Flush and stop the writer task.
    pub async fn close(self) {
        self.flush().await;
        drop(self.tx);
        if let Err(e) = self.task.await {
            error!(key = %self.key, error = %e, "Snapshot writer task failed");
        }
    }
}

async fn run_writer(
    storage: Arc<dyn DurableStore>,
    key: String,
    mut rx: mpsc::UnboundedReceiver<WriteCommand>,
) {
    // Latest snapshot that failed to write; retried before acknowledging a flush.
    let mut unsaved: Option<String> = None;

    while let Some(command) = rx.recv().await {
        let mut latest = None;
        let mut acks = Vec::new();
        match command {
            WriteCommand::Save(payload) => latest = Some(payload),
            WriteCommand::Flush(ack) => acks.push(ack),
        }
        // Coalesce whatever else is already queued; only the newest state matters.
        while let Ok(next) = rx.try_recv() {
            match next {
                WriteCommand::Save(payload) => latest = Some(payload),
                WriteCommand::Flush(ack) => acks.push(ack),
            }
        }

        if let Some(payload) = latest.or_else(|| unsaved.take()) {
            unsaved = write_snapshot(storage.as_ref(), &key, payload).await;
        }
        for ack in acks {
            let _ = ack.send(());
        }
    }
    debug!(key = %key, "Snapshot writer stopped");
}

/// Returns the payload back if the write failed.
async fn write_snapshot(storage: &dyn DurableStore, key: &str, payload: String) -> Option<String> {
    match storage.save(key, &payload).await {
        Ok(()) => {
            debug!(key = %key, bytes = payload.len(), "Snapshot saved");
            None
        }
        Err(e) => {
            error!(key = %key, error = %e, "Failed to save snapshot, will retry on next change");
            Some(payload)
        }
    }
}
