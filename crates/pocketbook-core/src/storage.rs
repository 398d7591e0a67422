//! Persistence: key-value blob stores, persisters and hydration
//!
//! Records are whole JSON documents stored under two keys, one for the
//! transaction list and one for the settings. A `Persister` decides how a
//! write reaches the store: `DirectPersister` writes synchronously, while
//! `QueuedPersister` hands writes to a single background writer task that
//! applies them strictly in enqueue order.

use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use pocketbook_config::DataConfig;

use crate::error::{CoreError, CoreResult};
use crate::models::{Settings, Transaction};

/// Blob storage addressed by key
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when nothing was ever stored under `key`
    fn load(&self, key: &str) -> CoreResult<Option<String>>;
    fn save(&self, key: &str, blob: &str) -> CoreResult<()>;
}

// ==================== File Store ====================

/// One `<key>.json` file per record inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::persistence(key, e.to_string())),
        }
    }

    fn save(&self, key: &str, blob: &str) -> CoreResult<()> {
        fs::create_dir_all(&self.dir).map_err(|e| CoreError::persistence(key, e.to_string()))?;

        // Write to a temp file, then rename over the record
        let path = self.path_for(key);
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, blob).map_err(|e| CoreError::persistence(key, e.to_string()))?;
        fs::rename(&temp_path, &path).map_err(|e| CoreError::persistence(key, e.to_string()))?;
        Ok(())
    }
}

// ==================== Memory Store ====================

/// Process-local store; can be told to fail writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `save` fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Put a raw blob, bypassing the failure switch
    pub fn insert(&self, key: &str, blob: &str) {
        self.with_records(|records| {
            records.insert(key.to_string(), blob.to_string());
        });
    }

    fn with_records<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> T {
        match self.records.lock() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.with_records(|records| records.get(key).cloned()))
    }

    fn save(&self, key: &str, blob: &str) -> CoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::persistence(key, "storage unavailable"));
        }
        self.insert(key, blob);
        Ok(())
    }
}

// ==================== Keys & Encoding ====================

/// Keys the two records are stored under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub transactions: String,
    pub settings: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            transactions: "transactions".to_string(),
            settings: "settings".to_string(),
        }
    }
}

impl StorageKeys {
    pub fn from_config(config: &DataConfig) -> Self {
        Self {
            transactions: config.transactions_key.clone(),
            settings: config.settings_key.clone(),
        }
    }
}

/// Full-record write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRequest {
    pub key: String,
    pub blob: String,
}

impl WriteRequest {
    pub fn transactions(key: &str, transactions: &[Transaction]) -> CoreResult<Self> {
        let blob = serde_json::to_string(transactions).map_err(|e| CoreError::SerializationError {
            message: e.to_string(),
        })?;
        Ok(Self {
            key: key.to_string(),
            blob,
        })
    }

    pub fn settings(key: &str, settings: &Settings) -> CoreResult<Self> {
        let blob = serde_json::to_string(settings).map_err(|e| CoreError::SerializationError {
            message: e.to_string(),
        })?;
        Ok(Self {
            key: key.to_string(),
            blob,
        })
    }
}

/// How far a state change made it towards storage
#[derive(Debug, Clone, PartialEq)]
pub enum Durability {
    /// Written, or there was nothing to write
    Persisted,
    /// Handed to the background writer
    Queued,
    /// The in-memory change stands but storage failed
    Degraded(Vec<CoreError>),
}

impl Durability {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Durability::Degraded(_))
    }

    /// Combine the results of several writes; failures win over queued
    pub fn and(self, other: Durability) -> Durability {
        match (self, other) {
            (Durability::Degraded(mut a), Durability::Degraded(b)) => {
                a.extend(b);
                Durability::Degraded(a)
            }
            (Durability::Degraded(a), _) | (_, Durability::Degraded(a)) => Durability::Degraded(a),
            (Durability::Queued, _) | (_, Durability::Queued) => Durability::Queued,
            _ => Durability::Persisted,
        }
    }
}

// ==================== Persisters ====================

/// Executes writes against a store
pub trait Persister {
    fn load(&self, key: &str) -> CoreResult<Option<String>>;
    fn persist(&self, request: WriteRequest) -> Durability;
}

/// Writes synchronously on the caller's thread
#[derive(Clone)]
pub struct DirectPersister {
    store: Arc<dyn KeyValueStore>,
}

impl DirectPersister {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }
}

impl Persister for DirectPersister {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        self.store.load(key)
    }

    fn persist(&self, request: WriteRequest) -> Durability {
        match self.store.save(&request.key, &request.blob) {
            Ok(()) => Durability::Persisted,
            Err(e) => Durability::Degraded(vec![e]),
        }
    }
}

enum QueueMessage {
    Write(WriteRequest),
    Flush(oneshot::Sender<()>),
}

/// Single-writer background queue. Writes are applied one at a time in the
/// order they were enqueued; failures are collected for the next `flush`.
pub struct WriteQueue {
    sender: mpsc::UnboundedSender<QueueMessage>,
    failures: Arc<Mutex<Vec<CoreError>>>,
    worker: JoinHandle<()>,
}

impl WriteQueue {
    /// Start the writer task. Must be called from within a tokio runtime.
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let worker = tokio::spawn(run_writer(receiver, store, failures.clone()));
        Self {
            sender,
            failures,
            worker,
        }
    }

    pub fn enqueue(&self, request: WriteRequest) -> CoreResult<()> {
        self.sender
            .send(QueueMessage::Write(request))
            .map_err(|_| CoreError::QueueClosed)
    }

    /// Wait until every write enqueued before this call has been applied,
    /// then report the failures collected since the last flush
    pub async fn flush(&self) -> Durability {
        let (done, wait) = oneshot::channel();
        if self.sender.send(QueueMessage::Flush(done)).is_err() || wait.await.is_err() {
            let mut failures = self.take_failures();
            failures.push(CoreError::QueueClosed);
            return Durability::Degraded(failures);
        }
        let failures = self.take_failures();
        if failures.is_empty() {
            Durability::Persisted
        } else {
            Durability::Degraded(failures)
        }
    }

    /// Drain pending writes and stop the writer task
    pub async fn shutdown(self) -> Durability {
        let durability = self.flush().await;
        drop(self.sender);
        if let Err(e) = self.worker.await {
            log::warn!("Write queue worker ended abnormally: {}", e);
        }
        durability
    }

    fn take_failures(&self) -> Vec<CoreError> {
        match self.failures.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

async fn run_writer(
    mut receiver: mpsc::UnboundedReceiver<QueueMessage>,
    store: Arc<dyn KeyValueStore>,
    failures: Arc<Mutex<Vec<CoreError>>>,
) {
    while let Some(message) = receiver.recv().await {
        match message {
            QueueMessage::Write(request) => {
                let key = request.key.clone();
                let target = store.clone();
                let result =
                    tokio::task::spawn_blocking(move || target.save(&request.key, &request.blob)).await;

                let failure = match result {
                    Ok(Ok(())) => {
                        log::debug!("Persisted record '{}'", key);
                        None
                    }
                    Ok(Err(e)) => Some(e),
                    Err(e) => Some(CoreError::persistence(&key, e.to_string())),
                };
                if let Some(error) = failure {
                    log::warn!("Background write failed: {}", error);
                    match failures.lock() {
                        Ok(mut guard) => guard.push(error),
                        Err(poisoned) => poisoned.into_inner().push(error),
                    }
                }
            }
            QueueMessage::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
}

/// Persister backed by a `WriteQueue`
pub struct QueuedPersister {
    store: Arc<dyn KeyValueStore>,
    queue: WriteQueue,
}

impl QueuedPersister {
    /// Must be called from within a tokio runtime
    pub fn spawn(store: Arc<dyn KeyValueStore>) -> Self {
        let queue = WriteQueue::spawn(store.clone());
        Self { store, queue }
    }

    pub async fn flush(&self) -> Durability {
        self.queue.flush().await
    }

    pub async fn shutdown(self) -> Durability {
        self.queue.shutdown().await
    }
}

impl Persister for QueuedPersister {
    fn load(&self, key: &str) -> CoreResult<Option<String>> {
        self.store.load(key)
    }

    fn persist(&self, request: WriteRequest) -> Durability {
        match self.queue.enqueue(request) {
            Ok(()) => Durability::Queued,
            Err(e) => Durability::Degraded(vec![e]),
        }
    }
}

// ==================== Hydration ====================

/// State read back from storage at startup
#[derive(Debug, Clone, Default)]
pub struct Hydrated {
    pub transactions: Vec<Transaction>,
    pub settings: Settings,
    /// Problems found while reading; the affected data fell back to defaults
    pub warnings: Vec<CoreError>,
}

/// Load both records. Never fails: unreadable or malformed data is replaced
/// by empty/default state and reported in `warnings`. Individual malformed
/// transactions are skipped.
pub fn hydrate<P: Persister + ?Sized>(persister: &P, keys: &StorageKeys) -> Hydrated {
    let mut hydrated = Hydrated::default();

    match persister.load(&keys.transactions) {
        Ok(None) => {}
        Ok(Some(text)) => match serde_json::from_str::<Vec<Value>>(&text) {
            Ok(entries) => {
                for (index, entry) in entries.into_iter().enumerate() {
                    let parsed = serde_json::from_value::<Transaction>(entry)
                        .map_err(|e| CoreError::validation(format!("transaction #{}: {}", index, e)))
                        .and_then(|tx| tx.validate().map(|_| tx));
                    match parsed {
                        Ok(tx) => hydrated.transactions.push(tx),
                        Err(e) => hydrated.warnings.push(e),
                    }
                }
            }
            Err(e) => hydrated.warnings.push(CoreError::SerializationError {
                message: format!("stored transactions are unreadable: {}", e),
            }),
        },
        Err(e) => hydrated.warnings.push(e),
    }

    match persister.load(&keys.settings) {
        Ok(None) => {}
        Ok(Some(text)) => match serde_json::from_str::<Settings>(&text) {
            Ok(settings) => hydrated.settings = settings,
            Err(e) => hydrated.warnings.push(CoreError::SerializationError {
                message: format!("stored settings are unreadable: {}", e),
            }),
        },
        Err(e) => hydrated.warnings.push(e),
    }

    hydrated
}

// ==================== Tests ====================
