use std::{
    collections::HashMap,
    io,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use metrohash::MetroBuildHasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::State;

/// Bare cell contents of a world, `columns[x][y]`, without any dimension or catalog metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(Vec<Vec<State>>);

impl Snapshot {
    pub fn new(columns: Vec<Vec<State>>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[Vec<State>] {
        &self.0
    }

    pub fn columns_mut(&mut self) -> &mut [Vec<State>] {
        &mut self.0
    }

    pub fn into_columns(self) -> Vec<Vec<State>> {
        self.0
    }

    pub fn width(&self) -> usize {
        self.0.len()
    }

    /// height of the first column, ragged snapshots are caught when restored into a world.
    pub fn height(&self) -> usize {
        self.0.first().map_or(0, Vec::len)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<State> {
        self.0.get(x).and_then(|column| column.get(y)).copied()
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed json snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed rle snapshot: {0}")]
    Codec(#[from] rle::CodecError),
}

/// Persistence collaborator holding at most one snapshot.
pub trait Storage: Send + Sync {
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StorageError>;

    /// `None` when nothing was saved yet.
    fn restore(&self) -> Result<Option<Snapshot>, StorageError>;

    fn clear(&mut self) -> Result<(), StorageError>;
}

/// Thread safe string key/value store, cheap to clone and shared between storages.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Arc<Mutex<HashMap<String, String, MetroBuildHasher>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: String) {
        self.lock().insert(key.to_string(), value);
    }

    pub fn remove(&self, key: &str) {
        self.lock().remove(key);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String, MetroBuildHasher>> {
        // the map stays consistent even if a holder panicked
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Stores the snapshot as json under a key of a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    store: MemoryStore,
    key: String,
}

impl MemoryStorage {
    pub fn new(store: MemoryStore, key: impl Into<String>) -> Self {
        let key = key.into();
        Self { store, key }
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Storage for MemoryStorage {
    fn save(&mut self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let payload = serde_json::to_string(snapshot)?;
        self.store.set(&self.key, payload);
        Ok(())
    }

    fn restore(&self) -> Result<Option<Snapshot>, StorageError> {
        self.store
            .get(&self.key)
            .map(|payload| serde_json::from_str(&payload))
            .transpose()
            .map_err(Into::into)
    }

    fn clear(&mut self) -> Result<(), StorageError> {
        self.store.remove(&self.key);
        Ok(())
    }
}

pub use file::{FileStorage, Format};
mod file;

pub mod rle;
