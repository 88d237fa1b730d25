//! In-process store fakes
//!
//! Backends for tests and embedding: a row store that counts reads (for
//! cache assertions), a provider keyed by source id, an artifact store
//! with an injectable probe-failure budget (for retry assertions), and a
//! plain in-memory key-value store.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::catalog::ProductRow;
use crate::error::{CatalogError, Result};

use super::{Artifact, ArtifactStore, CatalogStore, CatalogStoreProvider, OverrideStore};

/// In-memory catalog store with a read counter.
#[derive(Default)]
pub struct MemoryCatalogStore {
    rows: Mutex<Vec<ProductRow>>,
    reads: AtomicUsize,
}

impl MemoryCatalogStore {
    /// Build a store seeded with rows.
    pub fn new(rows: Vec<ProductRow>) -> Self {
        Self {
            rows: Mutex::new(rows),
            reads: AtomicUsize::new(0),
        }
    }

    /// How many times `read_rows` has been called.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Current number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.lock().expect("row lock poisoned").len()
    }

    /// Snapshot of the current rows.
    pub fn rows(&self) -> Vec<ProductRow> {
        self.rows.lock().expect("row lock poisoned").clone()
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn read_rows(&self) -> Result<Vec<ProductRow>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows())
    }

    async fn append_row(&self, row: ProductRow) -> Result<()> {
        self.rows.lock().expect("row lock poisoned").push(row);
        Ok(())
    }

    async fn update_row(&self, name: &str, row: ProductRow) -> Result<()> {
        let mut rows = self.rows.lock().expect("row lock poisoned");
        match rows.iter_mut().find(|r| r.name == name) {
            Some(slot) => {
                *slot = row;
                Ok(())
            }
            None => Err(CatalogError::NotFound {
                name: name.to_string(),
            }),
        }
    }

    async fn delete_row(&self, name: &str) -> Result<()> {
        let mut rows = self.rows.lock().expect("row lock poisoned");
        let before = rows.len();
        rows.retain(|r| r.name != name);
        if rows.len() == before {
            return Err(CatalogError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}

/// Provider mapping source ids to in-memory stores.
#[derive(Default)]
pub struct MemoryProvider {
    stores: Mutex<HashMap<String, Arc<MemoryCatalogStore>>>,
}

impl MemoryProvider {
    /// Register a store under a source id.
    pub fn insert(&self, source_id: &str, store: Arc<MemoryCatalogStore>) {
        self.stores
            .lock()
            .expect("store lock poisoned")
            .insert(source_id.to_string(), store);
    }
}

#[async_trait]
impl CatalogStoreProvider for MemoryProvider {
    async fn open(&self, source_id: &str) -> Result<Arc<dyn CatalogStore>> {
        self.stores
            .lock()
            .expect("store lock poisoned")
            .get(source_id)
            .cloned()
            .map(|s| s as Arc<dyn CatalogStore>)
            .ok_or_else(|| CatalogError::storage(format!("no catalog store at '{source_id}'")))
    }
}

/// In-memory artifact store with failure injection for the probe path.
#[derive(Default)]
pub struct MemoryArtifactStore {
    containers: Mutex<HashMap<String, Vec<Artifact>>>,
    probe_failures: AtomicUsize,
}

impl MemoryArtifactStore {
    /// Register a container with its artifacts.
    pub fn insert_container(&self, container_id: &str, artifacts: Vec<Artifact>) {
        self.containers
            .lock()
            .expect("container lock poisoned")
            .insert(container_id.to_string(), artifacts);
    }

    /// Make the next `count` probes fail with a storage error,
    /// simulating transient backend trouble.
    pub fn fail_probes(&self, count: usize) {
        self.probe_failures.store(count, Ordering::SeqCst);
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn list_artifacts(&self, container_id: &str) -> Result<Vec<Artifact>> {
        self.containers
            .lock()
            .expect("container lock poisoned")
            .get(container_id)
            .cloned()
            .ok_or_else(|| CatalogError::ContainerUnreachable {
                container_id: container_id.to_string(),
            })
    }

    async fn exists(&self, container_id: &str) -> Result<bool> {
        let remaining = self.probe_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.probe_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CatalogError::storage("injected probe failure"));
        }
        Ok(self
            .containers
            .lock()
            .expect("container lock poisoned")
            .contains_key(container_id))
    }
}

/// In-memory key-value store.
#[derive(Default)]
pub struct MemoryOverrides {
    values: Mutex<HashMap<String, String>>,
}

impl OverrideStore for MemoryOverrides {
    fn get(&self, key: &str) -> Option<String> {
        self.values
            .lock()
            .expect("override lock poisoned")
            .get(key)
            .cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .expect("override lock poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
