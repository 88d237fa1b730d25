//! Storage collaborator traits and adapters
//!
//! The catalog engine never talks to a concrete backend directly. It sees
//! three narrow collaborators:
//!
//! - [`CatalogStore`]: a tabular record store (rows = products). Rows are
//!   addressed by product name; each adapter owns the translation from name
//!   to whatever positional addressing its backend requires.
//! - [`ArtifactStore`]: enumerates candidate artifacts within an opaque
//!   container and answers cheap reachability probes.
//! - [`OverrideStore`]: a string key-value store backing the runtime
//!   source override, which must survive process restarts.
//!
//! Shipped adapters: [`file`] (YAML row file + YAML overrides map),
//! [`dir`] (filesystem directories as containers), and [`memory`]
//! (in-process fakes with call counting and failure injection for tests).

mod dir;
mod file;
mod memory;

pub use dir::DirArtifactStore;
pub use file::{FileCatalogProvider, FileCatalogStore, FileOverrides};
pub use memory::{MemoryArtifactStore, MemoryCatalogStore, MemoryOverrides, MemoryProvider};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use crate::catalog::ProductRow;
use crate::error::Result;

/// A candidate file within a container. Read-only input to version
/// selection; never mutated by this system.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifact {
    /// File name as stored in the container.
    pub name: String,

    /// Creation timestamp, used for "latest" selection.
    pub created_at: DateTime<Utc>,

    /// Dereferenceable locator handed back to resolution callers.
    pub locator: String,
}

impl Artifact {
    /// Convenience constructor.
    pub fn new(
        name: impl Into<String>,
        created_at: DateTime<Utc>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            created_at,
            locator: locator.into(),
        }
    }
}

/// Tabular record store holding the product catalog.
///
/// Single-writer, last-write-wins: there is no optimistic concurrency and
/// two administrators mutating the same row can clobber each other.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Read every row in the store, in storage order.
    async fn read_rows(&self) -> Result<Vec<ProductRow>>;

    /// Append a new row.
    async fn append_row(&self, row: ProductRow) -> Result<()>;

    /// Replace the row whose name matches `name` with `row`.
    async fn update_row(&self, name: &str, row: ProductRow) -> Result<()>;

    /// Delete the row whose name matches `name`.
    async fn delete_row(&self, name: &str) -> Result<()>;
}

/// Opens a [`CatalogStore`] given an opaque source identifier.
///
/// `open` fails when no store exists at the identifier; this single check
/// backs both load-time errors and source-override validation.
#[async_trait]
pub trait CatalogStoreProvider: Send + Sync {
    /// Open the store at `source_id`.
    async fn open(&self, source_id: &str) -> Result<Arc<dyn CatalogStore>>;
}

/// Enumerates artifacts within opaque containers.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// List the candidate artifacts in `container_id`.
    ///
    /// Fails with [`crate::CatalogError::ContainerUnreachable`] when the
    /// container does not exist or is inaccessible.
    async fn list_artifacts(&self, container_id: &str) -> Result<Vec<Artifact>>;

    /// Cheap reachability probe used by the mutator's retry loop.
    async fn exists(&self, container_id: &str) -> Result<bool>;
}

/// String key-value store for runtime-settable configuration.
pub trait OverrideStore: Send + Sync {
    /// Read a value. Absence is not an error.
    fn get(&self, key: &str) -> Option<String>;

    /// Persist a value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
