//! File-backed catalog store and override store
//!
//! The catalog store is a YAML file holding the list of product rows; the
//! file path doubles as the source id. Mutations rewrite the whole file,
//! which is fine under the single-writer assumption. The override store
//! is a YAML string map, written through on every `set`.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::ProductRow;
use crate::error::{CatalogError, Result};

use super::{CatalogStore, CatalogStoreProvider, OverrideStore};

/// Catalog store over a YAML row file.
pub struct FileCatalogStore {
    path: PathBuf,
}

impl FileCatalogStore {
    /// Open an existing row file. Fails when nothing exists at the path,
    /// which is what makes source validation meaningful.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.is_file() {
            return Err(CatalogError::storage(format!(
                "no catalog file at {}",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    /// Create an empty row file (unless one exists) and open it.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if !path.exists() {
            write_rows(&path, &[])?;
        }
        Self::open(path)
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<ProductRow>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| {
            CatalogError::storage(format!("failed to read {}: {e}", self.path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_yaml_ng::from_str(&content).map_err(|e| {
            CatalogError::storage(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    fn write(&self, rows: &[ProductRow]) -> Result<()> {
        write_rows(&self.path, rows)
    }
}

fn write_rows(path: &Path, rows: &[ProductRow]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = serde_yaml_ng::to_string(&rows)?;
    std::fs::write(path, content)
        .map_err(|e| CatalogError::storage(format!("failed to write {}: {e}", path.display())))
}

#[async_trait]
impl CatalogStore for FileCatalogStore {
    async fn read_rows(&self) -> Result<Vec<ProductRow>> {
        self.read()
    }

    async fn append_row(&self, row: ProductRow) -> Result<()> {
        let mut rows = self.read()?;
        rows.push(row);
        self.write(&rows)
    }

    async fn update_row(&self, name: &str, row: ProductRow) -> Result<()> {
        let mut rows = self.read()?;
        match rows.iter_mut().find(|r| r.name == name) {
            Some(slot) => *slot = row,
            None => {
                return Err(CatalogError::NotFound {
                    name: name.to_string(),
                })
            }
        }
        self.write(&rows)
    }

    async fn delete_row(&self, name: &str) -> Result<()> {
        let mut rows = self.read()?;
        let before = rows.len();
        rows.retain(|r| r.name != name);
        if rows.len() == before {
            return Err(CatalogError::NotFound {
                name: name.to_string(),
            });
        }
        self.write(&rows)
    }
}

/// Provider treating source ids as row-file paths.
#[derive(Debug, Default, Clone)]
pub struct FileCatalogProvider;

#[async_trait]
impl CatalogStoreProvider for FileCatalogProvider {
    async fn open(&self, source_id: &str) -> Result<Arc<dyn CatalogStore>> {
        Ok(Arc::new(FileCatalogStore::open(source_id)?))
    }
}

/// Key-value override store over a YAML map file.
///
/// Reads are best-effort: a missing or unparseable file reads as empty
/// (source resolution must not fail), with the parse problem logged.
pub struct FileOverrides {
    path: PathBuf,
}

impl FileOverrides {
    /// Build an override store at the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> BTreeMap<String, String> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(_) => return BTreeMap::new(),
        };
        match serde_yaml_ng::from_str(&content) {
            Ok(map) => map,
            Err(err) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %err,
                    "ignoring unparseable override file"
                );
                BTreeMap::new()
            }
        }
    }
}

impl OverrideStore for FileOverrides {
    fn get(&self, key: &str) -> Option<String> {
        self.load().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self.load();
        map.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(&map)?;
        std::fs::write(&self.path, content).map_err(|e| {
            CatalogError::storage(format!("failed to write {}: {e}", self.path.display()))
        })
    }
}
