//! Directory-backed artifact store
//!
//! Containers are directories; each regular file inside is one artifact.
//! Creation timestamps come from filesystem metadata (modification time
//! where the platform does not track creation), and locators are the
//! files' paths. Listing is sorted by file name so tie-breaking in
//! version selection is deterministic across platforms.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::time::SystemTime;

use crate::error::{CatalogError, Result};

use super::{Artifact, ArtifactStore};

/// Artifact store treating container ids as directory paths.
#[derive(Debug, Default, Clone)]
pub struct DirArtifactStore;

impl DirArtifactStore {
    /// Build the store.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ArtifactStore for DirArtifactStore {
    async fn list_artifacts(&self, container_id: &str) -> Result<Vec<Artifact>> {
        let dir = Path::new(container_id);
        if !dir.is_dir() {
            tracing::warn!(container = container_id, "container directory does not exist");
            return Err(CatalogError::ContainerUnreachable {
                container_id: container_id.to_string(),
            });
        }

        let entries = std::fs::read_dir(dir).map_err(|e| {
            tracing::warn!(container = container_id, error = %e, "failed to list container");
            CatalogError::ContainerUnreachable {
                container_id: container_id.to_string(),
            }
        })?;

        let mut artifacts = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                tracing::warn!(container = container_id, error = %e, "failed to read entry");
                CatalogError::ContainerUnreachable {
                    container_id: container_id.to_string(),
                }
            })?;

            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let metadata = std::fs::metadata(&path)?;
            let created: SystemTime = metadata
                .created()
                .or_else(|_| metadata.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);

            artifacts.push(Artifact {
                name: entry.file_name().to_string_lossy().into_owned(),
                created_at: DateTime::<Utc>::from(created),
                locator: path.display().to_string(),
            });
        }

        artifacts.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(artifacts)
    }

    async fn exists(&self, container_id: &str) -> Result<bool> {
        Ok(Path::new(container_id).is_dir())
    }
}

#[cfg(test)]
mod dir_tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_list_artifacts_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("T-v1.0.docx"), b"one").unwrap();
        std::fs::write(temp_dir.path().join("T-v2.0.docx"), b"two").unwrap();
        std::fs::create_dir(temp_dir.path().join("subdir")).unwrap();

        let store = DirArtifactStore::new();
        let artifacts = store
            .list_artifacts(temp_dir.path().to_str().unwrap())
            .await
            .unwrap();

        // Only regular files, sorted by name
        assert_eq!(artifacts.len(), 2);
        assert_eq!(artifacts[0].name, "T-v1.0.docx");
        assert_eq!(artifacts[1].name, "T-v2.0.docx");
        assert!(artifacts[0].locator.ends_with("T-v1.0.docx"));
    }

    #[tokio::test]
    async fn test_missing_container_is_unreachable() {
        let store = DirArtifactStore::new();
        assert!(matches!(
            store.list_artifacts("/nonexistent/container").await,
            Err(CatalogError::ContainerUnreachable { .. })
        ));
    }

    #[tokio::test]
    async fn test_exists_probe() {
        let temp_dir = TempDir::new().unwrap();
        let store = DirArtifactStore::new();

        assert!(store
            .exists(temp_dir.path().to_str().unwrap())
            .await
            .unwrap());
        assert!(!store.exists("/nonexistent/container").await.unwrap());
    }
}
