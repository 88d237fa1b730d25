//! Validated catalog mutations
//!
//! Each operation is a one-shot validate -> verify -> write -> invalidate
//! pipeline with no persisted intermediate state. Reads go straight to the
//! store (never through the cache) so the duplicate and not-found checks
//! see current data; the cache is invalidated after every successful write
//! so the administrator who just changed data reads it back immediately.
//!
//! The backing store is single-writer, last-write-wins: two administrators
//! editing the same product concurrently can silently clobber each other.

use std::sync::Arc;

use serde::Deserialize;

use crate::error::{CatalogError, Result};
use crate::store::{ArtifactStore, CatalogStore};

use super::product::{Product, ProductDraft, ProductPatch, ProductRow};
use super::resolver::ConfigResolver;
use super::retry::{retry, RetryPolicy};

/// Human-readable outcome of a successful mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// Message suitable for direct display.
    pub message: String,
}

impl MutationOutcome {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// One operation in a bulk batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum BulkOp {
    /// Create a product.
    Add(ProductDraft),

    /// Patch an existing product.
    Update {
        /// Product to patch.
        name: String,
        /// Fields to change.
        #[serde(flatten)]
        patch: ProductPatch,
    },

    /// Flip a product's enabled state.
    Toggle {
        /// Product to toggle.
        name: String,
    },

    /// Remove a product.
    Delete {
        /// Product to remove.
        name: String,
    },
}

impl BulkOp {
    /// Short label for reports.
    pub fn describe(&self) -> String {
        match self {
            BulkOp::Add(draft) => format!("add '{}'", draft.name),
            BulkOp::Update { name, .. } => format!("update '{name}'"),
            BulkOp::Toggle { name } => format!("toggle '{name}'"),
            BulkOp::Delete { name } => format!("delete '{name}'"),
        }
    }
}

/// Per-item result of a bulk batch.
#[derive(Debug)]
pub struct BulkItem {
    /// Which operation this was.
    pub label: String,

    /// Outcome message or the error that stopped this item.
    pub result: Result<String>,
}

/// Outcome of [`CatalogMutator::bulk_apply`]. Partial success is expected
/// and reported, not treated as batch failure.
#[derive(Debug, Default)]
pub struct BulkReport {
    /// One entry per submitted operation, in order.
    pub items: Vec<BulkItem>,
}

impl BulkReport {
    /// Count of successful items.
    pub fn succeeded(&self) -> usize {
        self.items.iter().filter(|i| i.result.is_ok()).count()
    }

    /// Count of failed items.
    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

/// Applies validated create/update/delete/toggle operations against the
/// currently resolved catalog store.
pub struct CatalogMutator {
    resolver: Arc<ConfigResolver>,
    artifacts: Arc<dyn ArtifactStore>,
    retry_policy: RetryPolicy,
}

impl CatalogMutator {
    /// Build a mutator with the default reachability retry policy.
    pub fn new(resolver: Arc<ConfigResolver>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self {
            resolver,
            artifacts,
            retry_policy: RetryPolicy::default(),
        }
    }

    /// Override the reachability retry policy.
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Create a product. Validates input, rejects duplicates
    /// (case-insensitive), verifies the container is reachable, appends
    /// the row, and invalidates the cache. No partial writes on failure.
    pub async fn add_product(&self, draft: ProductDraft) -> Result<MutationOutcome> {
        let outcome = self.apply_add(draft).await?;
        self.resolver.invalidate();
        Ok(outcome)
    }

    /// Patch a product located by exact name. The container reachability
    /// check reruns only when the container actually changes; the whole
    /// row is replaced with the merged values. The name itself is
    /// immutable here - rename is delete + add, keeping shared links
    /// stable.
    pub async fn update_product(&self, name: &str, patch: &ProductPatch) -> Result<MutationOutcome> {
        let outcome = self.apply_update(name, patch).await?;
        self.resolver.invalidate();
        Ok(outcome)
    }

    /// Flip a product's enabled flag, returning the new state.
    pub async fn toggle_enabled(&self, name: &str) -> Result<bool> {
        let state = self.apply_toggle(name).await?;
        self.resolver.invalidate();
        Ok(state)
    }

    /// Remove a product. Deleting a name that does not exist is
    /// [`CatalogError::NotFound`], never a silent success.
    pub async fn delete_product(&self, name: &str) -> Result<MutationOutcome> {
        let outcome = self.apply_delete(name).await?;
        self.resolver.invalidate();
        Ok(outcome)
    }

    /// Apply a batch, collecting per-item errors without aborting, then
    /// invalidate the cache exactly once.
    pub async fn bulk_apply(&self, ops: Vec<BulkOp>) -> BulkReport {
        let mut report = BulkReport::default();
        for op in ops {
            let label = op.describe();
            let result = match op {
                BulkOp::Add(draft) => self.apply_add(draft).await.map(|o| o.message),
                BulkOp::Update { name, patch } => {
                    self.apply_update(&name, &patch).await.map(|o| o.message)
                }
                BulkOp::Toggle { name } => self.apply_toggle(&name).await.map(|enabled| {
                    format!(
                        "Product '{name}' is now {}",
                        if enabled { "enabled" } else { "disabled" }
                    )
                }),
                BulkOp::Delete { name } => self.apply_delete(&name).await.map(|o| o.message),
            };
            report.items.push(BulkItem { label, result });
        }
        self.resolver.invalidate();
        report
    }

    async fn apply_add(&self, draft: ProductDraft) -> Result<MutationOutcome> {
        draft.validate()?;

        let store = self.resolver.open_current().await?;
        let rows = store.read_rows().await?;
        if let Some(existing) = rows
            .iter()
            .find(|r| !r.name.trim().is_empty() && r.name.trim().eq_ignore_ascii_case(draft.name.trim()))
        {
            return Err(CatalogError::Duplicate {
                name: existing.name.trim().to_string(),
            });
        }

        self.verify_container(&draft.container_id).await?;

        let product = draft.into_product();
        store.append_row(product.to_row()).await?;
        Ok(MutationOutcome::new(format!(
            "Added product '{}'",
            product.name
        )))
    }

    async fn apply_update(&self, name: &str, patch: &ProductPatch) -> Result<MutationOutcome> {
        if let Some(container) = &patch.container_id {
            if container.trim().is_empty() {
                return Err(CatalogError::Validation(
                    "container id may not be blank".into(),
                ));
            }
        }

        let store = self.resolver.open_current().await?;
        let row = Self::locate(&store, name).await?;
        let current = Product::from_row_unchecked(&row);

        let updated = patch.apply(&current);
        if updated.container_id != current.container_id {
            self.verify_container(&updated.container_id).await?;
        }

        store.update_row(name, updated.to_row()).await?;
        Ok(MutationOutcome::new(format!("Updated product '{name}'")))
    }

    async fn apply_toggle(&self, name: &str) -> Result<bool> {
        let store = self.resolver.open_current().await?;
        let row = Self::locate(&store, name).await?;

        let mut product = Product::from_row_unchecked(&row);
        product.enabled = !product.enabled;
        store.update_row(name, product.to_row()).await?;
        Ok(product.enabled)
    }

    async fn apply_delete(&self, name: &str) -> Result<MutationOutcome> {
        let store = self.resolver.open_current().await?;
        Self::locate(&store, name).await?;

        store.delete_row(name).await?;
        Ok(MutationOutcome::new(format!("Deleted product '{name}'")))
    }

    /// Case-sensitive row lookup; absence is [`CatalogError::NotFound`].
    async fn locate(store: &Arc<dyn CatalogStore>, name: &str) -> Result<ProductRow> {
        let rows = store.read_rows().await?;
        rows.into_iter()
            .find(|r| r.name == name)
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
            })
    }

    /// Reachability probe with bounded retry. The retry absorbs transient
    /// backend latency only; a nonexistent container exhausts the same
    /// attempts and surfaces identically. Probe detail is logged, the
    /// caller sees the generic unreachable error.
    async fn verify_container(&self, container_id: &str) -> Result<()> {
        retry(self.retry_policy, || async move {
            match self.artifacts.exists(container_id).await {
                Ok(true) => Ok(()),
                Ok(false) => {
                    tracing::warn!(container = container_id, "container does not exist");
                    Err(CatalogError::ContainerUnreachable {
                        container_id: container_id.to_string(),
                    })
                }
                Err(err) => {
                    tracing::warn!(container = container_id, error = %err, "container probe failed");
                    Err(CatalogError::ContainerUnreachable {
                        container_id: container_id.to_string(),
                    })
                }
            }
        })
        .await
    }
}
