//! Docshelf Catalog - template resolution and catalog management
//!
//! This module resolves stable product names to versioned template
//! artifacts and manages the catalog behind them.
//!
//! # Overview
//!
//! - Resolve which catalog store is authoritative (runtime override,
//!   deploy-time default, or single-container fallback)
//! - Load and cache the typed catalog with a TTL
//! - Select "latest" or a specific version from a container's artifacts
//! - Apply validated create/update/delete/toggle mutations with
//!   duplicate detection and container verification
//!
//! # Architecture
//!
//! ```text
//! Router (CLI)
//!     │
//!     ├── ConfigResolver ── override ≻ default ≻ fallback
//!     │        │
//!     │        ├── CatalogCache (TTL, invalidated on mutation)
//!     │        └── CatalogStore ← rows → Catalog of Products
//!     │
//!     ├── VersionSelector ── latest / by-version over Artifacts
//!     │
//!     └── CatalogMutator ── validate → verify container → write
//!                                │
//!                                └── ConfigResolver.invalidate()
//! ```

mod cache;
mod mutator;
mod product;
mod resolver;
mod retry;
mod versions;

pub use cache::{CatalogCache, DEFAULT_CACHE_TTL};
pub use mutator::{BulkItem, BulkOp, BulkReport, CatalogMutator, MutationOutcome};
pub use product::{
    Catalog, Product, ProductDraft, ProductPatch, ProductRow, DEFAULT_CATEGORY,
};
pub use resolver::{
    ConfigResolver, SourceRef, FALLBACK_PRODUCT_NAME, SOURCE_OVERRIDE_KEY,
};
pub use retry::{retry, RetryPolicy};
pub use versions::{
    describe_versions, detected_versions, select_by_version, select_latest, NONE_DETECTED,
};
