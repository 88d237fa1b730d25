//! Catalog error taxonomy with clear, actionable messages

use thiserror::Error;

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors that can occur during catalog operations.
///
/// Validation, duplicate and not-found errors are deterministic and are
/// reported to the caller verbatim. Container reachability is the only
/// retried failure class, and its message is deliberately generic: the
/// underlying probe detail is logged, not surfaced.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Bad caller input. Never retried.
    #[error("invalid input: {0}")]
    Validation(String),

    /// A product with the same name already exists in the catalog.
    #[error("product '{name}' already exists in the catalog")]
    Duplicate {
        /// The conflicting product name.
        name: String,
    },

    /// No product with this name exists in the catalog.
    #[error("product '{name}' not found in the catalog")]
    NotFound {
        /// The requested product name.
        name: String,
    },

    /// The artifact container could not be reached after bounded retries.
    #[error("container '{container_id}' is not reachable")]
    ContainerUnreachable {
        /// The container that failed the reachability probe.
        container_id: String,
    },

    /// No resolvable catalog source, or the resolved store is unreachable.
    /// Fatal to the calling request, not to the process.
    #[error("catalog configuration error: {0}")]
    ConfigLoad(String),

    /// Storage adapter failure (I/O, serialization).
    #[error("storage error: {message}")]
    Storage {
        /// Description of the storage failure.
        message: String,
    },
}

impl CatalogError {
    /// Build a storage error from any displayable cause.
    pub fn storage(message: impl std::fmt::Display) -> Self {
        CatalogError::Storage {
            message: message.to_string(),
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::storage(err)
    }
}

impl From<serde_yaml_ng::Error> for CatalogError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        CatalogError::storage(err)
    }
}
