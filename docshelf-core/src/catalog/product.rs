//! Product model and tabular row parsing
//!
//! The catalog backend stores products as rows of plain strings
//! (`enabled` as the literals `TRUE`/`FALSE`, `tags` comma-separated).
//! Parsing those rows into typed [`Product`]s lives here, together with
//! the validated inputs for catalog mutations.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Result};

/// Category assigned when a row leaves the field blank.
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

/// Product names are stable, shareable identifiers: letters, digits,
/// underscore and hyphen only.
static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[A-Za-z0-9_-]+$").expect("name pattern is a valid regex"));

/// A raw catalog row as stored by the backend. All fields are strings;
/// required-field checks and defaulting happen at parse time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRow {
    /// Unique product name.
    #[serde(default)]
    pub name: String,

    /// Opaque artifact container reference.
    #[serde(default)]
    pub container_id: String,

    /// Human label; blank means "use the name".
    #[serde(default)]
    pub display_name: String,

    /// `TRUE`/`FALSE`, case-insensitive on read; blank means enabled.
    #[serde(default)]
    pub enabled: String,

    /// Free-form description.
    #[serde(default)]
    pub description: String,

    /// Free-form category; blank means [`DEFAULT_CATEGORY`].
    #[serde(default)]
    pub category: String,

    /// Comma-separated tag tokens.
    #[serde(default)]
    pub tags: String,
}

/// A typed catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Unique, immutable identifier. Case-sensitive for identity.
    pub name: String,

    /// Opaque reference to an artifact container.
    pub container_id: String,

    /// Human label shown to callers.
    pub display_name: String,

    /// Controls visibility to end-resolution callers, not to
    /// administrative listing.
    pub enabled: bool,

    /// Free-form description.
    pub description: String,

    /// Free-form category.
    pub category: String,

    /// Ordered set of short tag strings.
    pub tags: Vec<String>,
}

impl Product {
    /// Parse a row into a product, or `None` when a required field
    /// (`name`, `containerId`) is missing.
    pub fn from_row(row: &ProductRow) -> Option<Self> {
        if row.name.trim().is_empty() || row.container_id.trim().is_empty() {
            return None;
        }
        Some(Self::from_row_unchecked(row))
    }

    /// Parse a row without the required-field check, applying defaults.
    /// Used on rows already located by name, where a half-filled row must
    /// still be patchable.
    pub(crate) fn from_row_unchecked(row: &ProductRow) -> Self {
        let name = row.name.trim().to_string();
        let display_name = if row.display_name.trim().is_empty() {
            name.clone()
        } else {
            row.display_name.trim().to_string()
        };
        let category = if row.category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            row.category.trim().to_string()
        };

        Self {
            name,
            container_id: row.container_id.trim().to_string(),
            display_name,
            enabled: parse_enabled(&row.enabled),
            description: row.description.trim().to_string(),
            category,
            tags: parse_tags(&row.tags),
        }
    }

    /// Serialize back into the tabular row format.
    pub fn to_row(&self) -> ProductRow {
        ProductRow {
            name: self.name.clone(),
            container_id: self.container_id.clone(),
            display_name: self.display_name.clone(),
            enabled: if self.enabled { "TRUE" } else { "FALSE" }.to_string(),
            description: self.description.clone(),
            category: self.category.clone(),
            tags: self.tags.join(", "),
        }
    }
}

/// Blank means enabled; otherwise only a case-insensitive `true` enables.
fn parse_enabled(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("true")
}

/// Split a comma-separated tag string into trimmed, non-empty tokens.
fn parse_tags(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Validated input for creating a product.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    /// Unique product name (required).
    pub name: String,

    /// Artifact container reference (required).
    pub container_id: String,

    /// Human label; defaults to the name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Category; defaults to [`DEFAULT_CATEGORY`].
    #[serde(default)]
    pub category: Option<String>,

    /// Tag tokens.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Defaults to enabled.
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl ProductDraft {
    /// Check required fields and the name pattern.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CatalogError::Validation("product name is required".into()));
        }
        if !NAME_PATTERN.is_match(self.name.trim()) {
            return Err(CatalogError::Validation(format!(
                "product name '{}' may only contain letters, digits, '_' and '-'",
                self.name.trim()
            )));
        }
        if self.container_id.trim().is_empty() {
            return Err(CatalogError::Validation("container id is required".into()));
        }
        Ok(())
    }

    /// Build the product with defaults applied. Call [`validate`](Self::validate) first.
    pub fn into_product(self) -> Product {
        let name = self.name.trim().to_string();
        let display_name = self
            .display_name
            .filter(|d| !d.trim().is_empty())
            .map(|d| d.trim().to_string())
            .unwrap_or_else(|| name.clone());
        let category = self
            .category
            .filter(|c| !c.trim().is_empty())
            .map(|c| c.trim().to_string())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Product {
            name,
            container_id: self.container_id.trim().to_string(),
            display_name,
            enabled: self.enabled.unwrap_or(true),
            description: self
                .description
                .map(|d| d.trim().to_string())
                .unwrap_or_default(),
            category,
            tags: self.tags,
        }
    }
}

/// Field-wise overlay for updates. `None` keeps the stored value; the
/// merged result replaces the whole row (partial column writes are not
/// part of the store contract).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    /// New container reference. Triggers a fresh reachability check when
    /// it differs from the stored value.
    #[serde(default)]
    pub container_id: Option<String>,

    /// New human label.
    #[serde(default)]
    pub display_name: Option<String>,

    /// New description.
    #[serde(default)]
    pub description: Option<String>,

    /// New category.
    #[serde(default)]
    pub category: Option<String>,

    /// Replacement tag list.
    #[serde(default)]
    pub tags: Option<Vec<String>>,

    /// New enabled state.
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl ProductPatch {
    /// Merge the patch over an existing product. The name is immutable
    /// through this path; rename is delete + add.
    pub fn apply(&self, base: &Product) -> Product {
        Product {
            name: base.name.clone(),
            container_id: self
                .container_id
                .clone()
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| base.container_id.clone()),
            display_name: self
                .display_name
                .clone()
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| base.display_name.clone()),
            enabled: self.enabled.unwrap_or(base.enabled),
            description: self
                .description
                .clone()
                .map(|d| d.trim().to_string())
                .unwrap_or_else(|| base.description.clone()),
            category: self
                .category
                .clone()
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| base.category.clone()),
            tags: self.tags.clone().unwrap_or_else(|| base.tags.clone()),
        }
    }
}

/// The resolved, typed list of products backing the system at a point in
/// time. Constructed by the resolver and shared immutably; all writes go
/// through the mutator against the backing store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Build a catalog from already-typed products.
    pub fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// Parse raw rows, skipping any missing required fields.
    pub fn from_rows(rows: &[ProductRow]) -> Self {
        let products = rows
            .iter()
            .filter_map(|row| {
                let product = Product::from_row(row);
                if product.is_none() {
                    tracing::debug!(
                        name = %row.name,
                        container = %row.container_id,
                        "skipping catalog row with missing required fields"
                    );
                }
                product
            })
            .collect();
        Self { products }
    }

    /// All products, administrative view (disabled included).
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Case-sensitive lookup by name.
    pub fn find(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    /// Case-sensitive lookup restricted to enabled products, the
    /// end-resolution view.
    pub fn find_enabled(&self, name: &str) -> Option<&Product> {
        self.find(name).filter(|p| p.enabled)
    }

    /// Case-insensitive probe used for duplicate detection, so that
    /// near-duplicates like `Invoice`/`invoice` are rejected up front.
    pub fn contains_like(&self, name: &str) -> bool {
        self.products
            .iter()
            .any(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}
