//! Docshelf product administration commands
//!
//! Create, update, toggle and delete catalog products, plus listing and
//! YAML-driven bulk batches.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use docshelf_core::catalog::{BulkOp, ProductDraft, ProductPatch};

use crate::App;

/// Products subcommand for catalog administration
#[derive(Args, Debug)]
pub struct ProductsCommand {
    #[command(subcommand)]
    pub command: ProductsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ProductsSubcommand {
    /// List all products, including disabled ones
    List,

    /// Add a product
    Add {
        /// Unique product name (letters, digits, '_' and '-')
        name: String,

        /// Artifact container id (directory path)
        container: String,

        /// Human label (defaults to the name)
        #[arg(long)]
        display_name: Option<String>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,

        /// Category (defaults to "Uncategorized")
        #[arg(long)]
        category: Option<String>,

        /// Tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,

        /// Create the product disabled
        #[arg(long)]
        disabled: bool,
    },

    /// Update fields of an existing product (name itself is immutable)
    Update {
        /// Product name
        name: String,

        /// New container id (re-verified for reachability)
        #[arg(long)]
        container: Option<String>,

        /// New human label
        #[arg(long)]
        display_name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// Replacement tag list (repeatable)
        #[arg(long = "tag")]
        tags: Option<Vec<String>>,
    },

    /// Flip a product's enabled state
    Toggle {
        /// Product name
        name: String,
    },

    /// Delete a product
    Delete {
        /// Product name
        name: String,
    },

    /// Apply a batch of operations from a YAML file
    Bulk {
        /// Path to the operations file
        path: PathBuf,
    },
}

/// Table row for product listings
#[derive(Tabled)]
struct ProductRowDisplay {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Container")]
    container: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

pub async fn execute(app: &App, command: ProductsCommand) -> Result<()> {
    match command.command {
        ProductsSubcommand::List => execute_list(app).await,
        ProductsSubcommand::Add {
            name,
            container,
            display_name,
            description,
            category,
            tags,
            disabled,
        } => {
            let draft = ProductDraft {
                name,
                container_id: container,
                display_name,
                description,
                category,
                tags,
                enabled: if disabled { Some(false) } else { None },
            };
            let outcome = app.mutator.add_product(draft).await?;
            println!("{}", outcome.message);
            Ok(())
        }
        ProductsSubcommand::Update {
            name,
            container,
            display_name,
            description,
            category,
            tags,
        } => {
            let patch = ProductPatch {
                container_id: container,
                display_name,
                description,
                category,
                tags,
                enabled: None,
            };
            let outcome = app.mutator.update_product(&name, &patch).await?;
            println!("{}", outcome.message);
            Ok(())
        }
        ProductsSubcommand::Toggle { name } => {
            let enabled = app.mutator.toggle_enabled(&name).await?;
            println!(
                "Product '{}' is now {}",
                name,
                if enabled { "enabled" } else { "disabled" }
            );
            Ok(())
        }
        ProductsSubcommand::Delete { name } => {
            let outcome = app.mutator.delete_product(&name).await?;
            println!("{}", outcome.message);
            Ok(())
        }
        ProductsSubcommand::Bulk { path } => execute_bulk(app, &path).await,
    }
}

async fn execute_list(app: &App) -> Result<()> {
    // Administrative view: uncached, disabled products included.
    let catalog = app.resolver.load_uncached().await?;

    if catalog.is_empty() {
        println!("The catalog is empty.");
        println!("\nRun 'docshelf products add <name> <container>' to create one.");
        return Ok(());
    }

    let table_rows: Vec<ProductRowDisplay> = catalog
        .products()
        .iter()
        .map(|product| ProductRowDisplay {
            name: product.name.clone(),
            display_name: product.display_name.clone(),
            enabled: if product.enabled { "yes" } else { "no" }.to_string(),
            category: product.category.clone(),
            container: product.container_id.clone(),
            tags: product.tags.join(", "),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");
    println!("\n{} product(s)", catalog.len());
    Ok(())
}

async fn execute_bulk(app: &App, path: &PathBuf) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read operations file {}", path.display()))?;
    let ops: Vec<BulkOp> = serde_yaml_ng::from_str(&content)
        .with_context(|| format!("failed to parse operations file {}", path.display()))?;

    if ops.is_empty() {
        println!("No operations in {}", path.display());
        return Ok(());
    }

    let report = app.mutator.bulk_apply(ops).await;

    for item in &report.items {
        match &item.result {
            Ok(message) => println!("ok   {} - {message}", item.label),
            Err(err) => println!("FAIL {} - {err}", item.label),
        }
    }
    println!(
        "\n{} succeeded, {} failed",
        report.succeeded(),
        report.failed()
    );
    Ok(())
}
