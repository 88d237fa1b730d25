//! Docshelf - stable template links over versioned artifact containers
//!
//! The CLI is the thin routing layer: it resolves product requests through
//! the core resolver/selector and forwards catalog administration to the
//! mutator. Presentation (tables, error wording) lives here, never in the
//! core.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use docshelf_core::catalog::{
    describe_versions, select_by_version, select_latest, CatalogMutator, ConfigResolver, SourceRef,
};
use docshelf_core::settings::Settings;
use docshelf_core::store::{
    ArtifactStore, DirArtifactStore, FileCatalogProvider, FileOverrides,
};

mod products_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "docshelf", version, about = "Versioned document templates behind stable names")]
struct Cli {
    /// Settings file path (defaults to the platform config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log verbosity (overridden by RUST_LOG when set)
    #[arg(long, global = true, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve a product to a concrete artifact locator
    Resolve {
        /// Product name (case-sensitive)
        product: String,

        /// Specific version (e.g. "1.2" or "v1.2"); latest when omitted
        #[arg(long)]
        version: Option<String>,
    },

    /// Manage catalog products
    Products(products_cli::ProductsCommand),

    /// Show or set the catalog source
    Source {
        #[command(subcommand)]
        command: SourceCommand,
    },
}

#[derive(Subcommand, Debug)]
enum SourceCommand {
    /// Show the resolved catalog source and where it came from
    Show,

    /// Set the runtime source override (validated before persisting)
    Set {
        /// Catalog source id (path to a catalog file)
        id: String,
    },
}

/// Everything a command needs, wired from settings.
pub struct App {
    pub resolver: Arc<ConfigResolver>,
    pub mutator: CatalogMutator,
    pub artifacts: Arc<DirArtifactStore>,
}

impl App {
    fn build(settings_path: Option<&PathBuf>) -> Result<Self> {
        let settings = match settings_path {
            Some(path) => Settings::load_from_path(path)
                .with_context(|| format!("failed to load settings from {}", path.display()))?,
            None => Settings::load().context("failed to load settings")?,
        };

        // Overrides live next to an explicit settings file, so tests and
        // alternate deployments stay self-contained.
        let overrides_path = match settings_path.and_then(|p| p.parent()) {
            Some(dir) => dir.join("overrides.yaml"),
            None => Settings::config_dir()?.join("overrides.yaml"),
        };

        let overrides = Arc::new(FileOverrides::new(overrides_path));
        let provider = Arc::new(FileCatalogProvider);
        let artifacts = Arc::new(DirArtifactStore::new());

        let resolver = Arc::new(ConfigResolver::new(settings, overrides, provider));
        let mutator =
            CatalogMutator::new(Arc::clone(&resolver), Arc::clone(&artifacts) as Arc<dyn ArtifactStore>);

        Ok(Self {
            resolver,
            mutator,
            artifacts,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_filter_directive())),
        )
        .with_writer(std::io::stderr)
        .init();

    let app = App::build(cli.settings.as_ref())?;

    match cli.command {
        Command::Resolve { product, version } => {
            execute_resolve(&app, &product, version.as_deref()).await
        }
        Command::Products(command) => products_cli::execute(&app, command).await,
        Command::Source { command } => match command {
            SourceCommand::Show => execute_source_show(&app),
            SourceCommand::Set { id } => execute_source_set(&app, &id).await,
        },
    }
}

async fn execute_resolve(app: &App, product: &str, version: Option<&str>) -> Result<()> {
    tracing::debug!(product, ?version, "resolving product request");
    let catalog = app.resolver.load().await?;

    // Identity is case-sensitive; only enabled products resolve.
    let entry = catalog
        .find_enabled(product)
        .ok_or_else(|| anyhow!("unknown product '{product}'"))?;

    let artifacts = app.artifacts.list_artifacts(&entry.container_id).await?;

    let selected = match version {
        Some(version) => select_by_version(&artifacts, version),
        None => select_latest(&artifacts),
    };

    match selected {
        Some(artifact) => {
            println!("{}", artifact.locator);
            Ok(())
        }
        None => match version {
            Some(version) => bail!(
                "version '{}' not found for '{}' (available: {})",
                version,
                entry.display_name,
                describe_versions(&artifacts)
            ),
            None => bail!("no artifacts available for '{}'", entry.display_name),
        },
    }
}

fn execute_source_show(app: &App) -> Result<()> {
    let settings = app.resolver.settings();
    match app.resolver.resolve_source() {
        SourceRef::Store(id) => {
            let origin = if settings.default_source.as_deref() == Some(id.as_str()) {
                "deploy-time default"
            } else {
                "runtime override"
            };
            println!("{id} ({origin})");
        }
        SourceRef::Fallback => match &settings.fallback_container {
            Some(container) => {
                println!("single-container fallback ({container})");
            }
            None => {
                println!("not configured");
                println!("\nRun 'docshelf source set <id>' to point at a catalog file.");
            }
        },
    }
    Ok(())
}

async fn execute_source_set(app: &App, id: &str) -> Result<()> {
    app.resolver.set_source(id).await?;
    println!("Catalog source set to {id}");
    Ok(())
}
