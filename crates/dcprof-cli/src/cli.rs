//! dcprof - register CSV datastores and preview their data
//!
//! Settings come from `settings.json` in the user's config directory; command
//! line flags override them.

mod logging;
mod preview;
mod render;
mod wizard;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dcprof_drivers::DriverRegistry;
use dcprof_services::DatastoreService;
use dcprof_settings::DcprofSettings;
use dcprof_wizard::DatastoreCatalog;

use crate::logging::LoggingConfig;

#[derive(Parser, Debug)]
#[command(name = "dcprof")]
#[command(about = "Register CSV datastores and preview their data")]
#[command(version)]
struct Cli {
    /// Repository directory holding datastore files and the catalog
    #[arg(long, global = true, env = "DCPROF_REPOSITORY", value_name = "DIR")]
    repository: Option<PathBuf>,

    /// Settings file to use instead of the default one
    #[arg(long, global = true, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Verbose logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Walk through registering a CSV datastore
    Wizard(wizard::WizardArgs),
    /// Show a page of rows from a datastore or CSV file
    Preview(preview::PreviewArgs),
    /// List registered CSV datastores
    Datastores,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = if cli.verbose {
        LoggingConfig::verbose()
    } else if cfg!(debug_assertions) {
        LoggingConfig::default()
    } else {
        LoggingConfig::production()
    };
    let _log_guard = logging::init(logging)?;

    if let Err(err) = dcprof_settings::ensure_directories() {
        tracing::warn!("Failed to create config directories: {}", err);
    }

    let settings = match &cli.settings {
        Some(path) => DcprofSettings::load_from(path)?,
        None => DcprofSettings::load()?,
    };
    let repository_dir = match cli.repository {
        Some(dir) => dir,
        None => settings.storage.repository_dir()?,
    };
    let catalog_path = settings.storage.catalog_path(&repository_dir);
    std::fs::create_dir_all(&repository_dir).with_context(|| {
        format!(
            "Failed to create repository directory {}",
            repository_dir.display()
        )
    })?;
    tracing::debug!(
        repository = %repository_dir.display(),
        catalog = %catalog_path.display(),
        "resolved storage"
    );

    let catalog = DatastoreCatalog::new(catalog_path);

    match &cli.command {
        Command::Wizard(args) => wizard::run(args, &repository_dir, &catalog),
        Command::Preview(args) => {
            let service = DatastoreService::new(
                Arc::new(DriverRegistry::with_defaults()),
                catalog,
                &repository_dir,
            );
            preview::run(args, &service, settings.preview.page_size).await
        }
        Command::Datastores => {
            let definitions = catalog.list()?;
            if definitions.is_empty() {
                println!("No CSV datastores registered in {}", catalog.path().display());
            } else {
                println!("{}", render::datastores(&definitions));
            }
            Ok(())
        }
    }
}
