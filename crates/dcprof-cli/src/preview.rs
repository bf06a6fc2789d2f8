//! `dcprof preview`: show a page of a datastore

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use dcprof_core::{ColumnRef, Connection};
use dcprof_services::{DatastoreService, PreviewSourceDataAction};

use crate::render;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// Registered datastore name, or a path to a .csv/.tsv file
    pub target: String,

    /// Columns to show, in order (default: all)
    #[arg(long, value_delimiter = ',')]
    pub columns: Vec<String>,

    /// 1-based page to show
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,
}

pub async fn run(args: &PreviewArgs, service: &DatastoreService, page_size: usize) -> Result<()> {
    if args.page == 0 {
        bail!("Pages are numbered from 1");
    }
    let connection = open_target(service, &args.target).await?;
    let table = service.default_table(connection.as_ref()).await?;

    let columns = args
        .columns
        .iter()
        .map(|name| name.trim())
        .filter(|name| !name.is_empty())
        .map(|name| {
            table
                .column(name)
                .with_context(|| format!("Unknown column '{}' in '{}'", name, table.name))
        })
        .collect::<Result<Vec<ColumnRef>>>()?;

    let action = if columns.is_empty() {
        PreviewSourceDataAction::from_table(connection.clone(), &table)
    } else {
        PreviewSourceDataAction::from_columns(connection.clone(), columns)
    }
    .with_page_size(args.page_size.unwrap_or(page_size));

    let mut window = action.perform().await?;
    if args.page > 1 {
        window.go_to_page(args.page - 1).await?;
    }
    render::print_window(&window);

    connection.close().await?;
    Ok(())
}

/// Registered names win; otherwise a target naming an existing file, or
/// ending in .csv/.tsv, is opened as a file.
async fn open_target(service: &DatastoreService, target: &str) -> Result<Arc<dyn Connection>> {
    let path = Path::new(target);
    let lower = target.to_ascii_lowercase();
    let registered = service.catalog().find(target)?.is_some();
    if !registered && (path.is_file() || lower.ends_with(".csv") || lower.ends_with(".tsv")) {
        tracing::debug!(path = %path.display(), "previewing file");
        Ok(service.open_file(path).await?)
    } else {
        Ok(service.open(target).await?)
    }
}
