//! Command line interface for the application bundler.

mod args;

pub use args::{Args, CATALOG_ENV};

use std::sync::Arc;

use crate::bundler::{self, DirectoryCatalog};
use crate::error::{CliError, Result};

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute(&args).await?;
    Ok(0)
}

/// Runs one bundle for already parsed arguments.
pub async fn execute(args: &Args) -> Result<()> {
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    let catalog_dir = args.catalog_dir().ok_or_else(|| CliError::MissingArgument {
        argument: "--catalog".to_string(),
    })?;
    log::info!("Using package catalog {}", catalog_dir.display());

    let catalog = Arc::new(DirectoryCatalog::new(catalog_dir));
    bundler::bundle(&args.app_dir, &args.output, args.build_options(), catalog).await?;

    println!("Bundle written to {}", args.output.display());
    Ok(())
}
