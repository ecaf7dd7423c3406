//! Web application bundler library
//!
//! Turns an application source tree into a self-contained bundle directory:
//! - resolves package dependencies against a release catalog
//! - builds client assets (per-file in development, minified and
//!   fingerprinted in production)
//! - emits the server entry point, server code and native modules
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod bundler;
pub mod cli;
pub mod error;
pub mod metadata;

// Re-export commonly used types
pub use bundler::{BuildOptions, BundleErrors, Catalog, DirectoryCatalog, MemoryCatalog, bundle};
pub use error::{BundlerError, CliError, Result};
