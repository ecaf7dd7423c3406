//! Web application bundler.
//!
//! Resolves an application's packages against a [`Catalog`], builds client
//! and server assets, and writes a self-contained bundle directory:
//!
//! ```text
//! <output>/
//!   main.js
//!   app.html
//!   app.json
//!   server/{server.js, packages/, app/, node_modules}
//!   packages/, app/          development only
//!   static_cacheable/        production only
//!   static/
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::{path::Path, sync::Arc};
//! use app_bundler::bundler::{self, BuildOptions, DirectoryCatalog, NodeModulesMode};
//!
//! # async fn example() {
//! let catalog = Arc::new(DirectoryCatalog::new("catalog"));
//! let options = BuildOptions::builder()
//!     .node_modules_mode(NodeModulesMode::Symlink)
//!     .build();
//!
//! if let Err(errors) = bundler::bundle(Path::new("my-app"), Path::new("bundle"), options, catalog).await {
//!     eprintln!("{errors}");
//! }
//! # }
//! ```

pub mod builder;
pub mod catalog;
pub mod diagnostics;
pub mod error;
pub mod resolver;
pub mod settings;
pub mod utils;

use std::{path::Path, sync::Arc};

pub use builder::{AppManifest, Bundler, DefaultMinifier, Minifier, StaticRoute, fingerprint};
pub use catalog::{Catalog, Dependency, DirectoryCatalog, MemoryCatalog, Package, PackageFile, Target};
pub use diagnostics::{BundleErrors, Diagnostics};
pub use error::{Context, Error, ErrorExt, Result};
pub use resolver::ResolvedGraph;
pub use settings::{BuildOptions, BuildOptionsBuilder, ConflictPolicy, NodeModulesMode};

/// Bundles `app_dir` into `output_dir` with the default minifier.
///
/// Shorthand for [`Bundler::new`] followed by [`Bundler::bundle`].
pub async fn bundle(
    app_dir: &Path,
    output_dir: &Path,
    options: BuildOptions,
    catalog: Arc<dyn Catalog>,
) -> std::result::Result<(), BundleErrors> {
    Bundler::new(catalog, options).bundle(app_dir, output_dir).await
}
