//! Command line argument parsing and validation.

use clap::Parser;
use std::path::PathBuf;

use crate::bundler::{BuildOptions, ConflictPolicy, NodeModulesMode};

/// Environment variable naming the package catalog directory.
pub const CATALOG_ENV: &str = "APP_BUNDLER_CATALOG";

/// Web application bundler
#[derive(Parser, Debug)]
#[command(
    name = "app-bundler",
    version,
    about = "Bundles a web application into a deployable directory",
    long_about = "Resolves the application's packages against a release catalog, builds client and server assets, and writes a self-contained bundle.

Usage:
  app-bundler ./my-app --output ./bundle
  app-bundler ./my-app -o ./bundle --no-minify --test-package meteor
  app-bundler ./my-app -o ./bundle --release 0.1 --node-modules symlink

Exit code 0 = bundle written without errors."
)]
pub struct Args {
    /// Application directory
    #[arg(value_name = "APP_DIR")]
    pub app_dir: PathBuf,

    /// Output directory; replaced if it exists
    #[arg(short = 'o', long, value_name = "PATH")]
    pub output: PathBuf,

    /// Package catalog directory
    ///
    /// Defaults to `app-bundler/catalog` in the user data directory.
    #[arg(long, env = CATALOG_ENV, value_name = "DIR")]
    pub catalog: Option<PathBuf>,

    /// How native modules reach server/node_modules: skip, copy, symlink
    #[arg(long, value_name = "MODE")]
    pub node_modules: Option<NodeModulesMode>,

    /// Development bundle: copy client files instead of minifying them
    #[arg(long)]
    pub no_minify: bool,

    /// Include test files of this package (repeatable, comma separated)
    #[arg(long = "test-package", value_name = "PACKAGE", value_delimiter = ',')]
    pub test_packages: Vec<String>,

    /// Build against this release instead of .meteor/version
    #[arg(long, value_name = "VERSION")]
    pub release: Option<String>,

    /// Fail if --release names a release the catalog does not have
    #[arg(long, requires = "release")]
    pub validate_release: bool,

    /// Fail when two packages need the same dependency at different versions
    #[arg(long)]
    pub strict_versions: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if !self.app_dir.is_dir() {
            return Err(format!(
                "Application directory not found: {}",
                self.app_dir.display()
            ));
        }
        if self.output.as_os_str().is_empty() {
            return Err("Output path cannot be empty".to_string());
        }
        if self.output == self.app_dir {
            return Err("Output directory cannot be the application directory".to_string());
        }
        if self.test_packages.iter().any(|name| name.trim().is_empty()) {
            return Err("Test package names cannot be empty".to_string());
        }
        if self.release.as_deref().is_some_and(|r| r.trim().is_empty()) {
            return Err("Release cannot be empty".to_string());
        }
        Ok(())
    }

    /// Catalog directory from the flag, the environment, or the data directory.
    pub fn catalog_dir(&self) -> Option<PathBuf> {
        self.catalog
            .clone()
            .or_else(|| dirs::data_dir().map(|dir| dir.join("app-bundler").join("catalog")))
    }

    /// Options for the run. Flags that were not given stay unset so the
    /// application's `.meteor/bundle.toml` can supply them.
    pub fn build_options(&self) -> BuildOptions {
        let mut builder = BuildOptions::builder();
        if let Some(mode) = self.node_modules {
            builder = builder.node_modules_mode(mode);
        }
        if self.no_minify {
            builder = builder.no_minify(true);
        }
        if !self.test_packages.is_empty() {
            let names = self
                .test_packages
                .iter()
                .map(|name| name.trim().to_string())
                .collect();
            builder = builder.test_packages(names);
        }
        if let Some(release) = &self.release {
            builder = builder
                .version_override(release.trim())
                .validate_version_override(self.validate_release);
        }
        if self.strict_versions {
            builder = builder.conflict_policy(ConflictPolicy::Error);
        }
        builder.build()
    }
}
