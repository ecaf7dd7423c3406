//! Application metadata from the `.meteor` directory.
//!
//! An application root may contain:
//!
//! - `.meteor/version` - the release the app was built against
//! - `.meteor/packages` - direct package dependencies, one per line
//! - `.meteor/bundle.toml` - defaults for build options
//!
//! All of them are optional.

mod sources;

pub use sources::{AppSources, discover_sources};

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::bundler::{
    ConflictPolicy, Dependency, Error, NodeModulesMode,
    error::{Context, ErrorExt, Result},
};

/// Directory holding application metadata.
pub const METADATA_DIR: &str = ".meteor";
/// Version marker file name inside [`METADATA_DIR`].
pub const VERSION_FILE: &str = "version";
/// Package list file name inside [`METADATA_DIR`].
pub const PACKAGES_FILE: &str = "packages";
/// Bundle configuration file name inside [`METADATA_DIR`].
pub const CONFIG_FILE: &str = "bundle.toml";

/// Build option defaults read from `.meteor/bundle.toml`.
///
/// ```toml
/// node_modules = "symlink"
/// minify = false
/// test_packages = ["meteor"]
/// conflict_policy = "error"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub node_modules: Option<NodeModulesMode>,
    pub minify: Option<bool>,
    pub test_packages: Option<Vec<String>>,
    pub conflict_policy: Option<ConflictPolicy>,
}

/// An application source tree. Read-only.
#[derive(Debug, Clone)]
pub struct Application {
    root: PathBuf,
    version: Option<String>,
    dependencies: Vec<Dependency>,
    config: AppConfig,
}

impl Application {
    /// Reads the application's metadata files.
    ///
    /// Fails if `root` is not a directory or a metadata file exists but cannot
    /// be read or parsed. Missing metadata files are not errors.
    pub fn load(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(Error::GenericError(format!(
                "Application directory not found: {}",
                root.display()
            )));
        }
        let meta_dir = root.join(METADATA_DIR);

        let version = read_optional(&meta_dir.join(VERSION_FILE))?
            .map(|text| text.trim().to_string())
            .filter(|version| !version.is_empty());

        let dependencies = read_optional(&meta_dir.join(PACKAGES_FILE))?
            .map(|text| parse_package_list(&text))
            .unwrap_or_default();

        let config_path = meta_dir.join(CONFIG_FILE);
        let config = match read_optional(&config_path)? {
            Some(text) => toml::from_str(&text)
                .with_context(|| format!("Failed to parse {}", config_path.display()))?,
            None => AppConfig::default(),
        };

        log::debug!(
            "Loaded application {} (version: {:?}, {} direct dependencies)",
            root.display(),
            version,
            dependencies.len()
        );

        Ok(Self {
            root: root.to_path_buf(),
            version,
            dependencies,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Release named by the version marker, if any.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Direct dependencies in declaration order.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).fs_context("reading application metadata", path),
    }
}

/// Parses `.meteor/packages`: one dependency per line, `#` starts a comment.
fn parse_package_list(text: &str) -> Vec<Dependency> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or_default().trim())
        .filter(|line| !line.is_empty())
        .map(Dependency::parse)
        .collect()
}
