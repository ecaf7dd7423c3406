//! Catalog backed by a directory of releases.
//!
//! ```text
//! <root>/
//!   <release>/
//!     packages/<name>/package.toml
//!     packages/<name>/<files...>
//!     node_modules/<module>/...
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::{Catalog, Dependency, Package, PackageFile, is_contained};
use crate::bundler::{
    Error,
    error::{Context, ErrorExt, Result},
};

/// File name of a package manifest inside its directory.
pub const PACKAGE_MANIFEST: &str = "package.toml";

/// `package.toml` as written on disk. Unknown keys such as `summary` are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PackageManifest {
    dependencies: Vec<String>,
    test_dependencies: Vec<String>,
    native_dependencies: Vec<String>,
    files: Vec<PackageFile>,
    test_files: Vec<PackageFile>,
}

/// Reads packages from `<root>/<release>/packages/<name>/package.toml`.
#[derive(Debug, Clone)]
pub struct DirectoryCatalog {
    root: PathBuf,
}

impl DirectoryCatalog {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn release_dir(&self, version: &str) -> Option<PathBuf> {
        is_contained(Path::new(version)).then(|| self.root.join(version))
    }
}

impl Catalog for DirectoryCatalog {
    fn package(&self, name: &str, version: &str) -> Result<Option<Package>> {
        if name.contains(['/', '\\']) || !is_contained(Path::new(name)) {
            return Ok(None);
        }
        let Some(release_dir) = self.release_dir(version) else {
            return Ok(None);
        };

        let package_dir = release_dir.join("packages").join(name);
        let manifest_path = package_dir.join(PACKAGE_MANIFEST);
        if !manifest_path.is_file() {
            log::debug!("No manifest at {}", manifest_path.display());
            return Ok(None);
        }

        let text = std::fs::read_to_string(&manifest_path)
            .fs_context("reading package manifest", &manifest_path)?;
        let manifest: PackageManifest = toml::from_str(&text)
            .with_context(|| format!("Failed to parse {}", manifest_path.display()))?;

        for file in manifest.files.iter().chain(&manifest.test_files) {
            if !is_contained(&file.path) {
                return Err(Error::GenericError(format!(
                    "Package {name} lists a file outside its directory: {}",
                    file.path.display()
                )));
            }
        }

        Ok(Some(Package {
            name: name.to_string(),
            version: version.to_string(),
            source_dir: package_dir,
            files: manifest.files,
            test_files: manifest.test_files,
            dependencies: parse_all(&manifest.dependencies),
            test_dependencies: parse_all(&manifest.test_dependencies),
            native_dependencies: manifest.native_dependencies,
        }))
    }

    fn has_release(&self, version: &str) -> bool {
        self.release_dir(version).is_some_and(|dir| dir.is_dir())
    }

    fn node_modules_dir(&self, version: &str) -> Option<PathBuf> {
        self.release_dir(version)
            .map(|dir| dir.join("node_modules"))
            .filter(|dir| dir.is_dir())
    }
}

fn parse_all(specs: &[String]) -> Vec<Dependency> {
    specs
        .iter()
        .filter(|s| !s.trim().is_empty())
        .map(|s| Dependency::parse(s))
        .collect()
}
