//! Package catalog boundary.
//!
//! The bundler never builds [`Package`] records on its own; it asks a
//! [`Catalog`] for them by `(name, version)`. Two implementations ship with the
//! crate:
//!
//! - [`DirectoryCatalog`] - releases laid out on disk
//! - [`MemoryCatalog`] - packages registered in memory (tests, embedding)

mod directory;
mod memory;

pub use directory::DirectoryCatalog;
pub use memory::MemoryCatalog;

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::Result;

/// Source of package records and native module caches.
///
/// Implementations are shared read-only between concurrent bundle runs.
pub trait Catalog: Send + Sync {
    /// Looks up a package. `Ok(None)` means the catalog has no such package.
    fn package(&self, name: &str, version: &str) -> Result<Option<Package>>;

    /// Whether the catalog knows the release at all.
    fn has_release(&self, version: &str) -> bool;

    /// Shared directory of native runtime modules for a release.
    fn node_modules_dir(&self, version: &str) -> Option<PathBuf>;
}

/// Where a file is loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Target {
    Client,
    Server,
}

fn both_targets() -> Vec<Target> {
    vec![Target::Client, Target::Server]
}

/// A file belonging to a package, relative to the package's source directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageFile {
    pub path: PathBuf,
    #[serde(rename = "where", default = "both_targets")]
    pub targets: Vec<Target>,
}

impl PackageFile {
    pub fn new(path: impl Into<PathBuf>, targets: Vec<Target>) -> Self {
        Self {
            path: path.into(),
            targets,
        }
    }

    pub fn client(path: impl Into<PathBuf>) -> Self {
        Self::new(path, vec![Target::Client])
    }

    pub fn server(path: impl Into<PathBuf>) -> Self {
        Self::new(path, vec![Target::Server])
    }

    pub fn shared(path: impl Into<PathBuf>) -> Self {
        Self::new(path, both_targets())
    }

    pub fn is_for(&self, target: Target) -> bool {
        self.targets.contains(&target)
    }
}

/// A dependency declaration: `name` or `name@version`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Dependency {
    pub name: String,
    /// Pinned version; `None` resolves at the build's release.
    pub version: Option<String>,
}

impl Dependency {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    pub fn pinned(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Parses `name` or `name@version`. Surrounding whitespace is ignored and
    /// an empty version counts as unpinned.
    pub fn parse(text: &str) -> Self {
        match text.trim().split_once('@') {
            Some((name, version)) if !version.trim().is_empty() => {
                Self::pinned(name.trim(), version.trim())
            }
            Some((name, _)) => Self::new(name.trim()),
            None => Self::new(text.trim()),
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}@{}", self.name, version),
            None => f.write_str(&self.name),
        }
    }
}

/// A resolved package record as supplied by a [`Catalog`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub name: String,
    pub version: String,
    /// Directory the file paths are relative to.
    pub source_dir: PathBuf,
    pub files: Vec<PackageFile>,
    pub test_files: Vec<PackageFile>,
    pub dependencies: Vec<Dependency>,
    /// Only resolved while the package is under test.
    pub test_dependencies: Vec<Dependency>,
    /// Modules expected in the server's `node_modules`.
    pub native_dependencies: Vec<String>,
}

impl Package {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        source_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            source_dir: source_dir.into(),
            files: Vec::new(),
            test_files: Vec::new(),
            dependencies: Vec::new(),
            test_dependencies: Vec::new(),
            native_dependencies: Vec::new(),
        }
    }

    pub fn with_file(mut self, file: PackageFile) -> Self {
        self.files.push(file);
        self
    }

    pub fn with_test_file(mut self, file: PackageFile) -> Self {
        self.test_files.push(file);
        self
    }

    pub fn with_dependency(mut self, dependency: Dependency) -> Self {
        self.dependencies.push(dependency);
        self
    }

    pub fn with_test_dependency(mut self, dependency: Dependency) -> Self {
        self.test_dependencies.push(dependency);
        self
    }

    pub fn with_native_dependency(mut self, module: impl Into<String>) -> Self {
        self.native_dependencies.push(module.into());
        self
    }

    /// Source files loaded on `target`, in declaration order.
    pub fn files_for(&self, target: Target) -> impl Iterator<Item = &PackageFile> {
        self.files.iter().filter(move |f| f.is_for(target))
    }

    /// Test files loaded on `target`, in declaration order.
    pub fn test_files_for(&self, target: Target) -> impl Iterator<Item = &PackageFile> {
        self.test_files.iter().filter(move |f| f.is_for(target))
    }

    /// Absolute path of one of this package's files.
    pub fn source_path(&self, file: &PackageFile) -> PathBuf {
        self.source_dir.join(&file.path)
    }
}

/// True when `path` stays inside the directory it is joined to.
pub(crate) fn is_contained(path: &Path) -> bool {
    use std::path::Component;

    !path.as_os_str().is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
