//! In-memory catalog.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use super::{Catalog, Package};
use crate::bundler::Result;

/// Catalog holding packages registered at runtime.
#[derive(Debug, Default, Clone)]
pub struct MemoryCatalog {
    packages: HashMap<(String, String), Package>,
    releases: HashSet<String>,
    node_modules: HashMap<String, PathBuf>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package; its version becomes a known release.
    pub fn insert(&mut self, package: Package) {
        self.releases.insert(package.version.clone());
        self.packages
            .insert((package.name.clone(), package.version.clone()), package);
    }

    pub fn with_package(mut self, package: Package) -> Self {
        self.insert(package);
        self
    }

    /// Sets the shared native module directory for a release.
    pub fn with_node_modules(mut self, version: impl Into<String>, dir: impl Into<PathBuf>) -> Self {
        let version = version.into();
        self.releases.insert(version.clone());
        self.node_modules.insert(version, dir.into());
        self
    }
}

impl Catalog for MemoryCatalog {
    fn package(&self, name: &str, version: &str) -> Result<Option<Package>> {
        Ok(self
            .packages
            .get(&(name.to_string(), version.to_string()))
            .cloned())
    }

    fn has_release(&self, version: &str) -> bool {
        self.releases.contains(version)
    }

    fn node_modules_dir(&self, version: &str) -> Option<PathBuf> {
        self.node_modules.get(version).cloned()
    }
}
