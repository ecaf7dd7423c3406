//! Package graph resolution.
//!
//! Starting from the core package and the application's direct dependencies,
//! the resolver walks dependencies depth-first in declaration order and emits
//! each package after everything it depends on. Missing packages and cycles
//! are fatal.
//!
//! Packages named in `test_packages` get a second load unit holding their test
//! files. It is emitted right after the package, or after the package's
//! test-only dependencies when it has any.

pub mod version;

use std::collections::{HashMap, HashSet};

use crate::bundler::{BuildOptions, Catalog, ConflictPolicy, Dependency, Error, Package, Result};

/// Which files of a package a load unit contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Sources,
    Tests,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LoadUnit {
    package: usize,
    kind: UnitKind,
}

/// Packages required by one build, in dependency order.
#[derive(Debug, Clone)]
pub struct ResolvedGraph {
    release: String,
    packages: Vec<Package>,
    units: Vec<LoadUnit>,
}

impl ResolvedGraph {
    /// Release every unpinned package was resolved at.
    pub fn release(&self) -> &str {
        &self.release
    }

    /// Packages with dependencies before dependents.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn names(&self) -> Vec<&str> {
        self.packages.iter().map(|p| p.name.as_str()).collect()
    }

    /// Load units in order: each package's sources, with test units interleaved.
    pub fn load_units(&self) -> impl Iterator<Item = (&Package, UnitKind)> {
        self.units
            .iter()
            .map(|unit| (&self.packages[unit.package], unit.kind))
    }

    /// Declared native modules across the graph, first declaration first.
    pub fn native_dependencies(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.packages
            .iter()
            .flat_map(|p| p.native_dependencies.iter())
            .map(String::as_str)
            .filter(|module| seen.insert(*module))
            .collect()
    }
}

/// Resolves the graph for `roots` at `release`.
///
/// The core package from `options` is always the first root. A `None`
/// release makes every unpinned lookup fail with [`Error::PackageNotFound`].
pub fn resolve(
    catalog: &dyn Catalog,
    release: Option<&str>,
    roots: &[Dependency],
    options: &BuildOptions,
) -> Result<ResolvedGraph> {
    let mut resolver = Resolver {
        catalog,
        release,
        policy: options.conflict_policy(),
        under_test: options.test_packages().iter().cloned().collect(),
        chosen: HashMap::new(),
        visiting: Vec::new(),
        packages: Vec::new(),
        units: Vec::new(),
    };

    resolver.visit(&Dependency::new(options.core_package()))?;
    for root in roots {
        resolver.visit(root)?;
    }
    for name in options.test_packages() {
        resolver.visit(&Dependency::new(name.as_str()))?;
    }

    let release = release
        .map(str::to_string)
        .ok_or_else(|| Error::PackageNotFound(options.core_package().to_string()))?;

    let graph = ResolvedGraph {
        release,
        packages: resolver.packages,
        units: resolver.units,
    };
    log::info!(
        "Resolved {} packages at release {}: {}",
        graph.packages.len(),
        graph.release,
        graph.names().join(", ")
    );
    Ok(graph)
}

struct Resolver<'a> {
    catalog: &'a dyn Catalog,
    release: Option<&'a str>,
    policy: ConflictPolicy,
    under_test: HashSet<String>,
    /// Name to the version selected for it.
    chosen: HashMap<String, String>,
    /// Current depth-first path, for cycle reporting.
    visiting: Vec<String>,
    packages: Vec<Package>,
    units: Vec<LoadUnit>,
}

impl Resolver<'_> {
    fn visit(&mut self, dependency: &Dependency) -> Result<()> {
        let name = dependency.name.as_str();
        let requested = dependency.version.as_deref().or(self.release);

        if let Some(start) = self.visiting.iter().position(|n| n == name) {
            let mut cycle = self.visiting[start..].to_vec();
            cycle.push(name.to_string());
            return Err(Error::CircularDependency(cycle.join(" -> ")));
        }

        if let Some(first) = self.chosen.get(name) {
            if let Some(second) = requested.filter(|second| *second != first.as_str()) {
                match self.policy {
                    ConflictPolicy::FirstSeen => log::warn!(
                        "{name}@{second} requested but {name}@{first} was resolved first; keeping {first}"
                    ),
                    ConflictPolicy::Error => {
                        return Err(Error::VersionConflict {
                            name: name.to_string(),
                            first: first.clone(),
                            second: second.to_string(),
                        });
                    }
                }
            }
            return Ok(());
        }

        let version = requested.ok_or_else(|| Error::PackageNotFound(name.to_string()))?;
        let package = self
            .catalog
            .package(name, version)?
            .ok_or_else(|| Error::PackageNotFound(name.to_string()))?;
        log::debug!("Resolving {name}@{version}");

        self.chosen.insert(name.to_string(), version.to_string());
        self.visiting.push(name.to_string());
        for dep in &package.dependencies {
            self.visit(dep)?;
        }
        self.visiting.pop();

        let index = self.packages.len();
        let test_dependencies = if self.under_test.contains(name) {
            Some(package.test_dependencies.clone())
        } else {
            None
        };
        self.packages.push(package);
        self.units.push(LoadUnit {
            package: index,
            kind: UnitKind::Sources,
        });

        if let Some(test_dependencies) = test_dependencies {
            for dep in &test_dependencies {
                self.visit(dep)?;
            }
            self.units.push(LoadUnit {
                package: index,
                kind: UnitKind::Tests,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{MemoryCatalog, PackageFile};

    fn pkg(name: &str, deps: &[&str]) -> Package {
        deps.iter().fold(Package::new(name, "0.1", "/catalog"), |p, d| {
            p.with_dependency(Dependency::parse(d))
        })
    }

    fn catalog(packages: Vec<Package>) -> MemoryCatalog {
        packages
            .into_iter()
            .fold(MemoryCatalog::new(), MemoryCatalog::with_package)
    }

    fn units(graph: &ResolvedGraph) -> Vec<String> {
        graph
            .load_units()
            .map(|(p, kind)| match kind {
                UnitKind::Sources => p.name.clone(),
                UnitKind::Tests => format!("{}:tests", p.name),
            })
            .collect()
    }

    #[test]
    fn dependencies_precede_dependents_in_declaration_order() {
        let catalog = catalog(vec![
            pkg("meteor", &["underscore"]),
            pkg("underscore", &[]),
            pkg("deps", &["meteor"]),
            pkg("session", &["deps", "underscore"]),
        ]);
        let roots = [Dependency::new("session")];
        let graph = resolve(&catalog, Some("0.1"), &roots, &BuildOptions::default()).unwrap();

        assert_eq!(graph.names(), ["underscore", "meteor", "deps", "session"]);
        assert_eq!(graph.release(), "0.1");
    }

    #[test]
    fn missing_release_reports_core_package() {
        let catalog = catalog(vec![pkg("meteor", &[])]);
        let err = resolve(&catalog, None, &[], &BuildOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Package not found: meteor");
    }

    #[test]
    fn missing_dependency_is_named() {
        let catalog = catalog(vec![pkg("meteor", &["deps"])]);
        let err = resolve(&catalog, Some("0.1"), &[], &BuildOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Package not found: deps");
    }

    #[test]
    fn reports_cycles_with_path() {
        let catalog = catalog(vec![pkg("meteor", &["a"]), pkg("a", &["b"]), pkg("b", &["a"])]);
        let err = resolve(&catalog, Some("0.1"), &[], &BuildOptions::default()).unwrap_err();
        assert_eq!(err.to_string(), "Circular dependency: a -> b -> a");
    }

    #[test]
    fn diamond_conflict_keeps_first_seen_by_default() {
        let mut old = pkg("underscore", &[]);
        old.version = "0.9".into();
        let catalog = catalog(vec![
            pkg("meteor", &["underscore@0.9", "deps"]),
            pkg("deps", &["underscore"]),
            old,
        ]);
        let graph = resolve(&catalog, Some("0.1"), &[], &BuildOptions::default()).unwrap();
        let underscore = graph.packages().iter().find(|p| p.name == "underscore").unwrap();
        assert_eq!(underscore.version, "0.9");
    }

    #[test]
    fn diamond_conflict_can_be_an_error() {
        let mut old = pkg("underscore", &[]);
        old.version = "0.9".into();
        let catalog = catalog(vec![
            pkg("meteor", &["underscore@0.9", "deps"]),
            pkg("deps", &["underscore"]),
            old,
        ]);
        let options = BuildOptions::builder()
            .conflict_policy(ConflictPolicy::Error)
            .build();
        let err = resolve(&catalog, Some("0.1"), &[], &options).unwrap_err();
        assert_eq!(err.to_string(), "Version conflict for underscore: 0.9 vs 0.1");
    }

    #[test]
    fn test_units_follow_package_or_its_test_dependencies() {
        let meteor = pkg("meteor", &[])
            .with_test_file(PackageFile::client("url_tests.js"))
            .with_test_dependency(Dependency::new("tinytest"));
        let catalog = catalog(vec![meteor, pkg("tinytest", &["meteor"]), pkg("deps", &["meteor"])]);
        let options = BuildOptions::builder()
            .test_packages(vec!["meteor".into()])
            .build();
        let graph =
            resolve(&catalog, Some("0.1"), &[Dependency::new("deps")], &options).unwrap();

        assert_eq!(units(&graph), ["meteor", "tinytest", "meteor:tests", "deps"]);
    }

    #[test]
    fn requested_test_package_is_added_to_graph() {
        let catalog = catalog(vec![pkg("meteor", &[]), pkg("extra", &[])]);
        let options = BuildOptions::builder()
            .test_packages(vec!["extra".into()])
            .build();
        let graph = resolve(&catalog, Some("0.1"), &[], &options).unwrap();
        assert_eq!(units(&graph), ["meteor", "extra", "extra:tests"]);
    }

    #[test]
    fn no_test_units_without_request() {
        let meteor = pkg("meteor", &[]).with_test_file(PackageFile::client("url_tests.js"));
        let graph =
            resolve(&catalog(vec![meteor]), Some("0.1"), &[], &BuildOptions::default()).unwrap();
        assert_eq!(units(&graph), ["meteor"]);
    }

    #[test]
    fn native_dependencies_are_deduplicated() {
        let catalog = catalog(vec![
            pkg("meteor", &["deps"]).with_native_dependency("fibers"),
            pkg("deps", &[])
                .with_native_dependency("fibers")
                .with_native_dependency("clean-css"),
        ]);
        let graph = resolve(&catalog, Some("0.1"), &[], &BuildOptions::default()).unwrap();
        assert_eq!(graph.native_dependencies(), ["fibers", "clean-css"]);
    }
}
