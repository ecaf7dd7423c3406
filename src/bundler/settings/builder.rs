//! Builder for constructing BuildOptions.

use super::{BuildOptions, ConflictPolicy, NodeModulesMode};

/// Builder for constructing [`BuildOptions`].
///
/// Every setter is optional; anything left unset can still be supplied by the
/// application's configuration file at bundle time.
///
/// # Examples
///
/// ```no_run
/// use app_bundler::bundler::{BuildOptionsBuilder, NodeModulesMode};
///
/// let options = BuildOptionsBuilder::new()
///     .node_modules_mode(NodeModulesMode::Skip)
///     .version_override("0.1")
///     .build();
/// ```
#[derive(Default)]
pub struct BuildOptionsBuilder {
    node_modules_mode: Option<NodeModulesMode>,
    no_minify: Option<bool>,
    test_packages: Option<Vec<String>>,
    version_override: Option<String>,
    validate_version_override: bool,
    conflict_policy: Option<ConflictPolicy>,
    core_package: Option<String>,
}

impl BuildOptionsBuilder {
    /// Creates a new options builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets how native modules are materialized.
    ///
    /// Default: [`NodeModulesMode::Copy`]
    pub fn node_modules_mode(mut self, mode: NodeModulesMode) -> Self {
        self.node_modules_mode = Some(mode);
        self
    }

    /// Disables production minification, keeping per-file references.
    ///
    /// Default: false
    pub fn no_minify(mut self, no_minify: bool) -> Self {
        self.no_minify = Some(no_minify);
        self
    }

    /// Sets packages whose test files are bundled.
    ///
    /// Default: empty
    pub fn test_packages(mut self, packages: Vec<String>) -> Self {
        self.test_packages = Some(packages);
        self
    }

    /// Sets the release to build against, ignoring the version marker.
    pub fn version_override(mut self, version: impl Into<String>) -> Self {
        self.version_override = Some(version.into());
        self
    }

    /// Requires the override release to exist in the catalog.
    ///
    /// Default: false
    pub fn validate_version_override(mut self, validate: bool) -> Self {
        self.validate_version_override = validate;
        self
    }

    /// Sets the diamond dependency policy.
    ///
    /// Default: [`ConflictPolicy::FirstSeen`]
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.conflict_policy = Some(policy);
        self
    }

    /// Sets the implicit root package.
    ///
    /// Default: `meteor`
    pub fn core_package(mut self, name: impl Into<String>) -> Self {
        self.core_package = Some(name.into());
        self
    }

    /// Builds the options.
    pub fn build(self) -> BuildOptions {
        BuildOptions::new(
            self.node_modules_mode,
            self.no_minify,
            self.test_packages,
            self.version_override,
            self.validate_version_override,
            self.conflict_policy,
            self.core_package,
        )
    }
}
