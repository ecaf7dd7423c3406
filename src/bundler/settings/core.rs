//! Core BuildOptions struct and implementations.

use super::{BuildOptionsBuilder, ConflictPolicy, NodeModulesMode};
use crate::metadata::AppConfig;

/// Package every application depends on implicitly.
pub const DEFAULT_CORE_PACKAGE: &str = "meteor";

/// Options for one bundle run.
///
/// Unset values are layered from the application's configuration file by
/// [`BuildOptions::with_app_defaults`], then from built-in defaults.
///
/// # Examples
///
/// ```no_run
/// use app_bundler::bundler::{BuildOptions, NodeModulesMode};
///
/// let options = BuildOptions::builder()
///     .node_modules_mode(NodeModulesMode::Symlink)
///     .no_minify(true)
///     .test_packages(vec!["meteor".into()])
///     .build();
///
/// assert!(!options.minify());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildOptions {
    node_modules_mode: Option<NodeModulesMode>,
    no_minify: Option<bool>,
    test_packages: Option<Vec<String>>,
    version_override: Option<String>,
    validate_version_override: bool,
    conflict_policy: Option<ConflictPolicy>,
    core_package: Option<String>,
}

impl BuildOptions {
    /// Starts a builder with nothing set.
    pub fn builder() -> BuildOptionsBuilder {
        BuildOptionsBuilder::new()
    }

    /// How native modules are materialized. Default: [`NodeModulesMode::Copy`].
    pub fn node_modules_mode(&self) -> NodeModulesMode {
        self.node_modules_mode.unwrap_or_default()
    }

    /// Whether production minification runs. Default: true.
    pub fn minify(&self) -> bool {
        !self.no_minify.unwrap_or(false)
    }

    /// Packages whose test files are bundled, in request order.
    pub fn test_packages(&self) -> &[String] {
        self.test_packages.as_deref().unwrap_or(&[])
    }

    /// Release used instead of the application's version marker.
    pub fn version_override(&self) -> Option<&str> {
        self.version_override.as_deref()
    }

    /// Whether an override must name a release the catalog knows.
    pub fn validate_version_override(&self) -> bool {
        self.validate_version_override
    }

    /// Diamond dependency policy. Default: [`ConflictPolicy::FirstSeen`].
    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict_policy.unwrap_or_default()
    }

    /// Implicit root package. Default: [`DEFAULT_CORE_PACKAGE`].
    pub fn core_package(&self) -> &str {
        self.core_package.as_deref().unwrap_or(DEFAULT_CORE_PACKAGE)
    }

    /// Fills every unset option from the application's configuration file.
    pub fn with_app_defaults(&self, config: &AppConfig) -> Self {
        let mut options = self.clone();
        if options.node_modules_mode.is_none() {
            options.node_modules_mode = config.node_modules;
        }
        if options.no_minify.is_none() {
            options.no_minify = config.minify.map(|minify| !minify);
        }
        if options.test_packages.is_none() {
            options.test_packages = config.test_packages.clone();
        }
        if options.conflict_policy.is_none() {
            options.conflict_policy = config.conflict_policy;
        }
        options
    }

    /// Creates a new BuildOptions instance (used by BuildOptionsBuilder).
    pub(super) fn new(
        node_modules_mode: Option<NodeModulesMode>,
        no_minify: Option<bool>,
        test_packages: Option<Vec<String>>,
        version_override: Option<String>,
        validate_version_override: bool,
        conflict_policy: Option<ConflictPolicy>,
        core_package: Option<String>,
    ) -> Self {
        Self {
            node_modules_mode,
            no_minify,
            test_packages,
            version_override,
            validate_version_override,
            conflict_policy,
            core_package,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_minify_and_copy() {
        let options = BuildOptions::default();
        assert!(options.minify());
        assert_eq!(options.node_modules_mode(), NodeModulesMode::Copy);
        assert!(options.test_packages().is_empty());
        assert_eq!(options.core_package(), "meteor");
    }

    #[test]
    fn explicit_values_win_over_app_config() {
        let config = AppConfig {
            node_modules: Some(NodeModulesMode::Symlink),
            minify: Some(false),
            test_packages: Some(vec!["deps".into()]),
            conflict_policy: Some(ConflictPolicy::Error),
        };
        let options = BuildOptions::builder()
            .node_modules_mode(NodeModulesMode::Skip)
            .build()
            .with_app_defaults(&config);

        assert_eq!(options.node_modules_mode(), NodeModulesMode::Skip);
        assert!(!options.minify());
        assert_eq!(options.test_packages(), ["deps".to_string()]);
        assert_eq!(options.conflict_policy(), ConflictPolicy::Error);
    }
}
