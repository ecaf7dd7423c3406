//! Common test utilities for bundle integration tests

use std::path::{Path, PathBuf};
use std::sync::Arc;

use app_bundler::bundler::{Catalog, DirectoryCatalog};
use tempfile::TempDir;

pub const RELEASE: &str = "0.1";

/// A catalog, two applications and room for outputs, all in one temp dir.
///
/// Release `0.1` holds:
/// - `meteor`: client script and stylesheet, server script, a client test
///   file, and a native dependency on `fibers`
/// - `deps`: a shared script depending on `meteor`
pub struct TestWorkspace {
    #[allow(dead_code)]
    pub temp: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl TestWorkspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        let workspace = Self { temp, path };
        workspace.create_catalog();
        workspace.create_app("app", Some(RELEASE));
        workspace.create_app("unversioned", None);
        workspace
    }

    /// Write a file in the workspace
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    pub fn catalog_dir(&self) -> PathBuf {
        self.path.join("catalog")
    }

    pub fn catalog(&self) -> Arc<dyn Catalog> {
        Arc::new(DirectoryCatalog::new(self.catalog_dir()))
    }

    /// Application with `.meteor/version` set to the fixture release.
    pub fn app(&self) -> PathBuf {
        self.path.join("app")
    }

    /// Application without a version marker.
    pub fn unversioned_app(&self) -> PathBuf {
        self.path.join("unversioned")
    }

    pub fn output(&self, name: &str) -> PathBuf {
        self.path.join("out").join(name)
    }

    fn create_catalog(&self) {
        let release = format!("catalog/{RELEASE}");

        self.write_file(
            &format!("{release}/packages/meteor/package.toml"),
            r#"summary = "Core runtime"
native_dependencies = ["fibers"]

[[files]]
path = "client.js"
where = ["client"]

[[files]]
path = "style.css"
where = ["client"]

[[files]]
path = "server.js"
where = ["server"]

[[test_files]]
path = "url_tests.js"
where = ["client"]
"#,
        );
        self.write_file(
            &format!("{release}/packages/meteor/client.js"),
            "// Core client\nvar Meteor = {};\nMeteor.isClient = true;\n",
        );
        self.write_file(
            &format!("{release}/packages/meteor/style.css"),
            "/* base */\nbody {\n  margin: 0;\n}\n",
        );
        self.write_file(
            &format!("{release}/packages/meteor/server.js"),
            "var Fibers = require('fibers');\n",
        );
        self.write_file(
            &format!("{release}/packages/meteor/url_tests.js"),
            "Tinytest.add('url', function () {});\n",
        );

        self.write_file(
            &format!("{release}/packages/deps/package.toml"),
            r#"dependencies = ["meteor"]

[[files]]
path = "deps.js"
"#,
        );
        self.write_file(
            &format!("{release}/packages/deps/deps.js"),
            "var Deps = {};\n",
        );

        self.write_file(
            &format!("{release}/node_modules/fibers/package.json"),
            r#"{ "name": "fibers" }"#,
        );
        self.write_file(
            &format!("{release}/node_modules/fibers/fibers.js"),
            "module.exports = {};\n",
        );
    }

    fn create_app(&self, name: &str, version: Option<&str>) {
        if let Some(version) = version {
            self.write_file(&format!("{name}/.meteor/version"), &format!("{version}\n"));
        }
        self.write_file(&format!("{name}/.meteor/packages"), "# direct dependencies\ndeps\n");
        self.write_file(&format!("{name}/client/app.js"), "Meteor.startup(function () {});\n");
        self.write_file(&format!("{name}/client/app.html"), "<div id=\"app\"></div>\n");
        self.write_file(&format!("{name}/server/main.js"), "console.log('server');\n");
        self.write_file(&format!("{name}/public/robots.txt"), "User-agent: *\n");
    }
}

/// Reads a file inside a bundle.
#[allow(dead_code)]
pub fn read(bundle: &Path, rel: &str) -> String {
    std::fs::read_to_string(bundle.join(rel))
        .unwrap_or_else(|e| panic!("Failed to read {rel}: {e}"))
}
