//! `app.json`, the runtime manifest read by `server/server.js`.

use std::path::Path;

use serde::Serialize;

use crate::bundler::{NodeModulesMode, Result, utils::fs};

/// File name of the manifest inside the bundle.
pub const MANIFEST_FILE: &str = "app.json";

/// A file served over HTTP from the bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaticRoute {
    /// Request path, starting with `/`.
    pub url: String,
    /// File path relative to the bundle root.
    pub file: String,
    /// Content-addressed; safe to cache forever.
    pub cacheable: bool,
}

impl StaticRoute {
    pub fn new(url: impl Into<String>, file: impl Into<String>, cacheable: bool) -> Self {
        Self {
            url: url.into(),
            file: file.into(),
            cacheable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppManifest {
    pub release: String,
    /// Server scripts relative to `server/`, in load order.
    pub load: Vec<String>,
    #[serde(rename = "static")]
    pub static_routes: Vec<StaticRoute>,
    /// Client document relative to the bundle root; absent when none was written.
    pub html: Option<String>,
    /// Production build. A production `app.html` with no client assets has
    /// no fingerprinted references, so this is the only record of the mode.
    pub minified: bool,
    pub node_modules: NodeModulesMode,
}

impl AppManifest {
    pub async fn write(&self, out_dir: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        log::debug!(
            "Writing {} ({} server files, {} static routes)",
            MANIFEST_FILE,
            self.load.len(),
            self.static_routes.len()
        );
        fs::write_file(&out_dir.join(MANIFEST_FILE), json + "\n").await
    }
}
