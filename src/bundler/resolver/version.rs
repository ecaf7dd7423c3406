//! Effective release selection.

use crate::bundler::{BuildOptions, Catalog, Error, Result};
use crate::metadata::Application;

/// Picks the release for this run: the override if set, else the marker.
///
/// `Ok(None)` means neither is present. The package resolver then fails on
/// its first lookup, which reports the core package as not found.
pub fn effective_version(
    app: &Application,
    options: &BuildOptions,
    catalog: &dyn Catalog,
) -> Result<Option<String>> {
    if let Some(version) = options.version_override() {
        if let Some(marker) = app.version().filter(|marker| *marker != version) {
            log::info!("Release override {version} replaces marker release {marker}");
        }
        if options.validate_version_override() && !catalog.has_release(version) {
            return Err(Error::UnknownRelease(version.to_string()));
        }
        return Ok(Some(version.to_string()));
    }

    match app.version() {
        Some(version) => Ok(Some(version.to_string())),
        None => {
            log::warn!(
                "{} has no version marker and no release override",
                app.root().display()
            );
            Ok(None)
        }
    }
}
