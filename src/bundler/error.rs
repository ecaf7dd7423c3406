//! Error types for bundling stages.
//!
//! Every stage returns [`Result`]. The orchestrator converts these errors into
//! user-facing strings through [`Diagnostics`](super::Diagnostics); nothing of
//! this type escapes [`bundle`](super::bundle).

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};

/// Result type alias for bundling stages.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while resolving, building, or linking a bundle.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// Free-form error, usually raised through [`bail!`](crate::bail).
    #[error("{0}")]
    GenericError(String),

    /// Filesystem operation failed on a specific path.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being attempted, e.g. "copying asset".
        context: &'static str,
        /// Path the operation failed on.
        path: PathBuf,
        /// Underlying I/O error.
        error: io::Error,
    },

    /// Raw I/O error without path context.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// Directory traversal failed.
    #[error("{0}")]
    WalkdirError(#[from] walkdir::Error),

    /// A walked path was not under its root.
    #[error("{0}")]
    StripPrefixError(#[from] std::path::StripPrefixError),

    /// A TOML document could not be parsed.
    #[error("{0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON serialization failed.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),

    /// A handlebars template could not be compiled.
    #[error("{0}")]
    TemplateError(#[from] handlebars::TemplateError),

    /// A handlebars template could not be rendered.
    #[error("{0}")]
    RenderError(#[from] handlebars::RenderError),

    /// The catalog has no package with this name at the requested version.
    #[error("Package not found: {0}")]
    PackageNotFound(String),

    /// The requested release is unknown to the catalog.
    #[error("Unknown release: {0}")]
    UnknownRelease(String),

    /// Two packages require the same dependency at different versions.
    #[error("Version conflict for {name}: {first} vs {second}")]
    VersionConflict {
        /// Package name.
        name: String,
        /// Version selected first.
        first: String,
        /// Version requested later.
        second: String,
    },

    /// Packages depend on each other in a loop.
    #[error("Circular dependency: {0}")]
    CircularDependency(String),

    /// The minifier rejected an asset.
    #[error("Failed to minify {name}: {reason}")]
    Minify {
        /// Asset name as shown to the user.
        name: String,
        /// Minifier's explanation.
        reason: String,
    },

    /// A declared native dependency is missing from the shared module cache.
    #[error("Native module not found in cache: {0}")]
    NativeModuleNotFound(String),

    /// No shared module cache exists for the release.
    #[error("No node_modules cache available for release {0}")]
    NodeModulesCacheMissing(String),
}

/// Adds a message to an `Option` or `Result`, turning it into an [`Error`].
pub trait Context<T> {
    /// Wraps the error (or absence) with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    /// Lazily evaluated variant of [`Context::context`].
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Option<T> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

impl<T, E: Display> Context<T> for std::result::Result<T, E> {
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

/// Attaches an operation name and path to I/O errors.
pub trait ErrorExt<T> {
    /// Converts an I/O error into [`Error::Fs`].
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &'static str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context,
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Returns early with an [`Error::GenericError`].
#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::bundler::Error::GenericError(format!($msg)))
    };
    ($err:expr $(,)?) => {
        return Err($crate::bundler::Error::GenericError($err.to_string()))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($fmt, $($arg)*)))
    };
}
