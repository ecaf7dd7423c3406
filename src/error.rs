//! Error types for the command line front end.
//!
//! Library stages use [`crate::bundler::Error`]; a finished run reports
//! [`BundleErrors`]. This module wraps both for the binary.

use thiserror::Error;

use crate::bundler::BundleErrors;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, BundlerError>;

/// Main error type for the binary
#[derive(Error, Debug)]
pub enum BundlerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A stage error outside of a bundle run
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),

    /// A bundle run failed; one message per line
    #[error("{0}")]
    Bundle(#[from] BundleErrors),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

impl BundlerError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Cli(_) => 2,
            _ => 1,
        }
    }
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// No catalog location was given and none could be derived
    #[error("Missing required argument: {argument}")]
    MissingArgument {
        /// Argument name
        argument: String,
    },
}
