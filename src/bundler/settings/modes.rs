//! Enumerated option values.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// How native runtime modules reach `server/node_modules`.
///
/// # Example
///
/// ```toml
/// # .meteor/bundle.toml
/// node_modules = "symlink"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeModulesMode {
    /// No `node_modules` entry is created.
    Skip,
    /// A real directory holding copies of each module.
    #[default]
    Copy,
    /// A symbolic link to the release's shared module cache.
    Symlink,
}

impl fmt::Display for NodeModulesMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Skip => "skip",
            Self::Copy => "copy",
            Self::Symlink => "symlink",
        })
    }
}

impl FromStr for NodeModulesMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "copy" => Ok(Self::Copy),
            "symlink" => Ok(Self::Symlink),
            other => Err(format!(
                "Invalid node_modules mode: {other}. Valid modes: skip, copy, symlink"
            )),
        }
    }
}

/// What to do when two packages require one dependency at different versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Keep the version that was resolved first and log a warning.
    #[default]
    FirstSeen,
    /// Fail resolution.
    Error,
}
