//! Build options for a bundle run.
//!
//! [`BuildOptions`] is constructed through [`BuildOptionsBuilder`]. Values left
//! unset fall back to the application's `.meteor/bundle.toml`, then to
//! built-in defaults.

mod builder;
mod core;
mod modes;

pub use builder::BuildOptionsBuilder;
pub use core::{BuildOptions, DEFAULT_CORE_PACKAGE};
pub use modes::{ConflictPolicy, NodeModulesMode};
