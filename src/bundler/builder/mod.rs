//! Bundle orchestration and build stages.
//!
//! This module provides the main [`Bundler`] orchestrator and the stages it
//! runs against a staging directory.
//!
//! # Overview
//!
//! For one run the bundler:
//! 1. Picks the effective release and resolves the package graph
//! 2. Builds client assets (development copies or production minification)
//! 3. Copies public files, server code and the server bootstrap
//! 4. Links native modules into `server/node_modules`
//! 5. Writes `app.json` and moves the staging directory into place
//!
//! # Module Organization
//!
//! - [`assets`] - client pipeline and public files
//! - [`checksum`] - SHA-1 content fingerprints
//! - [`html`] - `app.html` rendering
//! - [`manifest`] - `app.json`
//! - [`minify`] - [`Minifier`] trait and [`DefaultMinifier`]
//! - [`node_modules`] - native module linking
//! - [`orchestrator`] - [`Bundler`]
//! - [`server`] - `main.js`, `server/server.js` and server code

pub mod assets;
pub mod checksum;
pub mod html;
pub mod manifest;
pub mod minify;
pub mod node_modules;
mod orchestrator;
pub mod server;

pub use checksum::fingerprint;
pub use manifest::{AppManifest, StaticRoute};
pub use minify::{DefaultMinifier, Minifier};
pub use orchestrator::Bundler;
