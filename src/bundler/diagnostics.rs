//! Run-scoped error collection.
//!
//! A [`Diagnostics`] value is owned by the orchestrator for one bundle run and
//! passed by `&mut` into each stage. Stages keep going after recording an
//! error; only the orchestrator decides what is fatal.

use std::fmt;

use super::Error;

/// Prefix of every message produced from a stage-level failure.
pub const EXCEPTION_PREFIX: &str = "Exception while bundling application";

/// Ordered collector of user-facing error strings.
#[derive(Debug, Default)]
pub struct Diagnostics {
    messages: Vec<String>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a message as-is.
    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::error!("{message}");
        self.messages.push(message);
    }

    /// Records a failure that stopped a whole stage.
    pub fn exception(&mut self, err: &Error) {
        self.error(format!("{EXCEPTION_PREFIX}:\n{err}"));
    }

    /// Records a failure of one step of a stage, e.g. linking one module.
    pub fn stage_error(&mut self, stage: &str, err: &Error) {
        self.error(format!("While {stage}: {err}"));
    }

    /// Records a failure on a single file; the stage carries on.
    pub fn file_error(&mut self, owner: &str, file: &str, err: &Error) {
        self.error(format!("While building {owner}: {file}: {err}"));
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Finishes the run: `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), BundleErrors> {
        if self.messages.is_empty() {
            Ok(())
        } else {
            Err(BundleErrors(self.messages))
        }
    }
}

/// Failure outcome of [`bundle`](super::bundle): never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleErrors(Vec<String>);

impl BundleErrors {
    /// Builds an error list from a single message.
    pub fn single(message: impl Into<String>) -> Self {
        Self(vec![message.into()])
    }

    /// Messages in the order stages produced them.
    pub fn messages(&self) -> &[String] {
        &self.0
    }

    /// The first recorded message.
    pub fn first(&self) -> &str {
        &self.0[0]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for BundleErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("\n"))
    }
}

impl std::error::Error for BundleErrors {}

impl IntoIterator for BundleErrors {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
