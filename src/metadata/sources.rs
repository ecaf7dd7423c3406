//! Application source file discovery.

use std::cmp::Ordering;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::bundler::{Target, error::Result};

/// Application files, relative to the application root, in load order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppSources {
    pub client: Vec<PathBuf>,
    pub server: Vec<PathBuf>,
    /// Files under `public/`, served as-is.
    pub public: Vec<PathBuf>,
}

/// Walks the application tree and classifies its files.
///
/// Dot-prefixed entries, `node_modules`, editor backups ending in `~`, and
/// anything under `exclude` are skipped. A `client` path component limits a
/// file to the client, a `server` component to the server; other files go to
/// both.
pub fn discover_sources(root: &Path, exclude: &[PathBuf]) -> Result<AppSources> {
    let mut sources = AppSources::default();

    let walker = WalkDir::new(root).follow_links(false).into_iter();
    let entries = walker.filter_entry(|entry| {
        if entry.depth() == 0 {
            return true;
        }
        let name = entry.file_name().to_string_lossy();
        !(name.starts_with('.')
            || name.ends_with('~')
            || name == "node_modules"
            || exclude.iter().any(|skip| entry.path() == skip))
    });

    for entry in entries {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry.path().strip_prefix(root)?.to_path_buf();

        if first_component(&rel) == Some("public") {
            sources.public.push(rel);
            continue;
        }
        if is_for(&rel, Target::Client) {
            sources.client.push(rel.clone());
        }
        if is_for(&rel, Target::Server) {
            sources.server.push(rel);
        }
    }

    sources.client.sort_by(|a, b| load_order(a, b));
    sources.server.sort_by(|a, b| load_order(a, b));
    sources.public.sort();

    log::debug!(
        "Discovered {} client, {} server, {} public files in {}",
        sources.client.len(),
        sources.server.len(),
        sources.public.len(),
        root.display()
    );
    Ok(sources)
}

fn first_component(path: &Path) -> Option<&str> {
    path.components().next().and_then(|c| c.as_os_str().to_str())
}

fn has_dir(path: &Path, name: &str) -> bool {
    let parent = path.parent().unwrap_or(Path::new(""));
    parent
        .components()
        .any(|c| matches!(c, Component::Normal(n) if n == name))
}

fn is_for(path: &Path, target: Target) -> bool {
    match target {
        Target::Client => !has_dir(path, "server"),
        Target::Server => !has_dir(path, "client"),
    }
}

fn is_main(path: &Path) -> bool {
    path.file_stem().is_some_and(|stem| stem == "main")
}

/// `lib/` files first, deeper paths before shallower, `main.*` last, then by path.
fn load_order(a: &Path, b: &Path) -> Ordering {
    has_dir(b, "lib")
        .cmp(&has_dir(a, "lib"))
        .then_with(|| is_main(a).cmp(&is_main(b)))
        .then_with(|| b.components().count().cmp(&a.components().count()))
        .then_with(|| a.cmp(b))
}
