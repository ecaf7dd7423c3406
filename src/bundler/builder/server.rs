//! Server side of the bundle: `main.js`, the bootstrap, and server code.

use std::path::{Path, PathBuf};

use crate::bundler::{
    Diagnostics, Result, Target,
    resolver::{ResolvedGraph, UnitKind},
    utils::fs,
};

/// Contents of `<bundle>/main.js`.
pub const MAIN_JS: &str = "require(require('path').join(__dirname, 'server', 'server.js'));\n";

const SERVER_BOOTSTRAP: &str = include_str!("../templates/server.js");

/// Server directory inside the bundle.
pub const SERVER_DIR: &str = "server";

/// Writes the entry points and copies server files.
///
/// Returns the server load order: `.js` files relative to `server/`. Files
/// that fail to copy are reported to `diagnostics` and left out; failing to
/// write the entry points is an error.
pub async fn build_server(
    graph: &ResolvedGraph,
    app_root: &Path,
    app_server: &[PathBuf],
    out_dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<String>> {
    fs::write_file(&out_dir.join("main.js"), MAIN_JS).await?;
    let server_dir = out_dir.join(SERVER_DIR);
    fs::write_file(&server_dir.join("server.js"), SERVER_BOOTSTRAP).await?;

    let mut load = Vec::new();

    for (package, kind) in graph.load_units() {
        let files: Vec<_> = match kind {
            UnitKind::Sources => package.files_for(Target::Server).collect(),
            UnitKind::Tests => package.test_files_for(Target::Server).collect(),
        };
        let owner = format!("package {}", package.name);
        for file in files {
            let rel = Path::new("packages").join(&package.name).join(&file.path);
            copy_server_file(&package.source_path(file), &server_dir, &rel, &owner, &mut load, diagnostics)
                .await;
        }
    }

    for rel in app_server {
        let bundled = Path::new("app").join(rel);
        copy_server_file(&app_root.join(rel), &server_dir, &bundled, "app", &mut load, diagnostics).await;
    }

    log::info!("Bundled {} server scripts", load.len());
    Ok(load)
}

async fn copy_server_file(
    source: &Path,
    server_dir: &Path,
    rel: &Path,
    owner: &str,
    load: &mut Vec<String>,
    diagnostics: &mut Diagnostics,
) {
    let name = fs::url_path(rel);
    match fs::copy_file(source, &server_dir.join(rel)).await {
        Ok(()) => {
            log::debug!("Copied server file {name}");
            if rel.extension().is_some_and(|e| e.eq_ignore_ascii_case("js")) {
                load.push(name);
            }
        }
        Err(e) => diagnostics.file_error(owner, &format!("{SERVER_DIR}/{name}"), &e),
    }
}
