//! Native runtime modules under `server/node_modules`.

use std::path::{Path, PathBuf};

use crate::bundler::{
    Catalog, Diagnostics, Error, NodeModulesMode, Result,
    catalog::is_contained,
    error::ErrorExt,
    resolver::ResolvedGraph,
    utils::fs,
};

const STAGE: &str = "linking node_modules";

/// Materializes the graph's native dependencies according to `mode`.
///
/// Every failure is recorded in `diagnostics`; the remaining modules are
/// still attempted.
pub async fn link_node_modules(
    mode: NodeModulesMode,
    graph: &ResolvedGraph,
    catalog: &dyn Catalog,
    out_dir: &Path,
    diagnostics: &mut Diagnostics,
) {
    let target = out_dir.join("server").join("node_modules");
    let modules = graph.native_dependencies();
    log::info!(
        "Linking {} native module(s) ({mode}): {}",
        modules.len(),
        modules.join(", ")
    );

    let outcome = match mode {
        NodeModulesMode::Skip => return,
        NodeModulesMode::Copy => {
            copy_modules(&modules, graph.release(), catalog, &target, diagnostics).await
        }
        NodeModulesMode::Symlink => {
            symlink_cache(&modules, graph.release(), catalog, &target, diagnostics).await
        }
    };
    if let Err(e) = outcome {
        diagnostics.stage_error(STAGE, &e);
    }
}

fn cache_dir(catalog: &dyn Catalog, release: &str) -> Result<PathBuf> {
    catalog
        .node_modules_dir(release)
        .filter(|dir| dir.is_dir())
        .ok_or_else(|| Error::NodeModulesCacheMissing(release.to_string()))
}

fn module_dir(cache: &Path, module: &str) -> Result<PathBuf> {
    let path = cache.join(module);
    if is_contained(Path::new(module)) && path.exists() {
        Ok(path)
    } else {
        Err(Error::NativeModuleNotFound(module.to_string()))
    }
}

async fn copy_modules(
    modules: &[&str],
    release: &str,
    catalog: &dyn Catalog,
    target: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    fs::create_dir_all(target, false).await?;
    if modules.is_empty() {
        return Ok(());
    }
    let cache = cache_dir(catalog, release)?;

    for module in modules {
        let copied = match module_dir(&cache, module) {
            Ok(source) => fs::copy_dir(&source, &target.join(module)).await,
            Err(e) => Err(e),
        };
        match copied {
            Ok(()) => log::debug!("Copied native module {module}"),
            Err(e) => diagnostics.stage_error(STAGE, &e),
        }
    }
    Ok(())
}

async fn symlink_cache(
    modules: &[&str],
    release: &str,
    catalog: &dyn Catalog,
    target: &Path,
    diagnostics: &mut Diagnostics,
) -> Result<()> {
    let cache = cache_dir(catalog, release)?;
    let cache = tokio::fs::canonicalize(&cache)
        .await
        .fs_context("resolving node_modules cache", &cache)?;

    for module in modules {
        if let Err(e) = module_dir(&cache, module) {
            diagnostics.stage_error(STAGE, &e);
        }
    }
    fs::symlink_dir(&cache, target).await?;
    log::debug!("Linked {} -> {}", target.display(), cache.display());
    Ok(())
}
