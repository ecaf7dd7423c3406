//! Main bundler orchestration and coordination.
//!
//! This module provides the [`Bundler`] orchestrator that runs every stage of
//! a bundle build on a dedicated task and collects their failures.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    bail,
    bundler::{
        BuildOptions, BundleErrors, Catalog, Diagnostics, Error, Result,
        diagnostics::EXCEPTION_PREFIX,
        error::ErrorExt,
        resolver::{self, ResolvedGraph, version::effective_version},
        utils::fs,
    },
    metadata::{AppSources, Application, discover_sources},
};

use super::{
    assets::{AssetPipeline, copy_public},
    html::{APP_HTML, write_app_html},
    manifest::AppManifest,
    minify::{DefaultMinifier, Minifier},
    node_modules::link_node_modules,
    server::build_server,
};

/// Main bundler orchestrator.
///
/// Holds what is shared between runs: the package catalog, the production
/// minifier and the caller's options. Each [`Bundler::bundle`] call is
/// independent and may run concurrently with others.
///
/// # Examples
///
/// ```no_run
/// use std::{path::Path, sync::Arc};
/// use app_bundler::bundler::{BuildOptions, Bundler, DirectoryCatalog};
///
/// # async fn example() {
/// let catalog = Arc::new(DirectoryCatalog::new("/var/lib/app-bundler/catalog"));
/// let bundler = Bundler::new(catalog, BuildOptions::default());
///
/// match bundler.bundle(Path::new("my-app"), Path::new("build/bundle")).await {
///     Ok(()) => println!("bundle written"),
///     Err(errors) => {
///         for message in errors.iter() {
///             eprintln!("{message}");
///         }
///     }
/// }
/// # }
/// ```
pub struct Bundler {
    catalog: Arc<dyn Catalog>,
    minifier: Arc<dyn Minifier>,
    options: BuildOptions,
}

impl std::fmt::Debug for Bundler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bundler")
            .field("catalog", &"<dyn Catalog>")
            .field("minifier", &"<dyn Minifier>")
            .field("options", &self.options)
            .finish()
    }
}

impl Bundler {
    /// Creates a bundler using [`DefaultMinifier`] for production builds.
    pub fn new(catalog: Arc<dyn Catalog>, options: BuildOptions) -> Self {
        Self {
            catalog,
            minifier: Arc::new(DefaultMinifier),
            options,
        }
    }

    /// Replaces the production minifier.
    pub fn with_minifier(mut self, minifier: Arc<dyn Minifier>) -> Self {
        self.minifier = minifier;
        self
    }

    /// Builds `app_dir` into `output_dir`.
    ///
    /// The bundle is assembled in a staging directory next to `output_dir`
    /// and moved into place at the end, replacing any previous output.
    ///
    /// # Returns
    ///
    /// `Ok(())` when every stage succeeded, otherwise every recorded message
    /// in stage order. A panic inside the build is reported as a message too.
    pub async fn bundle(&self, app_dir: &Path, output_dir: &Path) -> std::result::Result<(), BundleErrors> {
        let run = Run {
            catalog: Arc::clone(&self.catalog),
            minifier: Arc::clone(&self.minifier),
            options: self.options.clone(),
            app_dir: app_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
        };

        match tokio::spawn(run.execute()).await {
            Ok(outcome) => outcome,
            Err(e) => Err(BundleErrors::single(format!("{EXCEPTION_PREFIX}:\n{e}"))),
        }
    }
}

/// State owned by one bundle task.
struct Run {
    catalog: Arc<dyn Catalog>,
    minifier: Arc<dyn Minifier>,
    options: BuildOptions,
    app_dir: PathBuf,
    output_dir: PathBuf,
}

impl Run {
    async fn execute(self) -> std::result::Result<(), BundleErrors> {
        let mut diagnostics = Diagnostics::new();

        let staging = match staging_dir(&self.output_dir).await {
            Ok(staging) => staging,
            Err(e) => {
                diagnostics.exception(&e);
                return diagnostics.into_result();
            }
        };
        log::info!(
            "Bundling {} into {}",
            self.app_dir.display(),
            self.output_dir.display()
        );

        self.build(&staging, &mut diagnostics).await;

        if let Err(e) = finalize(&staging, &self.output_dir).await {
            diagnostics.exception(&e);
        }

        if diagnostics.is_empty() {
            log::info!("Bundle written to {}", self.output_dir.display());
        } else {
            log::warn!("Bundle finished with {} error(s)", diagnostics.len());
        }
        diagnostics.into_result()
    }

    async fn build(&self, staging: &Path, diagnostics: &mut Diagnostics) {
        let exclude = match absolute_path(&self.output_dir).await {
            Ok(output) => vec![output],
            Err(e) => {
                diagnostics.exception(&e);
                return;
            }
        };
        let Resolved {
            app,
            options,
            graph,
            sources,
        } = match self.resolve(exclude).await {
            Ok(resolved) => resolved,
            Err(e) => {
                diagnostics.exception(&e);
                return;
            }
        };

        let pipeline = if options.minify() {
            AssetPipeline::production(staging, self.minifier.as_ref())
        } else {
            AssetPipeline::development(staging)
        };
        let mut routes = Vec::new();
        let mut html = None;
        match pipeline
            .build(&graph, app.root(), &sources.client, diagnostics)
            .await
        {
            Ok(client) => {
                routes.extend(client.routes);
                match write_app_html(staging, &client.document).await {
                    Ok(()) => html = Some(APP_HTML.to_string()),
                    Err(e) => diagnostics.exception(&e),
                }
            }
            Err(e) => diagnostics.exception(&e),
        }
        routes.extend(copy_public(app.root(), &sources.public, staging, diagnostics).await);

        let load = match build_server(&graph, app.root(), &sources.server, staging, diagnostics).await {
            Ok(load) => load,
            Err(e) => {
                diagnostics.exception(&e);
                Vec::new()
            }
        };

        link_node_modules(
            options.node_modules_mode(),
            &graph,
            self.catalog.as_ref(),
            staging,
            diagnostics,
        )
        .await;

        let manifest = AppManifest {
            release: graph.release().to_string(),
            load,
            static_routes: routes,
            html,
            minified: options.minify(),
            node_modules: options.node_modules_mode(),
        };
        if let Err(e) = manifest.write(staging).await {
            diagnostics.exception(&e);
        }
    }

    /// Loads the application, resolves its package graph and lists its
    /// sources. Fatal on error.
    ///
    /// Manifest reads, catalog lookups and the source walk are blocking, so
    /// they run on the blocking pool.
    async fn resolve(&self, exclude: Vec<PathBuf>) -> Result<Resolved> {
        let root = tokio::fs::canonicalize(&self.app_dir)
            .await
            .fs_context("resolving application directory", &self.app_dir)?;
        let catalog = Arc::clone(&self.catalog);
        let options = self.options.clone();

        tokio::task::spawn_blocking(move || -> Result<Resolved> {
            let app = Application::load(&root)?;
            let options = options.with_app_defaults(app.config());

            let release = effective_version(&app, &options, catalog.as_ref())?;
            let graph = resolver::resolve(
                catalog.as_ref(),
                release.as_deref(),
                app.dependencies(),
                &options,
            )?;
            let sources = discover_sources(app.root(), &exclude)?;
            Ok(Resolved {
                app,
                options,
                graph,
                sources,
            })
        })
        .await
        .map_err(|e| Error::GenericError(format!("Resolve task panicked: {e}")))?
    }
}

/// Everything the build stages need from the application and catalog.
struct Resolved {
    app: Application,
    options: BuildOptions,
    graph: ResolvedGraph,
    sources: AppSources,
}

/// Creates an empty, uniquely named directory beside `output_dir`.
async fn staging_dir(output_dir: &Path) -> Result<PathBuf> {
    let Some(name) = output_dir.file_name() else {
        bail!("Invalid output directory: {}", output_dir.display());
    };
    let parent = parent_dir(output_dir);
    let staging = parent.join(format!(
        ".{}.staging-{}",
        name.to_string_lossy(),
        uuid::Uuid::new_v4()
    ));
    fs::create_dir_all(&staging, true).await?;
    log::debug!("Staging bundle in {}", staging.display());
    Ok(staging)
}

/// Replaces `output_dir` with the finished staging directory.
async fn finalize(staging: &Path, output_dir: &Path) -> Result<()> {
    fs::remove_path(output_dir).await?;
    tokio::fs::rename(staging, output_dir)
        .await
        .fs_context("moving bundle into place", output_dir)
}

/// Absolute form of a path whose parent exists.
async fn absolute_path(path: &Path) -> Result<PathBuf> {
    let parent = parent_dir(path);
    let parent = tokio::fs::canonicalize(parent)
        .await
        .fs_context("resolving output directory", parent)?;
    Ok(match path.file_name() {
        Some(name) => parent.join(name),
        None => parent,
    })
}

fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}
