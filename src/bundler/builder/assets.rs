//! Client asset pipeline.
//!
//! Development bundles copy every client file and reference it by its own
//! URL. Production bundles minify scripts and stylesheets into one
//! fingerprinted file each under `static_cacheable/`; other resources are
//! copied under `static/`.

use std::path::{Path, PathBuf};

use crate::bundler::{
    Diagnostics, Error, Result, Target,
    error::ErrorExt,
    resolver::{ResolvedGraph, UnitKind},
    utils::fs,
};

use super::{
    checksum::fingerprint,
    html::ClientDocument,
    manifest::StaticRoute,
    minify::Minifier,
};

/// Directory for fingerprinted production assets.
pub const STATIC_CACHEABLE_DIR: &str = "static_cacheable";
/// Directory for public files and production resources.
pub const STATIC_DIR: &str = "static";

/// How a client file is used, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Script,
    Stylesheet,
    /// Contents are inlined into the document body.
    Html,
    /// Served, never referenced from the document.
    Resource,
}

impl AssetKind {
    pub fn of(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("js") => Self::Script,
            Some("css") => Self::Stylesheet,
            Some("html") => Self::Html,
            _ => Self::Resource,
        }
    }
}

#[derive(Debug, Clone)]
struct ClientAsset {
    /// "package <name>" or "app", for error messages.
    owner: String,
    source: PathBuf,
    /// Development location relative to the bundle root.
    bundle_path: PathBuf,
    kind: AssetKind,
}

impl ClientAsset {
    fn name(&self) -> String {
        fs::url_path(&self.bundle_path)
    }

    fn url(&self) -> String {
        format!("/{}", self.name())
    }
}

/// Result of the client pipeline: the document to render and what to serve.
#[derive(Debug, Clone, Default)]
pub struct ClientBundle {
    pub document: ClientDocument,
    pub routes: Vec<StaticRoute>,
}

/// Builds client assets into a bundle directory.
pub struct AssetPipeline<'a> {
    out_dir: &'a Path,
    minifier: Option<&'a dyn Minifier>,
}

impl<'a> AssetPipeline<'a> {
    /// Unminified pipeline; client test files are included.
    pub fn development(out_dir: &'a Path) -> Self {
        Self {
            out_dir,
            minifier: None,
        }
    }

    /// Minifying pipeline; client test files are dropped.
    pub fn production(out_dir: &'a Path, minifier: &'a dyn Minifier) -> Self {
        Self {
            out_dir,
            minifier: Some(minifier),
        }
    }

    pub fn is_production(&self) -> bool {
        self.minifier.is_some()
    }

    /// Builds the client side of `graph` followed by the application's client
    /// files (`app_client`, relative to `app_root`).
    ///
    /// File-level failures go to `diagnostics` and the file is skipped. A
    /// minifier failure is returned as an error; nothing is fingerprinted then.
    pub async fn build(
        &self,
        graph: &ResolvedGraph,
        app_root: &Path,
        app_client: &[PathBuf],
        diagnostics: &mut Diagnostics,
    ) -> Result<ClientBundle> {
        let assets = self.collect(graph, app_root, app_client);
        log::info!(
            "Building {} client files ({})",
            assets.len(),
            if self.is_production() { "production" } else { "development" }
        );

        match self.minifier {
            None => Ok(self.build_development(assets, diagnostics).await),
            Some(minifier) => self.build_production(minifier, assets, diagnostics).await,
        }
    }

    fn collect(&self, graph: &ResolvedGraph, app_root: &Path, app_client: &[PathBuf]) -> Vec<ClientAsset> {
        let mut assets = Vec::new();

        for (package, kind) in graph.load_units() {
            let files: Vec<_> = match kind {
                UnitKind::Sources => package.files_for(Target::Client).collect(),
                UnitKind::Tests => package.test_files_for(Target::Client).collect(),
            };
            if kind == UnitKind::Tests && self.is_production() {
                if !files.is_empty() {
                    log::warn!(
                        "Dropping {} client test file(s) of {} from production bundle",
                        files.len(),
                        package.name
                    );
                }
                continue;
            }

            let base = Path::new("packages").join(&package.name);
            assets.extend(files.into_iter().map(|file| ClientAsset {
                owner: format!("package {}", package.name),
                source: package.source_path(file),
                bundle_path: base.join(&file.path),
                kind: AssetKind::of(&file.path),
            }));
        }

        assets.extend(app_client.iter().map(|rel| ClientAsset {
            owner: "app".to_string(),
            source: app_root.join(rel),
            bundle_path: Path::new("app").join(rel),
            kind: AssetKind::of(rel),
        }));
        assets
    }

    async fn build_development(
        &self,
        assets: Vec<ClientAsset>,
        diagnostics: &mut Diagnostics,
    ) -> ClientBundle {
        let mut bundle = ClientBundle::default();

        for asset in assets {
            if asset.kind == AssetKind::Html {
                match read_text(&asset.source).await {
                    Ok(text) => bundle.document.body.push(text),
                    Err(e) => diagnostics.file_error(&asset.owner, &asset.name(), &e),
                }
                continue;
            }

            let dest = self.out_dir.join(&asset.bundle_path);
            if let Err(e) = fs::copy_file(&asset.source, &dest).await {
                diagnostics.file_error(&asset.owner, &asset.name(), &e);
                continue;
            }
            log::debug!("Copied {}", asset.name());

            let url = asset.url();
            match asset.kind {
                AssetKind::Script => bundle.document.scripts.push(url.clone()),
                AssetKind::Stylesheet => bundle.document.stylesheets.push(url.clone()),
                AssetKind::Html | AssetKind::Resource => {}
            }
            bundle.routes.push(StaticRoute::new(url, asset.name(), false));
        }
        bundle
    }

    async fn build_production(
        &self,
        minifier: &dyn Minifier,
        assets: Vec<ClientAsset>,
        diagnostics: &mut Diagnostics,
    ) -> Result<ClientBundle> {
        let mut bundle = ClientBundle::default();
        let mut scripts = Vec::new();
        let mut stylesheets = Vec::new();

        for asset in assets {
            if asset.kind == AssetKind::Resource {
                let file = Path::new(STATIC_DIR).join(&asset.bundle_path);
                match fs::copy_file(&asset.source, &self.out_dir.join(&file)).await {
                    Ok(()) => bundle
                        .routes
                        .push(StaticRoute::new(asset.url(), fs::url_path(&file), false)),
                    Err(e) => diagnostics.file_error(&asset.owner, &asset.name(), &e),
                }
                continue;
            }

            let text = match read_text(&asset.source).await {
                Ok(text) => text,
                Err(e) => {
                    diagnostics.file_error(&asset.owner, &asset.name(), &e);
                    continue;
                }
            };
            match asset.kind {
                AssetKind::Script => scripts.push((asset.name(), text)),
                AssetKind::Stylesheet => stylesheets.push((asset.name(), text)),
                AssetKind::Html => bundle.document.body.push(text),
                AssetKind::Resource => {}
            }
        }

        let script_parts = minify_each(&scripts, |source| minifier.minify_js(source))?;
        let stylesheet_parts = minify_each(&stylesheets, |source| minifier.minify_css(source))?;

        if !stylesheet_parts.is_empty() {
            let route = self
                .write_cacheable(stylesheet_parts.join("\n"), "css")
                .await?;
            bundle.document.stylesheets.push(route.url.clone());
            bundle.routes.push(route);
        }
        if !script_parts.is_empty() {
            let joined: String = script_parts.iter().map(|part| format!("{part};\n")).collect();
            let route = self.write_cacheable(joined, "js").await?;
            bundle.document.scripts.push(route.url.clone());
            bundle.routes.push(route);
        }
        Ok(bundle)
    }

    async fn write_cacheable(&self, contents: String, extension: &str) -> Result<StaticRoute> {
        let hash = fingerprint(contents.as_bytes());
        let file = format!("{STATIC_CACHEABLE_DIR}/{hash}.{extension}");
        fs::write_file(&self.out_dir.join(&file), contents).await?;
        log::debug!("Wrote {file}");
        Ok(StaticRoute::new(format!("/{hash}.{extension}"), file, true))
    }
}

fn minify_each<F>(files: &[(String, String)], minify: F) -> Result<Vec<String>>
where
    F: Fn(&str) -> anyhow::Result<String>,
{
    files
        .iter()
        .map(|(name, source)| {
            minify(source).map_err(|e| Error::Minify {
                name: name.clone(),
                reason: format!("{e:#}"),
            })
        })
        .collect()
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .fs_context("reading asset", path)
}

/// Copies the application's `public/` files to `static/`, served from the
/// path below `public`.
pub async fn copy_public(
    app_root: &Path,
    public: &[PathBuf],
    out_dir: &Path,
    diagnostics: &mut Diagnostics,
) -> Vec<StaticRoute> {
    let mut routes = Vec::new();

    for rel in public {
        let served = rel.strip_prefix("public").unwrap_or(rel);
        let file = Path::new(STATIC_DIR).join(served);
        match fs::copy_file(&app_root.join(rel), &out_dir.join(&file)).await {
            Ok(()) => routes.push(StaticRoute::new(
                format!("/{}", fs::url_path(served)),
                fs::url_path(&file),
                false,
            )),
            Err(e) => diagnostics.file_error("app", &fs::url_path(rel), &e),
        }
    }
    if !routes.is_empty() {
        log::info!("Copied {} public files", routes.len());
    }
    routes
}
