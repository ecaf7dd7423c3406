//! End-to-end bundle runs against an on-disk catalog

mod common;

use app_bundler::bundler::{self, BuildOptions, NodeModulesMode};
use common::{TestWorkspace, read};
use regex::Regex;

const MAIN_JS: &str = "require(require('path').join(__dirname, 'server', 'server.js'));";

fn dev() -> app_bundler::bundler::BuildOptionsBuilder {
    BuildOptions::builder()
        .no_minify(true)
        .node_modules_mode(NodeModulesMode::Skip)
}

fn script_hashes(html: &str) -> Vec<String> {
    let re = Regex::new(r#"src="/([0-9a-f]{40})\.js""#).unwrap();
    re.captures_iter(html).map(|c| c[1].to_string()).collect()
}

#[tokio::test]
async fn test_bundle_succeeds_and_writes_entry_point() {
    let ws = TestWorkspace::new();
    let out = ws.output("bundle");

    let result = bundler::bundle(&ws.app(), &out, BuildOptions::default(), ws.catalog()).await;

    assert_eq!(result, Ok(()));
    assert_eq!(read(&out, "main.js").trim(), MAIN_JS);
    assert!(out.join("server/server.js").is_file());
    assert!(out.join("app.json").is_file());
}

#[tokio::test]
async fn test_development_html_references_package_files() {
    let ws = TestWorkspace::new();
    let out = ws.output("dev");

    bundler::bundle(&ws.app(), &out, dev().build(), ws.catalog())
        .await
        .unwrap();

    let html = read(&out, "app.html");
    let core = html.find("/packages/meteor/client.js").unwrap();
    let deps = html.find("/packages/deps/deps.js").unwrap();
    let app = html.find("/app/client/app.js").unwrap();
    assert!(core < deps && deps < app);
    assert!(html.contains(r#"href="/packages/meteor/style.css""#));
    assert!(html.contains("<div id=\"app\"></div>"));
    assert!(script_hashes(&html).is_empty());
    assert!(out.join("packages/meteor/client.js").is_file());
    assert!(out.join("app/client/app.js").is_file());
    assert!(!out.join("static_cacheable").exists());
}

#[tokio::test]
async fn test_production_html_references_only_fingerprints() {
    let ws = TestWorkspace::new();
    let out = ws.output("prod");

    let options = BuildOptions::builder()
        .node_modules_mode(NodeModulesMode::Skip)
        .build();
    bundler::bundle(&ws.app(), &out, options, ws.catalog())
        .await
        .unwrap();

    let html = read(&out, "app.html");
    assert!(!html.contains("/packages/"));
    let hashes = script_hashes(&html);
    assert_eq!(hashes.len(), 1);
    assert!(out.join(format!("static_cacheable/{}.js", hashes[0])).is_file());
    assert!(Regex::new(r#"href="/[0-9a-f]{40}\.css""#).unwrap().is_match(&html));
    assert!(!out.join("packages").exists());
    assert!(!out.join("app").exists());
}

#[tokio::test]
async fn test_test_files_only_for_requested_packages() {
    let ws = TestWorkspace::new();

    let plain = ws.output("plain");
    bundler::bundle(&ws.app(), &plain, dev().build(), ws.catalog())
        .await
        .unwrap();
    assert!(!read(&plain, "app.html").contains("/packages/meteor/url_tests.js"));

    let tested = ws.output("tested");
    let options = dev().test_packages(vec!["meteor".into()]).build();
    bundler::bundle(&ws.app(), &tested, options, ws.catalog())
        .await
        .unwrap();
    let html = read(&tested, "app.html");
    let tests = html.find("/packages/meteor/url_tests.js").unwrap();
    assert!(html.find("/packages/meteor/client.js").unwrap() < tests);
    assert!(tests < html.find("/packages/deps/deps.js").unwrap());
}

#[tokio::test]
async fn test_node_modules_skip() {
    let ws = TestWorkspace::new();
    let out = ws.output("skip");

    bundler::bundle(&ws.app(), &out, dev().build(), ws.catalog())
        .await
        .unwrap();

    assert!(std::fs::symlink_metadata(out.join("server/node_modules")).is_err());
}

#[tokio::test]
async fn test_node_modules_copy() {
    let ws = TestWorkspace::new();
    let out = ws.output("copy");

    let options = dev().node_modules_mode(NodeModulesMode::Copy).build();
    bundler::bundle(&ws.app(), &out, options, ws.catalog())
        .await
        .unwrap();

    let node_modules = out.join("server/node_modules");
    let metadata = std::fs::symlink_metadata(&node_modules).unwrap();
    assert!(metadata.is_dir());
    assert!(!metadata.file_type().is_symlink());
    assert!(node_modules.join("fibers/fibers.js").is_file());
}

#[cfg(unix)]
#[tokio::test]
async fn test_node_modules_symlink() {
    let ws = TestWorkspace::new();
    let out = ws.output("symlink");

    let options = dev().node_modules_mode(NodeModulesMode::Symlink).build();
    bundler::bundle(&ws.app(), &out, options, ws.catalog())
        .await
        .unwrap();

    let node_modules = out.join("server/node_modules");
    assert!(std::fs::symlink_metadata(&node_modules).unwrap().file_type().is_symlink());
    assert!(node_modules.join("fibers").is_dir());
}

#[tokio::test]
async fn test_missing_version_marker_fails_resolution() {
    let ws = TestWorkspace::new();
    let out = ws.output("unversioned");

    let errors = bundler::bundle(&ws.unversioned_app(), &out, dev().build(), ws.catalog())
        .await
        .unwrap_err();

    assert!(errors.first().contains("Exception while bundling"));
    assert!(errors.first().contains("Package not found: meteor"));
    assert!(!out.join("main.js").exists());
}

#[tokio::test]
async fn test_release_override_bypasses_marker() {
    let ws = TestWorkspace::new();
    let out = ws.output("override");

    let options = dev().version_override(common::RELEASE).build();
    let result = bundler::bundle(&ws.unversioned_app(), &out, options, ws.catalog()).await;

    assert_eq!(result, Ok(()));
    assert_eq!(read(&out, "main.js").trim(), MAIN_JS);
}

#[tokio::test]
async fn test_unknown_validated_override_is_reported() {
    let ws = TestWorkspace::new();
    let out = ws.output("unknown");

    let options = dev()
        .version_override("9.9")
        .validate_version_override(true)
        .build();
    let errors = bundler::bundle(&ws.app(), &out, options, ws.catalog())
        .await
        .unwrap_err();

    assert_eq!(
        errors.messages(),
        ["Exception while bundling application:\nUnknown release: 9.9"]
    );
}

#[tokio::test]
async fn test_production_names_are_stable_across_runs() {
    let ws = TestWorkspace::new();
    let options = BuildOptions::builder()
        .node_modules_mode(NodeModulesMode::Skip)
        .build();

    let first = ws.output("first");
    let second = ws.output("second");
    bundler::bundle(&ws.app(), &first, options.clone(), ws.catalog())
        .await
        .unwrap();
    bundler::bundle(&ws.app(), &second, options, ws.catalog())
        .await
        .unwrap();

    let a = script_hashes(&read(&first, "app.html"));
    let b = script_hashes(&read(&second, "app.html"));
    assert_eq!(a, b);
    assert_eq!(a.len(), 1);
}

#[tokio::test]
async fn test_manifest_lists_server_load_order_and_routes() {
    let ws = TestWorkspace::new();
    let out = ws.output("manifest");

    bundler::bundle(&ws.app(), &out, dev().build(), ws.catalog())
        .await
        .unwrap();

    let manifest: serde_json::Value = serde_json::from_str(&read(&out, "app.json")).unwrap();
    assert_eq!(manifest["release"], "0.1");
    assert_eq!(manifest["html"], "app.html");
    assert_eq!(manifest["node_modules"], "skip");
    assert_eq!(
        manifest["load"],
        serde_json::json!([
            "packages/meteor/server.js",
            "packages/deps/deps.js",
            "app/server/main.js"
        ])
    );
    let routes = manifest["static"].as_array().unwrap();
    assert!(routes
        .iter()
        .any(|r| r["url"] == "/robots.txt" && r["file"] == "static/robots.txt"));
    assert_eq!(read(&out, "static/robots.txt"), "User-agent: *\n");
    assert!(out.join("server/app/server/main.js").is_file());
}

#[tokio::test]
async fn test_missing_package_file_is_collected() {
    let ws = TestWorkspace::new();
    std::fs::remove_file(ws.catalog_dir().join("0.1/packages/deps/deps.js")).unwrap();
    let out = ws.output("broken");

    let errors = bundler::bundle(&ws.app(), &out, dev().build(), ws.catalog())
        .await
        .unwrap_err();

    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|m| m.starts_with("While building package deps")));
    assert!(read(&out, "app.html").contains("/packages/meteor/client.js"));
}

#[tokio::test]
async fn test_concurrent_bundles_into_sibling_outputs() {
    let ws = TestWorkspace::new();
    let first = ws.output("first");
    let second = ws.output("second");
    let options = BuildOptions::builder()
        .node_modules_mode(NodeModulesMode::Copy)
        .build();

    let app = ws.app();
    let (a, b) = tokio::join!(
        bundler::bundle(&app, &first, options.clone(), ws.catalog()),
        bundler::bundle(&app, &second, options, ws.catalog()),
    );

    assert_eq!(a, Ok(()));
    assert_eq!(b, Ok(()));
    for out in [&first, &second] {
        assert_eq!(read(out, "main.js").trim(), MAIN_JS);
        assert!(out.join("server/node_modules/fibers/fibers.js").is_file());
    }
    assert_eq!(
        script_hashes(&read(&first, "app.html")),
        script_hashes(&read(&second, "app.html"))
    );

    let mut entries: Vec<String> = std::fs::read_dir(ws.path.join("out"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    entries.sort();
    assert_eq!(entries, ["first", "second"]);
}

#[tokio::test]
async fn test_minifier_failure_keeps_server_output() {
    let ws = TestWorkspace::new();
    ws.write_file("catalog/0.1/packages/deps/deps.js", "var Deps = {};\n/* open\n");
    let out = ws.output("broken-prod");
    let options = BuildOptions::builder()
        .node_modules_mode(NodeModulesMode::Skip)
        .build();

    let errors = bundler::bundle(&ws.app(), &out, options, ws.catalog())
        .await
        .unwrap_err();

    assert_eq!(errors.len(), 1);
    assert!(errors.first().starts_with("Exception while bundling application:\n"));
    assert!(errors.first().contains("Failed to minify packages/deps/deps.js"));
    assert!(!out.join("app.html").exists());
    assert!(!out.join("static_cacheable").exists());
    assert_eq!(read(&out, "main.js").trim(), MAIN_JS);
    assert!(out.join("server/server.js").is_file());
    assert!(out.join("server/packages/deps/deps.js").is_file());

    let manifest: serde_json::Value = serde_json::from_str(&read(&out, "app.json")).unwrap();
    assert!(manifest["html"].is_null());
    assert_eq!(manifest["minified"], true);
}

/// Leaves sources untouched apart from a marker comment.
struct TaggingMinifier;

impl bundler::Minifier for TaggingMinifier {
    fn minify_js(&self, source: &str) -> anyhow::Result<String> {
        Ok(format!("/*tagged*/{source}"))
    }

    fn minify_css(&self, source: &str) -> anyhow::Result<String> {
        Ok(format!("/*tagged*/{source}"))
    }
}

#[tokio::test]
async fn test_custom_minifier_output_is_fingerprinted() {
    let ws = TestWorkspace::new();
    let out = ws.output("custom");
    let options = BuildOptions::builder()
        .node_modules_mode(NodeModulesMode::Skip)
        .build();

    bundler::Bundler::new(ws.catalog(), options)
        .with_minifier(std::sync::Arc::new(TaggingMinifier))
        .bundle(&ws.app(), &out)
        .await
        .unwrap();

    let hashes = script_hashes(&read(&out, "app.html"));
    assert_eq!(hashes.len(), 1);
    let script = read(&out, &format!("static_cacheable/{}.js", hashes[0]));
    assert!(script.starts_with("/*tagged*/// Core client\n"));
    assert_eq!(bundler::fingerprint(script.as_bytes()), hashes[0]);
}
