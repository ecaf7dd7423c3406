//! `app.html` generation.

use std::path::Path;

use handlebars::Handlebars;
use serde::Serialize;

use crate::bundler::{Result, utils::fs};

const APP_HTML_TEMPLATE: &str = include_str!("../templates/app.html.hbs");

/// File name of the generated document inside the bundle.
pub const APP_HTML: &str = "app.html";

/// What the client document loads, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClientDocument {
    /// Stylesheet URLs for `<link rel="stylesheet">` tags.
    pub stylesheets: Vec<String>,
    /// Script URLs for `<script src>` tags.
    pub scripts: Vec<String>,
    /// Raw HTML fragments placed in `<body>`.
    pub body: Vec<String>,
}

impl ClientDocument {
    /// Renders the document.
    pub fn render(&self) -> Result<String> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars.register_template_string(APP_HTML, APP_HTML_TEMPLATE)?;
        Ok(handlebars.render(APP_HTML, self)?)
    }
}

/// Renders `document` to `<out_dir>/app.html`.
pub async fn write_app_html(out_dir: &Path, document: &ClientDocument) -> Result<()> {
    let html = document.render()?;
    log::debug!(
        "Writing {} ({} scripts, {} stylesheets)",
        APP_HTML,
        document.scripts.len(),
        document.stylesheets.len()
    );
    fs::write_file(&out_dir.join(APP_HTML), html).await
}
