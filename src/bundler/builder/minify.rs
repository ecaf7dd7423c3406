//! Production asset minification.
//!
//! The bundler only depends on the [`Minifier`] trait. [`DefaultMinifier`]
//! is the built-in implementation: oxc for scripts, lightningcss for
//! stylesheets.

use anyhow::{Result, anyhow, bail};
use lightningcss::{
    printer::PrinterOptions,
    stylesheet::{MinifyOptions, ParserOptions, StyleSheet},
};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_minifier::{CompressOptions, MangleOptions, MinifierOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Turns one script or stylesheet into its minified form.
pub trait Minifier: Send + Sync {
    fn minify_js(&self, source: &str) -> Result<String>;

    fn minify_css(&self, source: &str) -> Result<String>;
}

/// Parser-backed minifier.
///
/// Scripts are parsed as classic scripts, not modules: every client file is
/// loaded by its own `<script>` tag and shares globals with the others, so
/// top-level names are never renamed or dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultMinifier;

impl Minifier for DefaultMinifier {
    fn minify_js(&self, source: &str) -> Result<String> {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_script(true);

        let ret = Parser::new(&allocator, source, source_type).parse();
        if !ret.errors.is_empty() {
            let messages: Vec<String> = ret.errors.iter().map(|e| e.to_string()).collect();
            bail!("{}", messages.join("; "));
        }
        let mut program = ret.program;

        let minified = oxc_minifier::Minifier::new(MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::safest()),
        })
        .minify(&allocator, &mut program);

        let code = Codegen::new()
            .with_options(CodegenOptions::minify())
            .with_scoping(minified.scoping)
            .build(&program)
            .code;
        Ok(code)
    }

    fn minify_css(&self, source: &str) -> Result<String> {
        let mut stylesheet = StyleSheet::parse(source, ParserOptions::default())
            .map_err(|e| anyhow!("Failed to parse CSS: {}", e))?;

        stylesheet
            .minify(MinifyOptions::default())
            .map_err(|e| anyhow!("Failed to minify CSS: {}", e))?;

        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| anyhow!("Failed to print CSS: {}", e))?;

        Ok(result.code)
    }
}
