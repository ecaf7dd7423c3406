//! app-bundler - bundles a web application into a deployable directory.
//!
//! This binary resolves the application's packages, builds its client and
//! server assets, and writes the bundle, printing every collected error.

use std::process;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Run CLI and get exit code
    let exit_code = match app_bundler::cli::run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            e.exit_code()
        }
    };

    process::exit(exit_code);
}
