//! Config Command
//!
//! Manage CodeLens configuration.
//!
//! Usage:
//!   codelens config show [-f json]
//!   codelens config path
//!   codelens config init [-g] [--force]

use crate::cli::ui::Output;
use crate::config::ConfigLoader;
use crate::types::{LensError, Result};

/// Show the merged effective configuration
pub fn show(format: &str) -> Result<()> {
    let as_json = match format {
        "json" => true,
        "text" | "toml" => false,
        other => {
            return Err(LensError::Config(format!(
                "Invalid format '{}'. Valid values: text, json",
                other
            )));
        }
    };
    ConfigLoader::show_config(as_json)
}

/// Show configuration paths
pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

/// Initialize global or project configuration
pub fn init(global: bool, force: bool) -> Result<()> {
    let (scope, config_path) = if global {
        ("global", ConfigLoader::init_global(force)?)
    } else {
        ("project", ConfigLoader::init_project(force)?)
    };

    let output = Output::new();
    output.success(&format!("Initialized {} configuration", scope));
    output.field("Config", &config_path.display().to_string());
    Ok(())
}
