//! Configuration Loader (Figment-based)
//!
//! Loads and merges configuration from multiple sources using Figment:
//! 1. Built-in defaults (Serialized)
//! 2. Global config (~/.config/codelens/config.toml)
//! 3. Project config (.codelens/config.toml)
//! 4. Environment variables (CODELENS_* prefix)

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::types::Config;
use crate::types::{LensError, Result};

const ENV_PREFIX: &str = "CODELENS_";

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with full resolution chain using Figment:
    /// defaults → global → project → env vars
    pub fn load() -> Result<Config> {
        Self::load_layers(
            Self::global_config_path().as_deref(),
            &Self::project_config_path(),
            ENV_PREFIX,
        )
    }

    fn load_layers(global: Option<&Path>, project: &Path, env_prefix: &str) -> Result<Config> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(global_path) = global
            && global_path.exists()
        {
            debug!("Loading global config from: {}", global_path.display());
            figment = figment.merge(Toml::file(global_path));
        }

        if project.exists() {
            debug!("Loading project config from: {}", project.display());
            figment = figment.merge(Toml::file(project));
        }

        // CODELENS_LLM_TIMEOUT_SECS -> llm.timeout_secs (only the section separator splits)
        figment = figment.merge(
            Env::prefixed(env_prefix).map(|key| key.as_str().replacen('_', ".", 1).into()),
        );

        let config: Config = figment
            .extract()
            .map_err(|e| LensError::Config(format!("Configuration error: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a specific file only
    pub fn load_from_file(path: &Path) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path))
            .extract()
            .map_err(|e| LensError::Config(format!("Configuration error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Get path to global config directory (~/.config/codelens/)
    pub fn global_dir() -> Option<PathBuf> {
        env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                env::var("HOME")
                    .ok()
                    .map(|home| PathBuf::from(home).join(".config"))
            })
            .map(|p| p.join("codelens"))
    }

    /// Get path to global config file
    pub fn global_config_path() -> Option<PathBuf> {
        Self::global_dir().map(|dir| dir.join("config.toml"))
    }

    /// Get path to project config file
    pub fn project_config_path() -> PathBuf {
        Self::project_dir().join("config.toml")
    }

    /// Get project data directory
    pub fn project_dir() -> PathBuf {
        PathBuf::from(".codelens")
    }

    // =========================================================================
    // Config Commands
    // =========================================================================

    /// Show config file paths
    pub fn show_path() {
        println!("Configuration paths:");
        println!();

        if let Some(global) = Self::global_config_path() {
            let exists = if global.exists() { "✓" } else { "✗" };
            println!("  Global:  {} {}", exists, global.display());
        } else {
            println!("  Global:  (not available)");
        }

        let project = Self::project_config_path();
        let exists = if project.exists() { "✓" } else { "✗" };
        println!("  Project: {} {}", exists, project.display());
    }

    /// Show current effective configuration
    pub fn show_config(as_json: bool) -> Result<()> {
        let config = Self::load()?;
        println!("{}", Self::render(&config, as_json)?);
        Ok(())
    }

    fn render(config: &Config, as_json: bool) -> Result<String> {
        if as_json {
            Ok(serde_json::to_string_pretty(config)?)
        } else {
            Ok(toml::to_string_pretty(config)?)
        }
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Initialize global configuration
    pub fn init_global(force: bool) -> Result<PathBuf> {
        let global_dir = Self::global_dir().ok_or_else(|| {
            LensError::Config("Cannot determine global config directory".to_string())
        })?;
        Self::write_config(&global_dir, Self::default_global_config(), force)
    }

    /// Initialize project configuration
    pub fn init_project(force: bool) -> Result<PathBuf> {
        Self::write_config(&Self::project_dir(), Self::default_project_config(), force)
    }

    fn write_config(dir: &Path, content: &str, force: bool) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let config_path = dir.join("config.toml");
        if !config_path.exists() || force {
            fs::write(&config_path, content)?;
            info!("Created config: {}", config_path.display());
        } else {
            info!("Config exists: {}", config_path.display());
        }

        Ok(config_path)
    }

    // =========================================================================
    // Internal
    // =========================================================================

    /// Default global config content (TOML)
    fn default_global_config() -> &'static str {
        r#"# CodeLens Global Configuration
# User-wide defaults. Project settings in .codelens/config.toml override these.
# API keys are read from the environment (AWS_BEARER_TOKEN_BEDROCK, OPENAI_API_KEY).

version = "1.0"

[llm]
provider = "bedrock"
model = "amazon.titan-text-lite-v1"
region = "us-west-2"
timeout_secs = 60
concurrency = 4
"#
    }

    /// Default project config content (TOML)
    fn default_project_config() -> &'static str {
        r#"# CodeLens Project Configuration
# Project-specific settings that override global defaults.

version = "1.0"

[analysis]
heuristic_window = 20
max_file_size = 1048576
label_param_limit = 3
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn missing(dir: &TempDir) -> PathBuf {
        dir.path().join("absent.toml")
    }

    #[test]
    fn test_load_defaults_without_files() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            ConfigLoader::load_layers(None, &missing(&temp_dir), "CODELENS_TEST_NONE_").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_project_overrides_global() {
        let temp_dir = TempDir::new().unwrap();
        let global = temp_dir.path().join("global.toml");
        let project = temp_dir.path().join("project.toml");
        fs::write(&global, "[llm]\nmodel = \"global-model\"\nconcurrency = 2\n").unwrap();
        fs::write(&project, "[llm]\nmodel = \"project-model\"\n").unwrap();

        let config =
            ConfigLoader::load_layers(Some(&global), &project, "CODELENS_TEST_LAYERS_").unwrap();
        assert_eq!(config.llm.model, "project-model");
        assert_eq!(config.llm.concurrency, 2);
    }

    #[test]
    fn test_env_override() {
        let temp_dir = TempDir::new().unwrap();
        // SAFETY: The prefix is unique to this test
        unsafe {
            std::env::set_var("CODELENS_TEST_ENV_LLM_MODEL", "test-model");
            std::env::set_var("CODELENS_TEST_ENV_ANALYSIS_HEURISTIC_WINDOW", "7");
        }
        let config =
            ConfigLoader::load_layers(None, &missing(&temp_dir), "CODELENS_TEST_ENV_").unwrap();
        assert_eq!(config.llm.model, "test-model");
        assert_eq!(config.analysis.heuristic_window, 7);
        unsafe {
            std::env::remove_var("CODELENS_TEST_ENV_LLM_MODEL");
            std::env::remove_var("CODELENS_TEST_ENV_ANALYSIS_HEURISTIC_WINDOW");
        }
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let project = temp_dir.path().join("config.toml");
        fs::write(&project, "[llm]\ntemperature = 3.0\n").unwrap();

        let err = ConfigLoader::load_from_file(&project).unwrap_err();
        assert!(matches!(err, LensError::Config(_)));
    }

    #[test]
    fn test_default_templates_parse() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::write_config(
            temp_dir.path(),
            ConfigLoader::default_project_config(),
            false,
        )
        .unwrap();
        assert!(ConfigLoader::load_from_file(&path).is_ok());

        fs::write(&path, ConfigLoader::default_global_config()).unwrap();
        let config = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(config.llm.provider, "bedrock");
    }

    #[test]
    fn test_write_config_respects_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = ConfigLoader::write_config(temp_dir.path(), "version = \"1.0\"\n", false).unwrap();
        ConfigLoader::write_config(temp_dir.path(), "version = \"2.0\"\n", false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"1.0\"\n");

        ConfigLoader::write_config(temp_dir.path(), "version = \"2.0\"\n", true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "version = \"2.0\"\n");
    }

    #[test]
    fn test_render_formats() {
        let config = Config::default();
        let toml_text = ConfigLoader::render(&config, false).unwrap();
        assert!(toml_text.contains("[analysis]"));
        let json_text = ConfigLoader::render(&config, true).unwrap();
        assert!(json_text.contains("\"heuristic_window\": 20"));
    }
}
