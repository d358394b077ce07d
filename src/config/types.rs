//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/codelens/) and project (.codelens/) level configuration.

use serde::{Deserialize, Serialize};

use crate::types::{LensError, Result};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Configuration version
    pub version: String,

    /// Code analysis settings
    pub analysis: AnalysisConfig,

    /// LLM provider settings
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            analysis: AnalysisConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `LensError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.heuristic_window == 0 {
            return Err(LensError::Config(
                "analysis.heuristic_window must be greater than 0".to_string(),
            ));
        }

        if self.analysis.max_file_size == 0 {
            return Err(LensError::Config(
                "analysis.max_file_size must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(LensError::Config(format!(
                "LLM temperature must be between 0.0 and 2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.llm.timeout_secs == 0 {
            return Err(LensError::Config(
                "LLM timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.llm.concurrency == 0 {
            return Err(LensError::Config(
                "LLM concurrency must be greater than 0".to_string(),
            ));
        }

        if self.llm.summary_max_tokens == 0 || self.llm.translate_max_tokens == 0 {
            return Err(LensError::Config(
                "LLM token limits must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Analysis Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Lines captured per function by the heuristic extractor
    pub heuristic_window: usize,

    /// Files above this size (bytes) are refused
    pub max_file_size: u64,

    /// Parameters shown in a graph label before `...`
    pub label_param_limit: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            heuristic_window: 20,
            max_file_size: 1024 * 1024,
            label_param_limit: 3,
        }
    }
}

// =============================================================================
// LLM Configuration
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Provider name (bedrock, openai, ollama)
    pub provider: String,

    /// Model name
    pub model: String,

    /// Cloud region, used by bedrock
    pub region: String,

    /// Endpoint override
    pub api_base: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Temperature for LLM generation
    pub temperature: f32,

    /// Token budget for a one-sentence summary
    pub summary_max_tokens: u32,

    /// Token budget for a translated function
    pub translate_max_tokens: u32,

    /// Concurrent summary requests
    pub concurrency: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "bedrock".to_string(),
            model: "amazon.titan-text-lite-v1".to_string(),
            region: "us-west-2".to_string(),
            api_base: None,
            timeout_secs: 60,
            temperature: 0.0,
            summary_max_tokens: 50,
            translate_max_tokens: 400,
            concurrency: 4,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.version, "1.0");
        assert_eq!(config.llm.provider, "bedrock");
        assert_eq!(config.analysis.heuristic_window, 20);
        assert_eq!(config.analysis.max_file_size, 1_048_576);
        assert_eq!(config.llm.summary_max_tokens, 50);
        assert_eq!(config.llm.translate_max_tokens, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_out_of_range() {
        let mut config = Config::default();
        config.analysis.heuristic_window = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.temperature = 2.5;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.llm.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: Config = toml::from_str("[analysis]\nheuristic_window = 5\n").unwrap();
        assert_eq!(config.analysis.heuristic_window, 5);
        assert_eq!(config.analysis.label_param_limit, 3);
        assert_eq!(config.llm, LlmConfig::default());
    }
}
