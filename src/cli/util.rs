//! CLI Common Utilities
//!
//! Shared initialization and context management for CLI commands.

use tokio::runtime::Runtime;

use crate::ai::{LlmAssistant, ProviderConfig, create_provider};
use crate::analyzer::{CodeAnalyzer, Language};
use crate::config::{Config, ConfigLoader};
use crate::types::{LensError, Result};

/// Command execution context
///
/// Holds the resolved configuration with CLI overrides applied.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub config: Config,
}

impl CommandContext {
    /// Load the layered configuration
    pub fn load() -> Result<Self> {
        Ok(Self {
            config: ConfigLoader::load()?,
        })
    }

    /// Apply a `--window` override, the highest-priority layer
    pub fn with_window(mut self, window: Option<usize>) -> Result<Self> {
        if let Some(window) = window {
            self.config.analysis.heuristic_window = window;
            self.config.validate()?;
        }
        Ok(self)
    }

    pub fn analyzer(&self, language: Option<Language>) -> CodeAnalyzer {
        let analyzer = CodeAnalyzer::new(self.config.analysis.clone());
        match language {
            Some(language) => analyzer.with_language(language),
            None => analyzer,
        }
    }

    /// Assistant over the configured provider
    pub fn assistant(&self) -> Result<LlmAssistant> {
        let provider = create_provider(&ProviderConfig::from(&self.config.llm))?;
        Ok(LlmAssistant::new(provider, &self.config.llm))
    }
}

/// Runtime for the AI commands; analysis itself stays synchronous
pub fn runtime() -> Result<Runtime> {
    Runtime::new().map_err(LensError::Io)
}

/// Parse a `--language` value such as `python`, `C++` or `cs`
pub fn parse_language(s: &str) -> std::result::Result<Language, String> {
    match s.parse::<Language>() {
        Ok(Language::Unknown) | Err(()) => Err(format!(
            "Unknown language '{}'. Use a name such as python, rust, go, java or c++",
            s
        )),
        Ok(language) => Ok(language),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_language() {
        assert_eq!(parse_language("python"), Ok(Language::Python));
        assert_eq!(parse_language("C++"), Ok(Language::Cpp));
        assert!(parse_language("unknown").is_err());
        assert!(parse_language("klingon").is_err());
    }

    #[test]
    fn test_window_override() {
        let context = CommandContext {
            config: Config::default(),
        };
        let context = context.with_window(Some(5)).unwrap();
        assert_eq!(context.config.analysis.heuristic_window, 5);

        let source = "fn long() {\n    a();\n    b();\n    c();\n    d();\n    e();\n}\n";
        let result = context.analyzer(None).analyze(source, "long.rs");
        assert_eq!(result.functions[0].source_slice.lines().count(), 5);
        assert!(context.with_window(Some(0)).is_err());
    }
}
