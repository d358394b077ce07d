//! Extraction strategies.
//!
//! Python gets a full grammar parse; every other language is scanned with
//! per-language line patterns.

mod heuristic;
pub mod patterns;
mod python;
mod traits;

pub use heuristic::HeuristicExtractor;
pub use patterns::ParamStyle;
pub use python::PythonExtractor;
pub use traits::{Extraction, Extractor, LibrarySet, SourceLines, create_ts_parser, get_node_text};

use crate::analyzer::language::Language;
use crate::config::AnalysisConfig;

/// Pick the extraction strategy for a classified language
pub fn extractor_for(language: Language, config: &AnalysisConfig) -> Box<dyn Extractor> {
    if language.has_precise_parser() {
        match PythonExtractor::new() {
            Ok(extractor) => {
                tracing::debug!("Using precise extractor for {}", language);
                return Box::new(extractor);
            }
            Err(e) => {
                tracing::warn!("Precise parser unavailable, falling back to patterns: {}", e);
            }
        }
    }

    tracing::debug!(
        "Using heuristic extractor for {} (window {})",
        language,
        config.heuristic_window
    );
    Box::new(HeuristicExtractor::new(language, config.heuristic_window))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_selection() {
        let config = AnalysisConfig::default();
        assert_eq!(extractor_for(Language::Python, &config).language(), Language::Python);
        assert_eq!(extractor_for(Language::Go, &config).language(), Language::Go);
        assert_eq!(extractor_for(Language::Unknown, &config).language(), Language::Unknown);
    }

    #[test]
    fn test_python_is_precise_and_nested() {
        let config = AnalysisConfig::default();
        let source = "class A:\n    def m(self):\n        pass\n";
        let result = extractor_for(Language::Python, &config).extract(source);
        assert_eq!(result.tree[1].parent_name, "A");
        assert_eq!(result.tree[1].nesting_level, 1);
    }

    #[test]
    fn test_window_comes_from_config() {
        let config = AnalysisConfig {
            heuristic_window: 2,
            ..AnalysisConfig::default()
        };
        let source = "fn a() {\n    1\n    2\n}\n";
        let result = extractor_for(Language::Rust, &config).extract(source);
        assert_eq!(result.functions[0].source_slice, "fn a() {\n    1");
    }
}
