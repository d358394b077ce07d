//! Code Analyzer Module
//!
//! Turns one source file into an [`AnalysisResult`]:
//! - Language classification by extension and content signatures
//! - Precise (tree-sitter) or heuristic (line pattern) extraction
//! - Declaration tree rendering as Graphviz DOT

pub mod extractor;
pub mod graph;
pub mod language;

use std::path::Path;

pub use extractor::{Extraction, Extractor, HeuristicExtractor, PythonExtractor, extractor_for};
pub use graph::{build_graph, render_text_tree};
pub use language::{Language, classify};

use crate::config::AnalysisConfig;
use crate::types::{AnalysisResult, LensError, Result};

/// Lines containing at least one non-whitespace character
pub fn count_loc(source: &str) -> usize {
    source.lines().filter(|line| !line.trim().is_empty()).count()
}

pub struct CodeAnalyzer {
    config: AnalysisConfig,
    language_override: Option<Language>,
}

impl Default for CodeAnalyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl CodeAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            language_override: None,
        }
    }

    /// Skip classification and analyze every input as `language`
    pub fn with_language(mut self, language: Language) -> Self {
        self.language_override = Some(language);
        self
    }

    /// Analyze raw bytes; invalid UTF-8 is replaced, never rejected
    pub fn analyze_bytes(&self, bytes: &[u8], filename: &str) -> AnalysisResult {
        let source = String::from_utf8_lossy(bytes);
        self.analyze(&source, filename)
    }

    pub fn analyze(&self, source: &str, filename: &str) -> AnalysisResult {
        let language = self
            .language_override
            .unwrap_or_else(|| classify(filename, source));
        tracing::debug!("Analyzing {} as {}", filename, language);

        let extraction = extractor_for(language, &self.config).extract(source);
        let tree_graph = graph::build_graph_with_limit(&extraction.tree, self.config.label_param_limit);

        AnalysisResult {
            language,
            lines_of_code: count_loc(source),
            libraries: extraction.libraries,
            functions: extraction.functions,
            declaration_tree: extraction.tree,
            tree_graph,
        }
    }

    /// Read and analyze a file, refusing files above `max_file_size`
    pub fn analyze_file(&self, path: &Path) -> Result<AnalysisResult> {
        let size = std::fs::metadata(path)?.len();
        if size > self.config.max_file_size {
            return Err(LensError::Config(format!(
                "{} is {} bytes, above analysis.max_file_size ({})",
                path.display(),
                size,
                self.config.max_file_size
            )));
        }

        let bytes = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(self.analyze_bytes(&bytes, &filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::io::Write;

    #[test]
    fn test_empty_input() {
        let result = CodeAnalyzer::default().analyze("", "empty.py");
        assert_eq!(result.language, Language::Python);
        assert_eq!(result.lines_of_code, 0);
        assert!(result.libraries.is_empty());
        assert!(result.functions.is_empty());
        assert!(result.declaration_tree.is_empty());
        assert!(result.tree_graph.is_none());
    }

    #[test]
    fn test_python_snapshot() {
        let source = r#"import os
from collections import abc

class Store:
    def get(self, key):
        """Return the stored value."""
        return os.environ.get(key)

def main():
    pass
"#;
        let result = CodeAnalyzer::default().analyze(source, "store.py");
        assert_eq!(result.lines_of_code, 8);
        assert_eq!(result.libraries, vec!["collections", "os"]);
        assert_eq!(result.function("get").unwrap().summary, "Return the stored value.");
        assert_eq!(result.function("main").unwrap().summary, "Function with no parameters");

        let graph = result.tree_graph.unwrap();
        assert!(graph.contains("class_Store -> function_get;"));
        assert!(graph.contains("Module -> function_main;"));
    }

    #[test]
    fn test_language_override() {
        let analyzer = CodeAnalyzer::default().with_language(Language::Go);
        let result = analyzer.analyze("func Run() {}\n", "notes.txt");
        assert_eq!(result.language, Language::Go);
        assert_eq!(result.functions[0].name, "Run");
    }

    #[test]
    fn test_content_signature_classification() {
        let source = "<?php\nfunction hello($name) {\n    echo $name;\n}\n";
        let result = CodeAnalyzer::default().analyze(source, "script");
        assert_eq!(result.language, Language::Php);
        assert_eq!(result.functions[0].summary, "Function with parameters: name");
    }

    #[test]
    fn test_invalid_utf8_is_lossy() {
        let bytes = b"def ok():\n    pass\n# \xff\xfe\n";
        let result = CodeAnalyzer::default().analyze_bytes(bytes, "broken.py");
        assert_eq!(result.lines_of_code, 3);
        assert_eq!(result.functions.len(), 1);
    }

    #[test]
    fn test_analyze_file_respects_size_limit() {
        let mut file = tempfile::Builder::new().suffix(".rs").tempfile().unwrap();
        writeln!(file, "fn main() {{}}").unwrap();

        let result = CodeAnalyzer::default().analyze_file(file.path()).unwrap();
        assert_eq!(result.language, Language::Rust);

        let analyzer = CodeAnalyzer::new(AnalysisConfig {
            max_file_size: 4,
            ..AnalysisConfig::default()
        });
        assert!(matches!(
            analyzer.analyze_file(file.path()),
            Err(LensError::Config(_))
        ));
    }

    #[test]
    fn test_count_loc_ignores_blank_lines() {
        assert_eq!(count_loc("a\n\n   \n\tb\r\n"), 2);
        assert_eq!(count_loc(""), 0);
    }

    proptest! {
        #[test]
        fn prop_loc_counts_non_blank_lines(
            lines in prop::collection::vec(
                prop_oneof![
                    "[ \t]{0,4}".prop_map(|s| (s, false)),
                    "[ \t]{0,2}[a-z(){};]{1,8}[ \t]{0,2}".prop_map(|s| (s, true)),
                ],
                0..40,
            )
        ) {
            let source = lines.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>().join("\n");
            let expected = lines.iter().filter(|(_, has_code)| *has_code).count();
            prop_assert_eq!(count_loc(&source), expected);
        }
    }
}
