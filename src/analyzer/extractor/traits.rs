use std::collections::BTreeSet;

use crate::analyzer::language::Language;
use crate::types::{DeclarationNode, FunctionRecord, LensError, Result};

/// Output shared by both extraction strategies
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Unique, sorted ascending
    pub libraries: Vec<String>,
    pub functions: Vec<FunctionRecord>,
    pub tree: Vec<DeclarationNode>,
}

impl Extraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty() && self.functions.is_empty() && self.tree.is_empty()
    }
}

/// Turns source text into libraries, functions and a declaration tree.
///
/// Implementations never fail on malformed input; they return an empty or
/// partial `Extraction` instead.
pub trait Extractor: Send + Sync {
    fn extract(&self, source: &str) -> Extraction;
    fn language(&self) -> Language;
}

/// Collects library names, de-duplicated and ordered by code point
#[derive(Debug, Default)]
pub struct LibrarySet(BTreeSet<String>);

impl LibrarySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() {
            self.0.insert(name.to_string());
        }
    }

    pub fn into_sorted(self) -> Vec<String> {
        self.0.into_iter().collect()
    }
}

/// Source split on `\n` so that re-joining reproduces the original bytes
pub struct SourceLines<'a> {
    lines: Vec<&'a str>,
}

impl<'a> SourceLines<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            lines: source.split('\n').collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a str> {
        self.lines.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &'a str)> + '_ {
        self.lines.iter().copied().enumerate()
    }

    /// Lines `start..=end` (0-based), clipped to the source, joined with `\n`
    pub fn slice(&self, start: usize, end: usize) -> String {
        if start >= self.lines.len() || end < start {
            return String::new();
        }
        let end = end.min(self.lines.len() - 1);
        self.lines[start..=end].join("\n")
    }
}

/// Extract text content from a tree-sitter node.
/// Returns empty string if extraction fails (with debug logging).
#[inline]
pub fn get_node_text<'a>(node: tree_sitter::Node, content: &'a [u8]) -> &'a str {
    node.utf8_text(content).unwrap_or_else(|e| {
        tracing::debug!(
            "UTF-8 extraction failed at {}:{}-{}:{}: {}",
            node.start_position().row + 1,
            node.start_position().column,
            node.end_position().row + 1,
            node.end_position().column,
            e
        );
        ""
    })
}

/// Create a tree-sitter parser for the given grammar.
pub fn create_ts_parser<L: Into<tree_sitter::Language>>(
    language: L,
    lang_name: &str,
) -> Result<tree_sitter::Parser> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&language.into())
        .map_err(|e| LensError::Parse {
            message: format!("Failed to set {} language: {}", lang_name, e),
            path: String::new(),
        })?;
    Ok(parser)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_set_sorted_and_unique() {
        let mut set = LibrarySet::new();
        set.insert("requests");
        set.insert("asyncio");
        set.insert("requests");
        set.insert("  ");
        set.insert("Zlib");

        assert_eq!(set.into_sorted(), vec!["Zlib", "asyncio", "requests"]);
    }

    #[test]
    fn test_source_lines_slice() {
        let lines = SourceLines::new("a\nb\r\nc\n");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines.slice(0, 1), "a\nb\r");
        assert_eq!(lines.slice(1, 99), "b\r\nc\n");
        assert_eq!(lines.slice(10, 12), "");
        assert_eq!(lines.slice(2, 0), "");
        assert_eq!(lines.slice(2, usize::MAX), "c\n");
    }

    #[test]
    fn test_extraction_is_empty() {
        assert!(Extraction::new().is_empty());
    }
}
