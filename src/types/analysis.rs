use serde::{Deserialize, Serialize};

use crate::analyzer::language::Language;

/// Structural snapshot of one analyzed file.
///
/// Created once per analysis and never mutated afterwards; enhancement
/// produces a new value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub language: Language,
    /// Lines with at least one non-whitespace character
    pub lines_of_code: usize,
    /// Unique, sorted ascending by code point
    pub libraries: Vec<String>,
    pub functions: Vec<FunctionRecord>,
    pub declaration_tree: Vec<DeclarationNode>,
    /// Graphviz DOT description of `declaration_tree`; `None` when the tree is empty
    pub tree_graph: Option<String>,
}

impl AnalysisResult {
    pub fn empty(language: Language) -> Self {
        Self {
            language,
            lines_of_code: 0,
            libraries: Vec::new(),
            functions: Vec::new(),
            declaration_tree: Vec::new(),
            tree_graph: None,
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionRecord> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Replace the summary of the `index`-th function with a generated one
    pub fn set_generated_summary(&mut self, index: usize, summary: String) {
        if let Some(record) = self.functions.get_mut(index) {
            record.summary = summary;
            record.summary_source = SummarySource::Generated;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarySource {
    /// First line of an attached doc comment
    DocComment,
    /// "Function with parameters: ..." built from the signature
    Synthesized,
    /// Written by the AI assistant
    Generated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionRecord {
    pub name: String,
    pub summary: String,
    pub summary_source: SummarySource,
    /// Verbatim source text covering the declaration
    pub source_slice: String,
    /// 1-based, inclusive
    pub start_line: usize,
    /// 1-based, inclusive
    pub end_line: usize,
}

impl FunctionRecord {
    pub fn is_synthesized(&self) -> bool {
        self.summary_source == SummarySource::Synthesized
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Class,
    Function,
}

impl DeclarationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeclarationKind::Class => "class",
            DeclarationKind::Function => "function",
        }
    }
}

impl std::fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One class or function in the declaration forest.
///
/// Nodes with an empty `parent_name` are roots; a node's children are the
/// nodes whose `parent_name` equals its name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationNode {
    pub kind: DeclarationKind,
    pub name: String,
    pub parent_name: String,
    pub nesting_level: usize,
    /// Declared parameters without an implicit receiver (`self`, `this`)
    pub parameter_names: Vec<String>,
}

impl DeclarationNode {
    pub fn class(name: impl Into<String>, parent_name: impl Into<String>, level: usize) -> Self {
        Self {
            kind: DeclarationKind::Class,
            name: name.into(),
            parent_name: parent_name.into(),
            nesting_level: level,
            parameter_names: Vec::new(),
        }
    }

    pub fn function(
        name: impl Into<String>,
        parent_name: impl Into<String>,
        level: usize,
        parameter_names: Vec<String>,
    ) -> Self {
        Self {
            kind: DeclarationKind::Function,
            name: name.into(),
            parent_name: parent_name.into(),
            nesting_level: level,
            parameter_names,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_name.is_empty()
    }
}

/// Synthesized summary used when no doc comment is attached
pub fn synthesize_summary(parameter_names: &[String]) -> String {
    if parameter_names.is_empty() {
        "Function with no parameters".to_string()
    } else {
        format!("Function with parameters: {}", parameter_names.join(", "))
    }
}
