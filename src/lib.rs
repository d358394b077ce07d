//! CodeLens - Static Structure Analyzer for Source Files
//!
//! Reads one source file and reports its language, imported libraries,
//! functions with summaries, and a class/function declaration tree rendered
//! as Graphviz DOT and as a text tree.
//!
//! ## Core Features
//!
//! - **Language Classification**: file extension first, content signatures second
//! - **Precise Python Extraction**: tree-sitter syntax tree with real nesting
//! - **Heuristic Extraction**: per-language line patterns for everything else
//! - **AI Assistant**: optional generated summaries and function translation
//!
//! ## Quick Start
//!
//! ```
//! use codelens::CodeAnalyzer;
//!
//! let result = CodeAnalyzer::default().analyze("def add(a, b):\n    return a + b\n", "m.py");
//! assert_eq!(result.functions[0].name, "add");
//! ```
//!
//! ## Modules
//!
//! - [`analyzer`]: Classification, extraction strategies, graph rendering
//! - [`ai`]: LLM providers, prompts, the code assistant
//! - [`config`]: Layered configuration
//! - [`types`]: Analysis data model and errors

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

pub use analyzer::{CodeAnalyzer, Language, classify};
pub use config::{AnalysisConfig, Config, ConfigLoader, LlmConfig};
pub use types::{
    AnalysisResult, DeclarationKind, DeclarationNode, FailureTag, FunctionRecord, LensError,
    Result, SummarySource,
};

// =============================================================================
// AI Re-exports
// =============================================================================

pub use ai::{CodeAssistant, Enhancement, LlmAssistant, LlmProvider, enhance_summaries};
