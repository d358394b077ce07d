//! Analyze Command
//!
//! Prints the structural snapshot of one source file.
//!
//! Usage:
//!   codelens analyze <FILE> [--format text|json|dot] [--language L] [--ai] [--window N] [--source]

use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::ai::{SummaryFailure, enhance_summaries};
use crate::analyzer::Language;
use crate::analyzer::graph::{EMPTY_TREE_TEXT, render_text_tree};
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::types::{AnalysisResult, FunctionRecord, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Dot,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "dot" => Ok(Self::Dot),
            _ => Err(format!(
                "Invalid format '{}'. Valid values: text, json, dot",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    pub file: PathBuf,
    pub format: OutputFormat,
    pub language: Option<Language>,
    pub ai: bool,
    pub window: Option<usize>,
    /// Print each function's source slice under its summary
    pub show_source: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(flatten)]
    analysis: &'a AnalysisResult,
    #[serde(skip_serializing_if = "no_failures")]
    ai_failures: &'a [SummaryFailure],
}

fn no_failures(failures: &&[SummaryFailure]) -> bool {
    failures.is_empty()
}

pub fn run(options: AnalyzeOptions) -> Result<()> {
    let context = CommandContext::load()?.with_window(options.window)?;
    let analysis = context
        .analyzer(options.language)
        .analyze_file(&options.file)?;

    let (analysis, failures) = if options.ai {
        let assistant = context.assistant()?;
        let enhancement = runtime()?.block_on(enhance_summaries(
            &assistant,
            &analysis,
            context.config.llm.concurrency,
        ));
        (enhancement.result, enhancement.failures)
    } else {
        (analysis, Vec::new())
    };

    match options.format {
        OutputFormat::Json => {
            let report = Report {
                analysis: &analysis,
                ai_failures: &failures,
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Dot => println!("{}", render_dot(&analysis)),
        OutputFormat::Text => {
            print_text(&options.file, &analysis, &failures, options.show_source)
        }
    }

    Ok(())
}

/// DOT text, or a comment-only graph description for an empty tree
fn render_dot(analysis: &AnalysisResult) -> String {
    match &analysis.tree_graph {
        Some(dot) => dot.clone(),
        None => format!("// {}", EMPTY_TREE_TEXT),
    }
}

fn print_text(
    file: &std::path::Path,
    analysis: &AnalysisResult,
    failures: &[SummaryFailure],
    show_source: bool,
) {
    let output = Output::new();

    output.header(&file.display().to_string());
    output.field("Language", analysis.language.as_str());
    output.field("Lines of code", &analysis.lines_of_code.to_string());
    output.field(
        &format!("Libraries ({})", analysis.libraries.len()),
        &libraries_line(analysis),
    );

    output.section(&format!("Functions ({})", analysis.functions.len()));
    for function in &analysis.functions {
        output.function(
            &function.name,
            (function.start_line, function.end_line),
            &function.summary,
        );
        if show_source {
            output.code(&numbered_source(function));
        }
    }

    output.section("Structure");
    println!("{}", render_text_tree(&analysis.declaration_tree));

    if !failures.is_empty() {
        output.section("AI summary failures");
        for failure in failures {
            output.failure(&failure.function, &failure.message);
        }
    }
}

fn libraries_line(analysis: &AnalysisResult) -> String {
    if analysis.libraries.is_empty() {
        return "(none)".to_string();
    }
    analysis.libraries.join(", ")
}

/// Source slice with right-aligned line numbers, `  N | code`
fn numbered_source(function: &FunctionRecord) -> String {
    let width = function.end_line.to_string().len();
    function
        .source_slice
        .lines()
        .enumerate()
        .map(|(i, line)| format!("{:>width$} | {}", function.start_line + i, line))
        .collect::<Vec<_>>()
        .join("\n")
}
