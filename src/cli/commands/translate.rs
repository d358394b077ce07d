//! Translate Command
//!
//! Converts one function of a source file to another language.
//!
//! Usage:
//!   codelens translate <FILE> --function NAME --to LANG

use std::path::PathBuf;

use crate::ai::CodeAssistant;
use crate::analyzer::Language;
use crate::cli::ui::Output;
use crate::cli::util::{CommandContext, runtime};
use crate::types::{AnalysisResult, LensError, Result};

#[derive(Debug, Clone)]
pub struct TranslateOptions {
    pub file: PathBuf,
    pub function: String,
    pub to: String,
    pub language: Option<Language>,
}

pub fn run(options: TranslateOptions) -> Result<()> {
    let context = CommandContext::load()?;
    let analysis = context
        .analyzer(options.language)
        .analyze_file(&options.file)?;
    let source = function_source(&analysis, &options.function)?;

    let assistant = context.assistant()?;
    let outcome = runtime()?.block_on(translate_function(
        &assistant,
        source,
        analysis.language,
        &options.to,
    ));

    println!("{}", outcome);
    Ok(())
}

fn function_source<'a>(analysis: &'a AnalysisResult, name: &str) -> Result<&'a str> {
    analysis
        .function(name)
        .map(|f| f.source_slice.as_str())
        .ok_or_else(|| {
            Output::new().error(&format!(
                "Available functions: {}",
                analysis
                    .functions
                    .iter()
                    .map(|f| f.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            ));
            LensError::FunctionNotFound(name.to_string())
        })
}

/// Translated code, or the tagged failure in its place
pub async fn translate_function(
    assistant: &dyn CodeAssistant,
    code: &str,
    from: Language,
    to: &str,
) -> String {
    match assistant.translate(code, from, to).await {
        Ok(code) => code,
        Err(e) => e.tagged(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::CodeAnalyzer;
    use crate::types::ErrorCategory;
    use async_trait::async_trait;

    struct Echo;

    #[async_trait]
    impl CodeAssistant for Echo {
        async fn summarize(&self, name: &str, _: &str, _: Language) -> Result<String> {
            Ok(name.to_string())
        }

        async fn translate(&self, code: &str, from: Language, to: &str) -> Result<String> {
            if to == "COBOL" {
                return Err(LensError::llm_with_category(
                    ErrorCategory::RateLimit,
                    "slow down",
                ));
            }
            Ok(format!("// {} -> {}\n{}", from, to, code))
        }
    }

    #[test]
    fn test_function_source() {
        let analysis =
            CodeAnalyzer::default().analyze("def add(a, b):\n    return a + b\n", "m.py");
        assert_eq!(
            function_source(&analysis, "add").unwrap(),
            "def add(a, b):\n    return a + b"
        );
        assert!(matches!(
            function_source(&analysis, "sub"),
            Err(LensError::FunctionNotFound(name)) if name == "sub"
        ));
    }

    #[tokio::test]
    async fn test_translate_function_output() {
        let code = translate_function(&Echo, "def f(): pass", Language::Python, "Go").await;
        assert_eq!(code, "// Python -> Go\ndef f(): pass");
    }

    #[tokio::test]
    async fn test_translate_failure_is_tagged() {
        let code = translate_function(&Echo, "def f(): pass", Language::Python, "COBOL").await;
        assert!(code.starts_with("HTTP_ERROR: "));
    }
}
