//! Code Assistant
//!
//! The capability the analyzer's consumers use for AI help: a one-sentence
//! function summary and a function translation. Failures never reach the
//! analysis itself; `enhance_summaries` records them per function.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use super::prompt::{PromptTemplates, strip_code_fence};
use super::provider::SharedProvider;
use crate::analyzer::Language;
use crate::config::LlmConfig;
use crate::types::{AnalysisResult, Result};

#[async_trait]
pub trait CodeAssistant: Send + Sync {
    /// One-sentence description of the function `name`
    async fn summarize(&self, name: &str, code: &str, language: Language) -> Result<String>;

    /// `code` rewritten in the target language
    async fn translate(&self, code: &str, from: Language, to: &str) -> Result<String>;
}

/// `CodeAssistant` backed by an LLM provider
pub struct LlmAssistant {
    provider: SharedProvider,
    summary_max_tokens: u32,
    translate_max_tokens: u32,
}

impl LlmAssistant {
    pub fn new(provider: SharedProvider, config: &LlmConfig) -> Self {
        Self {
            provider,
            summary_max_tokens: config.summary_max_tokens,
            translate_max_tokens: config.translate_max_tokens,
        }
    }
}

#[async_trait]
impl CodeAssistant for LlmAssistant {
    async fn summarize(&self, name: &str, code: &str, language: Language) -> Result<String> {
        let prompt = PromptTemplates::summary(name, language.as_str(), code);
        let output = self
            .provider
            .complete(&prompt, self.summary_max_tokens)
            .await?;
        Ok(output.lines().next().unwrap_or_default().trim().to_string())
    }

    async fn translate(&self, code: &str, from: Language, to: &str) -> Result<String> {
        info!(
            "Translating {} function to {} via {}",
            from,
            to,
            self.provider.name()
        );
        let prompt = PromptTemplates::translation(from.as_str(), to, code);
        let output = self
            .provider
            .complete(&prompt, self.translate_max_tokens)
            .await?;
        Ok(strip_code_fence(&output).to_string())
    }
}

/// A function whose summary could not be generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryFailure {
    pub function: String,
    /// `MODEL_ERROR: ...`, `HTTP_ERROR: ...` or `SYSTEM_ERROR: ...`
    pub message: String,
}

/// Outcome of `enhance_summaries`
#[derive(Debug, Clone)]
pub struct Enhancement {
    pub result: AnalysisResult,
    pub failures: Vec<SummaryFailure>,
}

/// Replace synthesized summaries with generated ones.
///
/// Doc-comment summaries are kept. The input is never modified; functions
/// whose request fails keep their synthesized summary and are reported in
/// `failures` in declaration order.
pub async fn enhance_summaries(
    assistant: &dyn CodeAssistant,
    analysis: &AnalysisResult,
    concurrency: usize,
) -> Enhancement {
    let language = analysis.language;
    let pending: Vec<usize> = analysis
        .functions
        .iter()
        .enumerate()
        .filter(|(_, f)| f.is_synthesized())
        .map(|(i, _)| i)
        .collect();

    debug!(
        "Enhancing {} of {} function summaries",
        pending.len(),
        analysis.functions.len()
    );

    let outcomes: Vec<(usize, Result<String>)> = stream::iter(pending)
        .map(|index| {
            let record = &analysis.functions[index];
            async move {
                let outcome = assistant
                    .summarize(&record.name, &record.source_slice, language)
                    .await;
                (index, outcome)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut result = analysis.clone();
    let mut failures = Vec::new();
    for (index, outcome) in outcomes {
        match outcome {
            Ok(summary) if !summary.is_empty() => result.set_generated_summary(index, summary),
            Ok(_) => failures.push(SummaryFailure {
                function: analysis.functions[index].name.clone(),
                message: "MODEL_ERROR: empty summary".to_string(),
            }),
            Err(e) => failures.push(SummaryFailure {
                function: analysis.functions[index].name.clone(),
                message: e.tagged(),
            }),
        }
    }

    Enhancement { result, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::provider::{ErrorCategory, LlmError, LlmProvider};
    use crate::analyzer::CodeAnalyzer;
    use crate::types::{LensError, SummarySource};
    use std::sync::{Arc, Mutex};

    /// Replies per prompt content; records the token limit of every call
    struct MockProvider {
        limits: Mutex<Vec<u32>>,
    }

    impl MockProvider {
        fn shared() -> Arc<Self> {
            Arc::new(Self {
                limits: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl LlmProvider for MockProvider {
        async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String> {
            self.limits.lock().unwrap().push(max_tokens);
            if prompt.contains("'broken'") {
                return Err(
                    LlmError::with_provider(ErrorCategory::Network, "connection reset", "mock")
                        .into(),
                );
            }
            if prompt.contains("'garbled'") {
                return Err(LlmError::new(ErrorCategory::ParseError, "no results").into());
            }
            if prompt.starts_with("Convert this") {
                return Ok("```rust\nfn add(a: i32, b: i32) -> i32 { a + b }\n```".to_string());
            }
            Ok(" Adds two numbers.\nExtra rambling.".to_string())
        }

        fn name(&self) -> &str {
            "mock"
        }

        fn model(&self) -> &str {
            "mock-1"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(true)
        }
    }

    fn assistant(provider: Arc<MockProvider>) -> LlmAssistant {
        LlmAssistant::new(provider, &LlmConfig::default())
    }

    const SOURCE: &str = "\
def add(a, b):
    return a + b

def broken():
    pass

def documented():
    \"\"\"Already explained.\"\"\"

def garbled(x):
    return x
";

    #[tokio::test]
    async fn test_summarize_takes_first_line() {
        let provider = MockProvider::shared();
        let summary = assistant(provider.clone())
            .summarize("add", "def add(a, b): ...", Language::Python)
            .await
            .unwrap();
        assert_eq!(summary, "Adds two numbers.");
        assert_eq!(*provider.limits.lock().unwrap(), vec![50]);
    }

    #[tokio::test]
    async fn test_translate_strips_fence() {
        let provider = MockProvider::shared();
        let code = assistant(provider.clone())
            .translate("def add(a, b): return a + b", Language::Python, "Rust")
            .await
            .unwrap();
        assert_eq!(code, "fn add(a: i32, b: i32) -> i32 { a + b }");
        assert_eq!(*provider.limits.lock().unwrap(), vec![400]);
    }

    #[tokio::test]
    async fn test_enhance_isolates_failures() {
        let analysis = CodeAnalyzer::default().analyze(SOURCE, "math.py");
        let snapshot = analysis.clone();
        let enhancement = enhance_summaries(&assistant(MockProvider::shared()), &analysis, 2).await;

        // Input untouched
        assert_eq!(analysis, snapshot);

        let result = &enhancement.result;
        let add = result.function("add").unwrap();
        assert_eq!(add.summary, "Adds two numbers.");
        assert_eq!(add.summary_source, SummarySource::Generated);

        let documented = result.function("documented").unwrap();
        assert_eq!(documented.summary, "Already explained.");
        assert_eq!(documented.summary_source, SummarySource::DocComment);

        assert!(result.function("broken").unwrap().is_synthesized());

        let failed: Vec<_> = enhancement
            .failures
            .iter()
            .map(|f| (f.function.as_str(), f.message.split(':').next().unwrap()))
            .collect();
        assert_eq!(failed, vec![("broken", "HTTP_ERROR"), ("garbled", "MODEL_ERROR")]);
    }

    #[tokio::test]
    async fn test_enhance_sends_only_synthesized() {
        let provider = MockProvider::shared();
        let analysis = CodeAnalyzer::default().analyze(SOURCE, "math.py");
        enhance_summaries(&assistant(provider.clone()), &analysis, 0).await;
        assert_eq!(provider.limits.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_system_failure_tag() {
        struct Offline;

        #[async_trait]
        impl CodeAssistant for Offline {
            async fn summarize(&self, _: &str, _: &str, _: Language) -> Result<String> {
                Err(LensError::Config("no provider".to_string()))
            }
            async fn translate(&self, _: &str, _: Language, _: &str) -> Result<String> {
                Err(LensError::Config("no provider".to_string()))
            }
        }

        let analysis = CodeAnalyzer::default().analyze("def f():\n    pass\n", "f.py");
        let enhancement = enhance_summaries(&Offline, &analysis, 4).await;
        assert_eq!(enhancement.failures.len(), 1);
        assert_eq!(
            enhancement.failures[0].message,
            "SYSTEM_ERROR: Config error: no provider"
        );
    }
}
