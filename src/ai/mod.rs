//! AI Integration Layer
//!
//! Optional LLM help for an analysis: generated function summaries and
//! function translation.

pub mod assistant;
pub mod prompt;
pub mod provider;

pub use assistant::{CodeAssistant, Enhancement, LlmAssistant, SummaryFailure, enhance_summaries};
pub use prompt::{PromptBuilder, PromptSection, PromptTemplates, strip_code_fence};
pub use provider::{
    BedrockProvider, ErrorCategory, ErrorClassifier, LlmError, LlmProvider, OllamaProvider,
    OpenAiProvider, ProviderConfig, SharedProvider, create_provider,
};
