pub mod analysis;
pub mod error;

pub use analysis::{
    AnalysisResult, DeclarationKind, DeclarationNode, FunctionRecord, SummarySource,
    synthesize_summary,
};
pub use error::{ErrorCategory, ErrorClassifier, FailureTag, LensError, LlmError, Result};
