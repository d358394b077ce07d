//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//!
//! The analyzer itself never fails on source content: decode problems are
//! recovered by lossy decoding and parse problems yield empty extractions.
//! Errors here come from I/O, configuration, and the optional AI assistant.
//!
//! ## Failure Tags
//!
//! Assistant failures are surfaced to the user as tagged strings instead of
//! being propagated:
//!
//! - `MODEL_ERROR`: the model answered but the answer is unusable
//! - `HTTP_ERROR`: transport, status, auth, or rate-limit failures
//! - `SYSTEM_ERROR`: configuration, I/O, and everything else

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for routing assistant failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rate limited by the provider
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable or model not found
    Unavailable,
    /// Invalid request
    BadRequest,
    /// Response could not be understood
    ParseError,
    /// Temporary server issues
    Transient,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
        }
    }
}

impl ErrorCategory {
    /// User-facing failure tag for this category
    pub fn failure_tag(&self) -> FailureTag {
        match self {
            Self::ParseError => FailureTag::Model,
            Self::RateLimit
            | Self::Auth
            | Self::Network
            | Self::Unavailable
            | Self::BadRequest
            | Self::Transient => FailureTag::Http,
        }
    }
}

/// Tag prefixed to assistant failure strings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureTag {
    Model,
    Http,
    System,
}

impl FailureTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "MODEL_ERROR",
            Self::Http => "HTTP_ERROR",
            Self::System => "SYSTEM_ERROR",
        }
    }
}

impl std::fmt::Display for FailureTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// LLM error with category and provider context
#[derive(Debug, Clone)]
pub struct LlmError {
    /// Error category for routing decisions
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Create a new LLM error
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
        }
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Error classifier for provider failures
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a provider
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        match status {
            429 => LlmError::with_provider(ErrorCategory::RateLimit, message, provider),
            401 | 403 => LlmError::with_provider(ErrorCategory::Auth, message, provider),
            400 | 422 => LlmError::with_provider(ErrorCategory::BadRequest, message, provider),
            500 | 502 | 503 | 504 => {
                LlmError::with_provider(ErrorCategory::Transient, message, provider)
            }
            404 => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
            _ => LlmError::with_provider(ErrorCategory::Unavailable, message, provider),
        }
    }

    /// Classify a transport-level reqwest failure
    pub fn classify_transport(err: &reqwest::Error, provider: &str) -> LlmError {
        if err.is_decode() {
            return LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider);
        }
        if err.is_timeout() || err.is_connect() {
            return LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider);
        }
        if let Some(status) = err.status() {
            return Self::classify_http_status(status.as_u16(), &err.to_string(), provider);
        }
        LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
    }

    /// Error for a response that arrived but carried no usable text
    pub fn empty_output(provider: &str) -> LlmError {
        LlmError::with_provider(ErrorCategory::ParseError, "model returned no text", provider)
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum LensError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    /// Structured LLM error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Simple LLM API error (client construction and similar)
    #[error("LLM API error: {0}")]
    LlmApi(String),

    #[error("Parse error in {path}: {message}")]
    Parse { message: String, path: String },

    #[error("Config error: {0}")]
    Config(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),
}

impl From<LlmError> for LensError {
    fn from(err: LlmError) -> Self {
        LensError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, LensError>;

impl LensError {
    /// Create an LLM error with category
    pub fn llm_with_category(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Llm(LlmError::new(category, message))
    }

    /// Failure tag used when this error is shown in place of assistant output
    pub fn failure_tag(&self) -> FailureTag {
        match self {
            Self::Llm(e) => e.category.failure_tag(),
            Self::Json(_) => FailureTag::Model,
            _ => FailureTag::System,
        }
    }

    /// Render as `TAG: message`
    pub fn tagged(&self) -> String {
        let message = match self {
            Self::Llm(e) => e.to_string(),
            other => other.to_string(),
        };
        format!("{}: {}", self.failure_tag(), message)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
        assert_eq!(ErrorCategory::ParseError.to_string(), "PARSE_ERROR");
    }

    #[test]
    fn test_every_category_has_a_tag() {
        use ErrorCategory::*;
        for category in [RateLimit, Auth, Network, Unavailable, BadRequest, Transient] {
            assert_eq!(category.failure_tag(), FailureTag::Http, "{}", category);
        }
        assert_eq!(ParseError.failure_tag(), FailureTag::Model);
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "test");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);
        assert_eq!(rate_limit.provider.as_deref(), Some("test"));

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "test");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(500, "Server error", "test");
        assert_eq!(server_error.category, ErrorCategory::Transient);

        let missing = ErrorClassifier::classify_http_status(404, "No such model", "test");
        assert_eq!(missing.category, ErrorCategory::Unavailable);
    }

    #[test]
    fn test_failure_tags() {
        let http: LensError = ErrorClassifier::classify_http_status(403, "denied", "bedrock").into();
        assert_eq!(http.failure_tag(), FailureTag::Http);
        assert!(http.tagged().starts_with("HTTP_ERROR: "));

        let model: LensError = ErrorClassifier::empty_output("bedrock").into();
        assert_eq!(model.failure_tag(), FailureTag::Model);
        assert!(model.tagged().starts_with("MODEL_ERROR: "));

        let system = LensError::Config("no api key".to_string());
        assert_eq!(system.tagged(), "SYSTEM_ERROR: Config error: no api key");
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }
}
