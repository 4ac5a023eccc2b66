//! Error types for the advisor pipeline.

use advisor_core::error::AdvisorError;

/// Errors from fitting or evaluating the intent classifier.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("training data needs at least 2 distinct labels, found {found}")]
    TooFewLabels { found: usize },
    #[error("training example {index} has an empty utterance")]
    EmptyExample { index: usize },
    #[error("training example {index} uses the reserved fallback label")]
    ReservedLabel { index: usize },
    #[error("feature index {found} is outside the model dimension {expected}")]
    DimensionMismatch { expected: usize, found: usize },
    #[error("classifier produced a non-finite score")]
    NonFinite,
}

/// Errors reported by a text generation service.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GenerationError {
    /// Missing or rejected credentials. Not retryable.
    #[error("generation service is misconfigured: {0}")]
    Configuration(String),
    /// The service asked us to slow down.
    #[error("generation service rate limit reached: {0}")]
    RateLimited(String),
    /// Anything else: transport failures, server errors, malformed replies.
    #[error("generation request failed: {0}")]
    Request(String),
}

/// Errors from the chat engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("classifier error: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<AdvisorError> for ChatError {
    fn from(err: AdvisorError) -> Self {
        ChatError::Config(err.to_string())
    }
}
