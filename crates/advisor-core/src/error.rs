use thiserror::Error;

/// Top-level error type for the advisor service.
///
/// Subsystem crates define their own error types and convert into this one
/// (or from it) at crate boundaries so that `?` works across them.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdvisorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("API error: {0}")]
    Api(String),
}

impl From<toml::de::Error> for AdvisorError {
    fn from(err: toml::de::Error) -> Self {
        AdvisorError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AdvisorError {
    fn from(err: toml::ser::Error) -> Self {
        AdvisorError::Config(err.to_string())
    }
}

/// A specialized `Result` type for advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;
