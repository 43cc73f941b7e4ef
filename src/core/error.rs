//! Custom error types for tableqa
//!
//! Provides a unified error handling system across all modules.

use thiserror::Error;

/// Main error type for tableqa operations
#[derive(Error, Debug)]
pub enum TableqaError {
    /// Reasoning-model transport or API errors
    #[error("Model error: {0}")]
    Model(String),

    /// Model output could not be parsed as a thought/action reply
    #[error("Response parse error: {0}")]
    ResponseParse(String),

    /// Corpus ingestion errors
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// Prompt template errors
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON parsing errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases
    #[error("{0}")]
    Other(String),
}

/// Convenience Result type for tableqa operations
pub type Result<T> = std::result::Result<T, TableqaError>;

impl TableqaError {
    /// Create a model error
    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    /// Create a response parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ResponseParse(msg.into())
    }

    /// Create an ingestion error
    pub fn ingestion(msg: impl Into<String>) -> Self {
        Self::Ingestion(msg.into())
    }

    /// Create a template error
    pub fn template(msg: impl Into<String>) -> Self {
        Self::Template(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

/// Errors surfaced by the tool registry.
///
/// These never cross the reasoning loop boundary: `dispatch` failures are
/// rendered into observation strings so the model can self-correct on the
/// next round.
#[derive(Error, Debug)]
pub enum ToolError {
    /// Two registered tools share a name
    #[error("duplicate tool name: {0}")]
    DuplicateName(String),

    /// Dispatch requested a name absent from the catalog
    #[error("no tool registered under the name: {0}")]
    UnknownTool(String),

    /// The tool itself failed; carries the original message only
    #[error("{0}")]
    Execution(String),
}
