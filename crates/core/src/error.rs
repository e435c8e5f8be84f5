//! Error types for the RustedRAG domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each remote collaborator has its own error type so callers can apply
//! the right recovery policy: retrieval failures are absorbed, completion
//! failures reach the caller, configuration failures are fatal.

use std::path::PathBuf;
use thiserror::Error;

/// The top-level error type for all RustedRAG operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Retrieval error: {0}")]
    Retrieval(#[from] RetrievalError),

    #[error("Completion error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Vector store search failed.
#[derive(Debug, Clone, Error)]
pub enum RetrievalError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Search request failed: {message} (status: {status_code})")]
    Status { status_code: u16, message: String },

    #[error("Invalid JSON response from vector store: {0}")]
    InvalidJson(String),

    #[error("Unexpected response format from vector store: {0}")]
    UnexpectedFormat(String),
}

/// Chat completion failed.
#[derive(Debug, Clone, Error)]
pub enum CompletionError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Invalid JSON response from completion endpoint: {0}")]
    InvalidJson(String),

    #[error("Unexpected response format from completion endpoint: {0}")]
    UnexpectedFormat(String),

    #[error("Stream interrupted: {0}")]
    StreamInterrupted(String),

    #[error("Conversation has no user message to answer")]
    EmptyConversation,
}

/// Invalid or missing configuration. Never recovered.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    #[error("{0} must be set")]
    MissingField(&'static str),

    #[error("Invalid prompt template: {0}")]
    InvalidTemplate(String),

    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
