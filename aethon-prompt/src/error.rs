//! Error types for prompt variant management.

use thiserror::Error;

/// Errors from A/B test configuration and lookup.
#[derive(Debug, Error)]
pub enum PromptError {
    /// A test configuration failed validation.
    #[error("Invalid A/B test configuration: {0}")]
    InvalidConfig(String),

    /// The named A/B test does not exist.
    #[error("A/B test '{0}' not found")]
    UnknownTest(String),
}

/// A convenience result type for prompt operations.
pub type Result<T> = std::result::Result<T, PromptError>;
