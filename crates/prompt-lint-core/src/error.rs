//! Error types for prompt-lint-core.

use thiserror::Error;

/// Errors that can occur when working with configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to deserialize configuration.
    #[error("invalid configuration: {0}")]
    Deserialize(#[from] Box<figment::Error>),

    /// Configuration file not found after searching all locations.
    #[error("no configuration file found")]
    NotFound,
}

/// Result type alias using [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur during prompt analysis.
///
/// Every variant is a validation failure: the analysis never starts, and no
/// partial report is produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    /// The prompt is longer than the configured maximum.
    #[error("prompt is {chars} characters, exceeding the limit of {limit}")]
    InputTooLarge {
        /// Length of the rejected prompt, in characters.
        chars: usize,
        /// The configured `max_input_chars`.
        limit: usize,
    },

    /// A configuration value is out of range.
    #[error("invalid analyzer configuration: {0}")]
    InvalidConfig(String),

    /// The tokenizer could not round-trip the input.
    #[error("tokenization failed: {0}")]
    Tokenization(String),
}

/// Result type alias using [`AnalysisError`].
pub type AnalysisResult<T> = Result<T, AnalysisError>;
