//! Core library for prompt-lint.
//!
//! This crate scores LLM prompts before they are sent. Four analyzers look
//! at ambiguity, token waste, the structural signals that predict a good
//! response, and security risks; [`PromptAnalyzer`] folds their scores into a
//! weighted overall grade and can compare two versions of a prompt.
//!
//! # Modules
//!
//! - [`analysis`] - The analyzers, the orchestrator, and report types
//! - [`config`] - Configuration loading and management
//! - [`error`] - Error types and result aliases
//! - [`tokens`] - BPE token counting
//!
//! # Quick Start
//!
//! ```no_run
//! use prompt_lint_core::{AnalyzerConfig, PromptAnalyzer};
//!
//! let analyzer = PromptAnalyzer::new(AnalyzerConfig::default())
//!     .expect("default configuration is valid");
//! let report = analyzer
//!     .analyze("Summarize the attached notes as five bullet points.")
//!     .expect("prompt is within the size limit");
//!
//! println!("{} ({})", report.overall_quality_score, report.overall_grade);
//! for issue in report.critical_issues() {
//!     println!("{}: {}", issue.title, issue.description);
//! }
//! ```
#![deny(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod markdown;
pub mod text;
pub mod tokens;
pub mod word_lists;

pub use analysis::reports::{Category, Issue, Location};
pub use analysis::{
    AnalyzerKind, ComparisonReport, Grade, PromptAnalyzer, PromptReport, Severity, analyze,
    compare,
};
pub use config::{AnalyzerConfig, Config, ConfigLoader, LogLevel, ScoreWeights};
pub use error::{AnalysisError, AnalysisResult, ConfigError, ConfigResult};
pub use tokens::{Encoding, TokenReport, count_tokens, tokenize};
