//! Token counting with the OpenAI BPE encodings.
//!
//! `cl100k_base` is the reference encoding for every count the analyzers
//! produce. `o200k_base` is available for callers targeting newer models.
//! Counts for other model families are estimates.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, AnalysisResult};

/// Reference BPE encoding used for counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Encoding {
    /// `cl100k_base` (GPT-3.5 / GPT-4 family).
    #[default]
    #[cfg_attr(feature = "clap", value(name = "cl100k"))]
    Cl100k,
    /// `o200k_base` (GPT-4o family).
    #[cfg_attr(feature = "clap", value(name = "o200k"))]
    O200k,
}

impl Encoding {
    /// Returns the encoding name as used by tiktoken.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cl100k => "cl100k_base",
            Self::O200k => "o200k_base",
        }
    }

    fn tokenizer(self) -> &'static bpe_openai::Tokenizer {
        match self {
            Self::Cl100k => bpe_openai::cl100k_base(),
            Self::O200k => bpe_openai::o200k_base(),
        }
    }
}

impl std::fmt::Display for Encoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of counting tokens in a text.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TokenReport {
    /// Number of tokens in the text.
    pub count: usize,
    /// Encoding used for the count.
    pub encoding: Encoding,
    /// Token budget (if provided).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget: Option<usize>,
    /// Whether the count exceeds the budget.
    pub over_budget: bool,
}

/// Token ids for a text, in encoding order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    /// Number of tokens.
    pub count: usize,
    /// The token ids.
    pub ids: Vec<u32>,
}

/// Number of tokens in `text` under `encoding`.
///
/// Infallible: the BPE tables are compiled into the binary.
pub fn token_len(text: &str, encoding: Encoding) -> usize {
    if text.is_empty() {
        return 0;
    }
    encoding.tokenizer().count(text)
}

/// Count tokens in text, checking against an optional budget.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn count_tokens(text: &str, budget: Option<usize>, encoding: Encoding) -> TokenReport {
    let count = token_len(text, encoding);
    let over_budget = budget.is_some_and(|max| count > max);

    TokenReport {
        count,
        encoding,
        budget,
        over_budget,
    }
}

/// Encode `text` into token ids.
///
/// The ids are decoded again and compared with the input; a mismatch is
/// reported as [`AnalysisError::Tokenization`] instead of a silently wrong
/// count.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn tokenize(text: &str, encoding: Encoding) -> AnalysisResult<Tokenized> {
    let tokenizer = encoding.tokenizer();
    let ids = tokenizer.encode(text);
    match tokenizer.decode(&ids) {
        Some(decoded) if decoded == text => Ok(Tokenized {
            count: ids.len(),
            ids,
        }),
        Some(_) => Err(AnalysisError::Tokenization(format!(
            "{encoding} did not round-trip the input"
        ))),
        None => Err(AnalysisError::Tokenization(format!(
            "{encoding} produced ids that do not decode to UTF-8"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_tokens_in_simple_text() {
        let report = count_tokens("Hello, world!", None, Encoding::Cl100k);
        assert!(report.count > 0);
        assert!(!report.over_budget);
        assert!(report.budget.is_none());
    }

    #[test]
    fn detects_over_budget() {
        let report = count_tokens("Hello, world! This is a test.", Some(1), Encoding::Cl100k);
        assert!(report.over_budget);
        assert_eq!(report.budget, Some(1));
    }

    #[test]
    fn within_budget() {
        let report = count_tokens("Hi", Some(100), Encoding::Cl100k);
        assert!(!report.over_budget);
    }

    #[test]
    fn empty_text_returns_zero() {
        let report = count_tokens("", None, Encoding::Cl100k);
        assert_eq!(report.count, 0);
        assert_eq!(token_len("", Encoding::O200k), 0);
    }

    #[test]
    fn tokenize_matches_count() {
        let text = "Summarize the following article in three bullet points.";
        let tokenized = tokenize(text, Encoding::Cl100k).unwrap();
        assert_eq!(tokenized.count, tokenized.ids.len());
        assert_eq!(tokenized.count, token_len(text, Encoding::Cl100k));
    }

    #[test]
    fn tokenize_handles_unicode() {
        let tokenized = tokenize("naïve café — 日本語", Encoding::O200k).unwrap();
        assert!(tokenized.count > 0);
    }

    #[test]
    fn encoding_names() {
        assert_eq!(Encoding::Cl100k.to_string(), "cl100k_base");
        assert_eq!(Encoding::O200k.as_str(), "o200k_base");
        assert_eq!(Encoding::default(), Encoding::Cl100k);
    }
}
