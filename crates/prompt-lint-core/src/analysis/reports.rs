//! Report structs for prompt analysis.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so the
//! CLI can emit them as JSON and publish their schema.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::text::LineIndex;
use crate::tokens::Encoding;

use super::AnalyzerKind;

// -- Issues -----------------------------------------------------------------

/// How serious an issue is.
///
/// Ordered from least to most severe, so `severity >= Severity::High` reads
/// the way it sounds.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Severity {
    /// Informational only.
    Info,
    /// Minor issue (default reporting floor).
    #[default]
    Low,
    /// Worth fixing.
    Medium,
    /// Likely to degrade results.
    High,
    /// Must be fixed before use.
    Critical,
}

impl Severity {
    /// Returns the severity as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The analyzer family an issue came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Vague terms, undefined acronyms, contradictions.
    Ambiguity,
    /// Filler phrasing and repetition.
    TokenWaste,
    /// Missing structural signals.
    SuccessPrediction,
    /// Injection phrases, secrets, markup injection.
    Security,
}

impl Category {
    /// Returns the category as a snake_case string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ambiguity => "ambiguity",
            Self::TokenWaste => "token_waste",
            Self::SuccessPrediction => "success_prediction",
            Self::Security => "security",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the prompt an issue was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    /// Byte offset of the match.
    pub offset: usize,
    /// Byte length of the match.
    pub len: usize,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, in characters.
    pub column: usize,
}

impl Location {
    /// Locate the byte range `offset..offset + len` within `text`.
    pub fn new(text: &str, offset: usize, len: usize) -> Self {
        Self::indexed(&LineIndex::new(text), offset, len)
    }

    /// Like [`Location::new`], reusing a prebuilt [`LineIndex`].
    pub fn indexed(lines: &LineIndex<'_>, offset: usize, len: usize) -> Self {
        let (line, column) = lines.line_col(offset);
        Self {
            offset,
            len,
            line,
            column,
        }
    }
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Issue {
    /// Analyzer family that produced the issue.
    pub category: Category,
    /// How serious the issue is.
    pub severity: Severity,
    /// Short headline.
    pub title: String,
    /// What was found.
    pub description: String,
    /// How to fix it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Position in the prompt, when the issue is tied to one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Issue {
    /// Create an issue with no suggestion or location.
    pub fn new(
        category: Category,
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category,
            severity,
            title: title.into(),
            description: description.into(),
            suggestion: None,
            location: None,
        }
    }

    /// Attach a suggested fix.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a location.
    #[must_use]
    pub const fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }
}

// -- Ambiguity --------------------------------------------------------------

/// A pair of opposing directives found in one prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Contradiction {
    /// Which pair of directives conflicts (e.g. "brevity vs. detail").
    pub label: String,
    /// The term found on the first side.
    pub first: String,
    /// The term found on the opposing side.
    pub second: String,
}

/// Ambiguity metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AmbiguityMetrics {
    /// Clarity score (0–100, higher is clearer).
    pub clarity_score: f64,
    /// Distinct vague terms, in order of first occurrence.
    pub vague_terms: Vec<String>,
    /// Total vague-term occurrences.
    pub vague_occurrences: usize,
    /// Contradictory directive pairs.
    pub contradictions: Vec<Contradiction>,
    /// Acronyms used without an inline definition.
    pub undefined_acronyms: Vec<String>,
}

impl Default for AmbiguityMetrics {
    fn default() -> Self {
        Self {
            clarity_score: 100.0,
            vague_terms: Vec::new(),
            vague_occurrences: 0,
            contradictions: Vec::new(),
            undefined_acronyms: Vec::new(),
        }
    }
}

// -- Token waste ------------------------------------------------------------

/// Token usage metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TokenMetrics {
    /// Tokens in the prompt.
    pub total_tokens: usize,
    /// Tokens spent on filler and repetition (never above `total_tokens`).
    pub unnecessary_tokens: usize,
    /// Share of tokens doing useful work (0–100).
    pub token_efficiency: f64,
    /// Estimated input cost in the configured currency.
    pub estimated_cost: f64,
    /// Distinct filler phrases found.
    pub redundant_phrases: Vec<String>,
    /// Sentences that repeat an earlier one.
    pub repeated_sentences: usize,
    /// Encoding used for the counts.
    pub encoding: Encoding,
}

impl Default for TokenMetrics {
    fn default() -> Self {
        Self {
            total_tokens: 0,
            unnecessary_tokens: 0,
            token_efficiency: 100.0,
            estimated_cost: 0.0,
            redundant_phrases: Vec::new(),
            repeated_sentences: 0,
            encoding: Encoding::default(),
        }
    }
}

// -- Success prediction -----------------------------------------------------

/// Predicted likelihood that the prompt gets the intended result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuccessPrediction {
    /// Success probability (0–100).
    pub success_probability: f64,
    /// How much evidence backs the prediction (0–100).
    pub confidence_score: f64,
    /// What the prompt does well.
    pub strengths: Vec<String>,
    /// What is likely to go wrong.
    pub risk_factors: Vec<String>,
    /// Concrete improvements, deduplicated.
    pub recommended_improvements: Vec<String>,
}

impl Default for SuccessPrediction {
    fn default() -> Self {
        Self {
            success_probability: 100.0,
            confidence_score: 100.0,
            strengths: Vec::new(),
            risk_factors: Vec::new(),
            recommended_improvements: Vec::new(),
        }
    }
}

// -- Security ---------------------------------------------------------------

/// A sensitive value found in the prompt.
///
/// The value itself is never stored, only a masked form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SensitiveMatch {
    /// What kind of data it looks like (e.g. "API key").
    pub kind: String,
    /// The value with all but its edges masked.
    pub redacted: String,
    /// Where it was found.
    pub location: Location,
}

/// Security metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SecurityMetrics {
    /// Security score (0–100, higher is safer).
    pub security_score: f64,
    /// Injection or jailbreak phrases found.
    pub potential_injections: Vec<String>,
    /// Secrets and personal data found.
    pub sensitive_data: Vec<SensitiveMatch>,
    /// Markup or template-injection markers found.
    pub sanitization_issues: Vec<String>,
}

impl Default for SecurityMetrics {
    fn default() -> Self {
        Self {
            security_score: 100.0,
            potential_injections: Vec::new(),
            sensitive_data: Vec::new(),
            sanitization_issues: Vec::new(),
        }
    }
}

// -- Aggregates -------------------------------------------------------------

/// Letter grade for an overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub enum Grade {
    /// 90 and above.
    A,
    /// 80 to 89.9.
    B,
    /// 70 to 79.9.
    C,
    /// 60 to 69.9.
    D,
    /// Below 60.
    F,
}

impl Grade {
    /// Grade a 0–100 score.
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 90.0 => Self::A,
            s if s >= 80.0 => Self::B,
            s if s >= 70.0 => Self::C,
            s if s >= 60.0 => Self::D,
            _ => Self::F,
        }
    }

    /// Returns the grade letter.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
            Self::F => "F",
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full analysis of one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PromptReport {
    /// The analyzed prompt.
    pub prompt: String,
    /// Analyzers that ran; the others report neutral metrics.
    pub analyzers_run: Vec<AnalyzerKind>,
    /// Ambiguity metrics.
    pub ambiguity: AmbiguityMetrics,
    /// Token metrics.
    pub tokens: TokenMetrics,
    /// Success prediction.
    pub success: SuccessPrediction,
    /// Security metrics.
    pub security: SecurityMetrics,
    /// Issues at or above the reporting floor, grouped by analyzer.
    pub issues: Vec<Issue>,
    /// Weighted overall score (0–100, one decimal).
    pub overall_quality_score: f64,
    /// Letter grade for the overall score.
    pub overall_grade: Grade,
}

impl PromptReport {
    /// Issues with [`Severity::Critical`].
    pub fn critical_issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Critical)
    }

    /// Issues from one analyzer family.
    pub fn issues_by_category(&self, category: Category) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.category == category)
    }
}

/// Which prompt of a comparison scored better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// The first prompt (also chosen on ties).
    First,
    /// The second prompt.
    Second,
}

/// Side-by-side comparison of two prompts.
///
/// Deltas are second minus first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComparisonReport {
    /// Report for the first prompt.
    pub first: PromptReport,
    /// Report for the second prompt.
    pub second: PromptReport,
    /// The better prompt.
    pub better: Winner,
    /// Change in overall score.
    pub quality_delta: f64,
    /// Change in token count.
    pub token_delta: i64,
    /// Change in estimated cost.
    pub cost_delta: f64,
    /// Human-readable summary of what changed.
    pub key_differences: Vec<String>,
}
