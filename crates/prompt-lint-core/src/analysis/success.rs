//! Rule-based success prediction.
//!
//! Starts from a neutral baseline and adds or subtracts a fixed weight for
//! each structural signal a well-specified prompt tends to have: a task, an
//! output description, examples, constraints, a format, context, and a sane
//! length. Strict mode also looks for success criteria and a named audience.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnalyzerConfig;
use crate::markdown::{self, MarkdownStructure};
use crate::text;
use crate::word_lists::OPEN_ENDED_TERMS;

use super::reports::{Category, Issue, Severity, SuccessPrediction};

/// Probability before any signal is applied.
pub const BASELINE: f64 = 50.0;
/// Open-ended terms tolerated before the prediction is penalized.
pub const OPEN_ENDED_LIMIT: usize = 3;
/// Penalty for exceeding [`OPEN_ENDED_LIMIT`].
pub const OPEN_ENDED_PENALTY: f64 = 10.0;

/// Bonus for a length within the configured word range.
const LENGTH_BONUS: f64 = 5.0;
const TOO_SHORT_PENALTY: f64 = 10.0;
const TOO_LONG_PENALTY: f64 = 5.0;

/// Signals evaluated in every mode (Length is evaluated separately, after these).
const SIGNALS: &[Signal] = &[
    Signal::Task,
    Signal::OutputSpec,
    Signal::Example,
    Signal::Constraints,
    Signal::Format,
    Signal::Context,
];

/// Signals added in strict mode.
const STRICT_SIGNALS: &[Signal] = &[Signal::SuccessCriteria, Signal::Audience];

/// Number of signals strict mode evaluates, Length included.
const MAX_SIGNALS: f64 = 9.0;

static TASK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:write|create|generate|summari[sz]e|explain|describe|list|analy[sz]e|translate|classify|extract|compare|review|draft|rewrite|edit|convert|calculate|answer|implement|design|build|refactor|debug|fix|identify|evaluate|outline|suggest|recommend|find|provide|produce|categori[sz]e|rank|plan|give|tell|show|check|proofread|solve)\b",
    )
    .expect("valid regex")
});

static OUTPUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:output|outputs|return|returns|respond|response|reply|answer|result|results|deliverable)\b")
        .expect("valid regex")
});

static EXAMPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)->|=>|\bexamples?\b[^\n]*:|\bfor (?:example|instance)\b|\be\.g\.|\bsample (?:input|output)\b|^\s*(?:input|output)\s*:",
    )
    .expect("valid regex")
});

static CONSTRAINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:must|should|required?|exactly|at (?:least|most)|no more than|only|do not|don't|never|avoid|limit(?:ed)?|maximum|minimum|within)\b",
    )
    .expect("valid regex")
});

/// A number followed by a countable unit ("3 bullet points", "200 words").
static NUMERIC_LIMIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b\d+\s*(?:words?|sentences?|paragraphs?|items?|bullets?|points?|characters?|chars|tokens?|lines?|examples?|options?)\b",
    )
    .expect("valid regex")
});

static FORMAT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:json|markdown|table|csv|yaml|xml|html|bullet(?:ed)?\s+(?:points?|list)|numbered\s+list|format(?:ted)?|headings?|schema)\b",
    )
    .expect("valid regex")
});

static CONTEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:context|background|audience|scenario|you are|act as|your role|as an? (?:expert|assistant|engineer|editor|teacher|analyst|writer|developer))\b",
    )
    .expect("valid regex")
});

static SUCCESS_CRITERIA_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:success|criteria|acceptance|the goal is|goal|done when|(?:should|must) include|evaluated? (?:by|on))\b",
    )
    .expect("valid regex")
});

static AUDIENCE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:audience|readers?|users?|for (?:beginners|experts|developers|children|students|executives|customers|engineers))\b",
    )
    .expect("valid regex")
});

static OPEN_ENDED_RE: LazyLock<Regex> = LazyLock::new(|| {
    let alternation = OPEN_ENDED_TERMS.join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid regex")
});

/// A structural property of a well-specified prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Signal {
    Task,
    OutputSpec,
    Example,
    Constraints,
    Format,
    Context,
    SuccessCriteria,
    Audience,
}

impl Signal {
    /// `(weight if present, weight if absent)`.
    const fn weights(self) -> (f64, f64) {
        match self {
            Self::Task => (5.0, -15.0),
            Self::OutputSpec => (10.0, -10.0),
            Self::Example => (12.0, -12.0),
            Self::Constraints => (10.0, -10.0),
            Self::Format => (10.0, -10.0),
            Self::Context => (8.0, -5.0),
            Self::SuccessCriteria => (6.0, -6.0),
            Self::Audience => (4.0, -4.0),
        }
    }

    fn present(self, text: &str, structure: &MarkdownStructure) -> bool {
        match self {
            Self::Task => TASK_RE.is_match(text),
            Self::OutputSpec => OUTPUT_RE.is_match(text),
            Self::Example => structure.has_code_sample() || EXAMPLE_RE.is_match(text),
            Self::Constraints => {
                structure.list_items >= 2
                    || CONSTRAINT_RE.is_match(text)
                    || NUMERIC_LIMIT_RE.is_match(text)
            }
            Self::Format => structure.tables > 0 || FORMAT_RE.is_match(text),
            Self::Context => CONTEXT_RE.is_match(text),
            Self::SuccessCriteria => SUCCESS_CRITERIA_RE.is_match(text),
            Self::Audience => AUDIENCE_RE.is_match(text),
        }
    }

    const fn strength(self) -> &'static str {
        match self {
            Self::Task => "States a clear task",
            Self::OutputSpec => "Describes the expected output",
            Self::Example => "Includes examples",
            Self::Constraints => "Sets explicit constraints",
            Self::Format => "Defines the output format",
            Self::Context => "Provides context or a role",
            Self::SuccessCriteria => "Defines success criteria",
            Self::Audience => "Names the target audience",
        }
    }

    const fn risk(self) -> &'static str {
        match self {
            Self::Task => "No clear task or action verb",
            Self::OutputSpec => "Expected output is not described",
            Self::Example => "No examples to anchor the response",
            Self::Constraints => "No constraints on scope or length",
            Self::Format => "Output format is unspecified",
            Self::Context => "No context or role is given",
            Self::SuccessCriteria => "No success criteria",
            Self::Audience => "Target audience is not named",
        }
    }

    const fn recommendation(self) -> &'static str {
        match self {
            Self::Task => "Start with an action verb that names the task (e.g. \"Summarize\", \"List\")",
            Self::OutputSpec => "Describe what the response should contain",
            Self::Example => "Add an example of the input and the output you expect",
            Self::Constraints => "Add constraints such as length limits or things to avoid",
            Self::Format => "Specify a format such as JSON, a table, or a bulleted list",
            Self::Context => "Give background or assign a role (\"You are a ...\")",
            Self::SuccessCriteria => "State how a good answer will be judged",
            Self::Audience => "Name who the answer is for",
        }
    }

    /// Severity and title of the issue raised when the signal is missing.
    /// Only high-impact gaps become issues.
    const fn gap(self) -> Option<(Severity, &'static str)> {
        match self {
            Self::Task => Some((Severity::High, "Missing task")),
            Self::OutputSpec => Some((Severity::High, "No output specification")),
            Self::Example => Some((Severity::Medium, "No examples")),
            Self::Format => Some((Severity::Medium, "No output format")),
            _ => None,
        }
    }
}

/// Accumulates signal outcomes in evaluation order.
#[derive(Default)]
struct Tally {
    score: f64,
    evaluated: usize,
    strengths: Vec<String>,
    risks: Vec<String>,
    recommendations: Vec<String>,
}

impl Tally {
    fn hit(&mut self, weight: f64, strength: &str) {
        self.evaluated += 1;
        self.score += weight;
        self.strengths.push(strength.to_string());
    }

    fn miss(&mut self, weight: f64, risk: String, recommendation: &str) {
        self.evaluated += 1;
        self.score += weight;
        self.risks.push(risk);
        self.recommend(recommendation);
    }

    fn recommend(&mut self, recommendation: &str) {
        if !self.recommendations.iter().any(|r| r == recommendation) {
            self.recommendations.push(recommendation.to_string());
        }
    }
}

/// Predict how likely a prompt is to get the intended result.
#[tracing::instrument(skip_all, fields(text_len = text.len(), strict = config.strict_mode))]
pub fn analyze(text: &str, config: &AnalyzerConfig) -> (Vec<Issue>, SuccessPrediction) {
    if text.trim().is_empty() {
        let prediction = SuccessPrediction {
            confidence_score: 0.0,
            ..SuccessPrediction::default()
        };
        return (Vec::new(), prediction);
    }

    let structure = markdown::scan_structure(text);
    let words = text::word_count(text);
    let mut tally = Tally {
        score: BASELINE,
        ..Tally::default()
    };
    let mut issues = Vec::new();

    let mut evaluate = |signal: Signal, tally: &mut Tally| {
        let (present_weight, absent_weight) = signal.weights();
        if signal.present(text, &structure) {
            tally.hit(present_weight, signal.strength());
        } else {
            tally.miss(absent_weight, signal.risk().to_string(), signal.recommendation());
            if let Some((severity, title)) = signal.gap() {
                issues.push(
                    Issue::new(Category::SuccessPrediction, severity, title, signal.risk())
                        .with_suggestion(signal.recommendation()),
                );
            }
        }
    };

    for &signal in SIGNALS {
        evaluate(signal, &mut tally);
    }

    if words < config.min_words {
        tally.miss(
            -TOO_SHORT_PENALTY,
            format!("Prompt is too short to be specific ({words} words)"),
            "Add detail: what to include, who it is for, and how long the answer should be",
        );
    } else if words > config.max_words {
        tally.miss(
            -TOO_LONG_PENALTY,
            format!("Prompt is long ({words} words) and may dilute focus"),
            "Trim the prompt to the instructions that matter",
        );
    } else {
        tally.hit(LENGTH_BONUS, "Length is within the recommended range");
    }

    if config.strict_mode {
        for &signal in STRICT_SIGNALS {
            evaluate(signal, &mut tally);
        }
    }

    let open_ended = OPEN_ENDED_RE.find_iter(text).count();
    if open_ended > OPEN_ENDED_LIMIT {
        tally.score -= OPEN_ENDED_PENALTY;
        tally.risks.push(format!(
            "Open-ended wording ({open_ended} terms like \"any\" or \"whatever\") invites unpredictable answers"
        ));
        tally.recommend("Replace open-ended choices with concrete options");
    }

    let raw = tally.score;
    let success_probability = raw.clamp(0.0, 100.0);
    let overflow = (raw - success_probability).abs();
    let confidence_score = (30.0
        + 40.0 * tally.evaluated as f64 / MAX_SIGNALS
        + 30.0 * words.min(50) as f64 / 50.0
        - (overflow / 2.0).min(20.0))
    .clamp(0.0, 100.0);

    tracing::debug!(
        success_probability,
        confidence_score,
        evaluated = tally.evaluated,
        "success prediction complete"
    );

    let prediction = SuccessPrediction {
        success_probability,
        confidence_score,
        strengths: tally.strengths,
        risk_factors: tally.risks,
        recommended_improvements: tally.recommendations,
    };
    (issues, prediction)
}
