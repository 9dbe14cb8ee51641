//! Ambiguity analysis.
//!
//! Flags vague terms, acronyms used without an inline definition, and pairs
//! of directives that contradict each other anywhere in the prompt.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::{Match, Regex};

use crate::config::AnalyzerConfig;
use crate::text::LineIndex;
use crate::word_lists::{ACRONYM_WHITELIST, CONTRADICTORY_PAIRS, STRICT_VAGUE_TERMS, VAGUE_TERMS};

use super::reports::{AmbiguityMetrics, Category, Contradiction, Issue, Location, Severity};

/// Clarity points lost per vague-term occurrence.
pub const VAGUE_PENALTY: f64 = 10.0;
/// Clarity points lost per contradictory pair.
pub const CONTRADICTION_PENALTY: f64 = 20.0;
/// Clarity points lost per undefined acronym.
pub const ACRONYM_PENALTY: f64 = 3.0;

static VAGUE_RE: LazyLock<Regex> = LazyLock::new(|| term_regex(VAGUE_TERMS.iter().copied()));

static STRICT_VAGUE_RE: LazyLock<Regex> = LazyLock::new(|| {
    term_regex(VAGUE_TERMS.iter().chain(STRICT_VAGUE_TERMS).copied())
});

/// Two to five capital letters standing alone.
static ACRONYM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{2,5}\b").expect("valid regex"));

/// One `(label, side_a, side_b)` regex pair per contradictory directive pair.
static CONTRADICTION_RES: LazyLock<Vec<(&'static str, Regex, Regex)>> = LazyLock::new(|| {
    CONTRADICTORY_PAIRS
        .iter()
        .map(|(label, a, b)| {
            (
                *label,
                term_regex(a.iter().copied()),
                term_regex(b.iter().copied()),
            )
        })
        .collect()
});

/// Case-insensitive, word-bounded alternation. Longer terms are tried first
/// and spaces inside a term match any run of whitespace.
fn term_regex<'a>(terms: impl Iterator<Item = &'a str>) -> Regex {
    let mut terms: Vec<&str> = terms.collect();
    terms.sort_by_key(|t| std::cmp::Reverse(t.len()));
    let alternation = terms
        .iter()
        .map(|t| regex::escape(t).replace(' ', r"\s+"))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(r"(?i)\b(?:{alternation})\b")).expect("valid regex")
}

fn normalize(term: &str) -> String {
    term.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// First match not glued to a hyphenated compound ("technical" inside
/// "non-technical", "short" inside "short-term").
fn first_standalone<'t>(re: &Regex, text: &'t str) -> Option<Match<'t>> {
    re.find_iter(text).find(|m| {
        !text[..m.start()].ends_with('-') && !text[m.end()..].starts_with('-')
    })
}

/// Whether the acronym at `m` is defined right there, as `ABC (Expansion)`
/// or `Expansion (ABC)`.
fn defined_inline(text: &str, m: &Match<'_>) -> bool {
    let after = &text[m.end()..];
    if after.trim_start_matches([' ', '\t']).starts_with('(') {
        return true;
    }
    text[..m.start()].ends_with('(') && after.starts_with(')')
}

/// Analyze a prompt for ambiguity.
#[tracing::instrument(skip_all, fields(text_len = text.len(), strict = config.strict_mode))]
pub fn analyze(text: &str, config: &AnalyzerConfig) -> (Vec<Issue>, AmbiguityMetrics) {
    if text.trim().is_empty() {
        return (Vec::new(), AmbiguityMetrics::default());
    }

    let lines = LineIndex::new(text);
    let mut issues = Vec::new();

    // Vague terms: one issue per distinct term, at its first occurrence.
    let vague_re = if config.strict_mode {
        &*STRICT_VAGUE_RE
    } else {
        &*VAGUE_RE
    };
    let mut first_seen: Vec<(String, usize, usize)> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for m in vague_re.find_iter(text) {
        let term = normalize(m.as_str());
        let count = counts.entry(term.clone()).or_insert(0);
        if *count == 0 {
            first_seen.push((term, m.start(), m.len()));
        }
        *count += 1;
    }
    let vague_occurrences: usize = counts.values().sum();
    for (term, start, len) in &first_seen {
        let n = counts[term];
        let times = if n == 1 { "once".to_string() } else { format!("{n} times") };
        issues.push(
            Issue::new(
                Category::Ambiguity,
                Severity::Medium,
                format!("Vague term: \"{term}\""),
                format!("\"{term}\" appears {times} and leaves the request open to interpretation."),
            )
            .with_suggestion(format!(
                "Replace \"{term}\" with a specific quantity, example, or criterion."
            ))
            .at(Location::indexed(&lines, *start, *len)),
        );
    }

    // Acronyms: flag the first undefined use of each.
    let mut defined: HashSet<&str> = HashSet::new();
    let mut flagged: HashSet<&str> = HashSet::new();
    let mut undefined_acronyms: Vec<String> = Vec::new();
    for m in ACRONYM_RE.find_iter(text) {
        let acronym = m.as_str();
        if ACRONYM_WHITELIST.contains(acronym) || defined.contains(acronym) {
            continue;
        }
        if defined_inline(text, &m) {
            defined.insert(acronym);
            continue;
        }
        if !flagged.insert(acronym) {
            continue;
        }
        undefined_acronyms.push(acronym.to_string());
        issues.push(
            Issue::new(
                Category::Ambiguity,
                Severity::Low,
                format!("Undefined acronym: {acronym}"),
                format!("{acronym} is used without being spelled out."),
            )
            .with_suggestion(format!(
                "Define it on first use, e.g. \"{acronym} (full name)\"."
            ))
            .at(Location::indexed(&lines, m.start(), m.len())),
        );
    }

    // Contradictions: both sides of a pair anywhere in the prompt.
    let mut contradictions = Vec::new();
    for (label, side_a, side_b) in CONTRADICTION_RES.iter() {
        let (Some(a), Some(b)) = (
            first_standalone(side_a, text),
            first_standalone(side_b, text),
        ) else {
            continue;
        };
        let first = normalize(a.as_str());
        let second = normalize(b.as_str());
        let later = if a.start() > b.start() { a } else { b };
        issues.push(
            Issue::new(
                Category::Ambiguity,
                Severity::High,
                "Contradictory instructions",
                format!("\"{first}\" conflicts with \"{second}\" ({label})."),
            )
            .with_suggestion("Decide which requirement wins and remove the other.")
            .at(Location::indexed(&lines, later.start(), later.len())),
        );
        contradictions.push(Contradiction {
            label: (*label).to_string(),
            first,
            second,
        });
    }

    let penalty = VAGUE_PENALTY * vague_occurrences as f64
        + CONTRADICTION_PENALTY * contradictions.len() as f64
        + ACRONYM_PENALTY * undefined_acronyms.len() as f64;
    let clarity_score = (100.0 - penalty).clamp(0.0, 100.0);

    tracing::debug!(
        vague = vague_occurrences,
        contradictions = contradictions.len(),
        acronyms = undefined_acronyms.len(),
        clarity_score,
        "ambiguity analysis complete"
    );

    let metrics = AmbiguityMetrics {
        clarity_score,
        vague_terms: first_seen.into_iter().map(|(term, _, _)| term).collect(),
        vague_occurrences,
        contradictions,
        undefined_acronyms,
    };
    (issues, metrics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> (Vec<Issue>, AmbiguityMetrics) {
        analyze(text, &AnalyzerConfig::default())
    }

    fn strict() -> AnalyzerConfig {
        AnalyzerConfig {
            strict_mode: true,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn empty_prompt_is_perfectly_clear() {
        let (issues, metrics) = run("   \n");
        assert!(issues.is_empty());
        assert_eq!(metrics.clarity_score, 100.0);
    }

    #[test]
    fn flags_vague_article_request() {
        let (issues, metrics) = run("Write some articles about various things in technology.");
        assert_eq!(metrics.vague_terms, vec!["some", "various", "things"]);
        assert_eq!(metrics.vague_occurrences, 3);
        assert_eq!(metrics.clarity_score, 70.0);
        assert!(issues.len() >= 2);
        assert!(issues.iter().all(|i| i.category == Category::Ambiguity));
        assert!(issues.iter().all(|i| i.severity == Severity::Medium));
    }

    #[test]
    fn one_issue_per_distinct_term() {
        let (issues, metrics) = run("Add some tests. Then add some docs.");
        assert_eq!(issues.len(), 1);
        assert_eq!(metrics.vague_occurrences, 2);
        assert_eq!(metrics.clarity_score, 80.0);
        let loc = issues[0].location.unwrap();
        assert_eq!(loc.offset, 4);
    }

    #[test]
    fn vague_terms_are_word_bounded() {
        let (issues, _) = run("Handle the something-else branch awesomely.");
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn multiword_terms_match_across_whitespace() {
        let (_, metrics) = run("There are a  lot of files.");
        assert_eq!(metrics.vague_terms, vec!["a lot"]);
    }

    #[test]
    fn detects_concise_vs_detailed() {
        let (issues, metrics) = run("Be concise but very detailed in your answer.");
        assert_eq!(metrics.contradictions.len(), 1);
        assert_eq!(metrics.contradictions[0].first, "concise");
        assert_eq!(metrics.contradictions[0].second, "detailed");
        assert!(issues.iter().any(|i| i.severity == Severity::High));
    }

    #[test]
    fn contradictions_span_sentences() {
        let (_, metrics) = run("Use a formal register.\n\nKeep the tone casual and friendly.");
        assert_eq!(metrics.contradictions.len(), 1);
    }

    #[test]
    fn hyphenated_compounds_are_not_contradictions() {
        let (_, metrics) = run("Explain it for a non-technical reader.");
        assert!(metrics.contradictions.is_empty());
    }

    #[test]
    fn as_long_as_is_not_a_length_directive() {
        let (issues, metrics) = run("Keep it short as long as it is accurate.");
        assert!(metrics.contradictions.is_empty());
        assert!(issues.iter().all(|i| i.severity != Severity::High));

        let (_, metrics) = run("Keep it short but extensive.");
        assert_eq!(metrics.contradictions.len(), 1);
        assert_eq!(metrics.contradictions[0].first, "short");
        assert_eq!(metrics.contradictions[0].second, "extensive");
    }

    #[test]
    fn undefined_acronym_flagged_once() {
        let (issues, metrics) = run("Summarize the QBR deck. Keep the QBR tone.");
        assert_eq!(metrics.undefined_acronyms, vec!["QBR"]);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Low);
        assert_eq!(metrics.clarity_score, 97.0);
    }

    #[test]
    fn inline_definitions_count() {
        let (_, metrics) = run("Use the SLA (service level agreement) terms. The SLA is strict.");
        assert!(metrics.undefined_acronyms.is_empty());

        let (_, metrics) = run("Read the service level agreement (SLA) first.");
        assert!(metrics.undefined_acronyms.is_empty());
    }

    #[test]
    fn whitelisted_acronyms_ignored() {
        let (_, metrics) = run("Return JSON only. Do NOT call the API.");
        assert!(metrics.undefined_acronyms.is_empty());
    }

    #[test]
    fn strict_mode_is_broader() {
        let text = "This might be a good start for several readers.";
        let (normal_issues, normal) = run(text);
        let (strict_issues, strict_metrics) = analyze(text, &strict());
        assert!(strict_issues.len() > normal_issues.len());
        assert!(strict_metrics.clarity_score < normal.clarity_score);
    }

    #[test]
    fn clarity_never_negative() {
        let text = "some some some some some some some some some some some some";
        let (_, metrics) = run(text);
        assert_eq!(metrics.clarity_score, 0.0);
    }
}
