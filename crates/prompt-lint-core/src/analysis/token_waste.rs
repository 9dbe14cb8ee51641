//! Token-waste analysis.
//!
//! Counts tokens with the reference encoding and estimates how many are
//! spent on filler phrasing and repeated sentences.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use aho_corasick::{AhoCorasick, MatchKind};

use crate::config::AnalyzerConfig;
use crate::error::AnalysisResult;
use crate::text::{self, LineIndex, Sentence};
use crate::tokens::{self, Encoding};
use crate::word_lists::FILLER_PHRASES;

use super::reports::{Category, Issue, Location, Severity, TokenMetrics};

/// Word-set overlap at which a sentence counts as a repeat.
pub const REPEAT_SIMILARITY: f64 = 0.8;
/// Repeat threshold in strict mode.
pub const STRICT_REPEAT_SIMILARITY: f64 = 0.6;
/// Filler matches per token above which filler issues are Medium.
pub const FILLER_DENSITY: f64 = 0.05;
/// Filler density threshold in strict mode.
pub const STRICT_FILLER_DENSITY: f64 = 0.02;
/// Sentences longer than this many tokens are flagged.
pub const LONG_SENTENCE_TOKENS: usize = 50;
/// Long-sentence threshold in strict mode.
pub const STRICT_LONG_SENTENCE_TOKENS: usize = 35;

/// Sentences shorter than this are never compared for repetition.
const MIN_REPEAT_WORDS: usize = 3;

static FILLER_MATCHER: LazyLock<AhoCorasick> = LazyLock::new(|| {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .match_kind(MatchKind::LeftmostLongest)
        .build(FILLER_PHRASES.iter().map(|(phrase, _)| phrase))
        .expect("valid filler patterns")
});

/// Tokens a phrase costs in running text, counting the space before it.
fn span_tokens(text: &str, start: usize, end: usize, encoding: Encoding) -> usize {
    let start = if text[..start].ends_with(' ') {
        start - 1
    } else {
        start
    };
    tokens::token_len(&text[start..end], encoding)
}

/// Jaccard similarity of two sorted, deduplicated id lists.
fn jaccard(a: &[usize], b: &[usize]) -> f64 {
    let (mut i, mut j, mut shared) = (0, 0, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                shared += 1;
                i += 1;
                j += 1;
            }
        }
    }
    let union = a.len() + b.len() - shared;
    if union == 0 {
        return 0.0;
    }
    shared as f64 / union as f64
}

/// How many of a set's rarest words must be indexed so that any set at
/// `threshold` similarity shares at least one of them.
fn prefix_len(size: usize, threshold: f64) -> usize {
    let overlap = (threshold * size as f64 - 1e-9).ceil().max(1.0) as usize;
    (size + 1).saturating_sub(overlap).clamp(1, size)
}

/// Sentences that repeat an earlier sentence.
///
/// Identical word sets are caught by hashing. Near-duplicates are found
/// with a prefix filter: words are ordered rarest first, and only the first
/// [`prefix_len`] of each set are indexed, so candidates are the earlier
/// sentences sharing a rare word rather than every earlier sentence.
fn find_repeats<'a>(sentences: &[Sentence<'a>], threshold: f64) -> Vec<Sentence<'a>> {
    let mut vocabulary: HashMap<String, usize> = HashMap::new();
    let sets: Vec<Vec<usize>> = sentences
        .iter()
        .map(|sentence| {
            let mut set: Vec<usize> = text::extract_words(sentence.text)
                .into_iter()
                .map(|word| {
                    let next = vocabulary.len();
                    *vocabulary.entry(word).or_insert(next)
                })
                .collect();
            set.sort_unstable();
            set.dedup();
            set
        })
        .collect();

    let mut frequency = vec![0usize; vocabulary.len()];
    for &word in sets.iter().flatten() {
        frequency[word] += 1;
    }

    let mut exact: HashSet<&[usize]> = HashSet::new();
    let mut index: HashMap<usize, Vec<usize>> = HashMap::new();
    let mut checked: HashSet<usize> = HashSet::new();
    let mut repeats = Vec::new();

    for (i, set) in sets.iter().enumerate() {
        if set.len() < MIN_REPEAT_WORDS {
            continue;
        }
        let mut rarest = set.clone();
        rarest.sort_unstable_by_key(|&word| (frequency[word], word));
        let prefix = &rarest[..prefix_len(set.len(), threshold)];

        let repeated = !exact.insert(set.as_slice()) || {
            checked.clear();
            prefix
                .iter()
                .filter_map(|word| index.get(word))
                .flatten()
                .filter(|&&j| checked.insert(j))
                .any(|&j| jaccard(&sets[j], set) >= threshold)
        };
        if repeated {
            repeats.push(sentences[i]);
        }
        for &word in prefix {
            index.entry(word).or_default().push(i);
        }
    }

    repeats
}

/// Whether `pos` falls inside one of `spans`, which are sorted and disjoint.
fn covered(spans: &[Sentence<'_>], pos: usize) -> bool {
    let i = spans.partition_point(|s| s.end() <= pos);
    spans.get(i).is_some_and(|s| s.start <= pos)
}

/// Analyze a prompt for wasted tokens.
///
/// Fails only if the tokenizer cannot round-trip the text.
#[tracing::instrument(skip_all, fields(text_len = text.len(), strict = config.strict_mode))]
pub fn analyze(text: &str, config: &AnalyzerConfig) -> AnalysisResult<(Vec<Issue>, TokenMetrics)> {
    let encoding = config.encoding;
    let total_tokens = tokens::tokenize(text, encoding)?.count;
    let estimated_cost = total_tokens as f64 / 1000.0 * config.token_price_per_1k;

    if text.trim().is_empty() {
        let metrics = TokenMetrics {
            total_tokens,
            estimated_cost,
            encoding,
            ..TokenMetrics::default()
        };
        return Ok((Vec::new(), metrics));
    }

    let (repeat_threshold, density_threshold, long_threshold) = if config.strict_mode {
        (
            STRICT_REPEAT_SIMILARITY,
            STRICT_FILLER_DENSITY,
            STRICT_LONG_SENTENCE_TOKENS,
        )
    } else {
        (REPEAT_SIMILARITY, FILLER_DENSITY, LONG_SENTENCE_TOKENS)
    };

    let sentences = text::split_sentences(text);
    let repeats = find_repeats(&sentences, repeat_threshold);
    let in_repeat = |pos: usize| covered(&repeats, pos);
    let lines = LineIndex::new(text);

    let mut unnecessary = 0usize;

    // Filler phrases outside repeated sentences.
    let fillers: Vec<_> = FILLER_MATCHER
        .find_iter(text)
        .filter(|m| text::is_word_bounded(text, m.start(), m.end()))
        .filter(|m| !in_repeat(m.start()))
        .collect();
    let density = if total_tokens == 0 {
        0.0
    } else {
        fillers.len() as f64 / total_tokens as f64
    };
    let filler_severity = if density > density_threshold {
        Severity::Medium
    } else {
        Severity::Low
    };

    let mut issues = Vec::new();
    let mut redundant_phrases: Vec<String> = Vec::new();
    for m in &fillers {
        let (phrase, replacement) = FILLER_PHRASES[m.pattern().as_usize()];
        let cost = span_tokens(text, m.start(), m.end(), encoding);
        unnecessary += cost;
        if !redundant_phrases.iter().any(|p| p == phrase) {
            redundant_phrases.push(phrase.to_string());
        }
        let suggestion = replacement.map_or_else(
            || "Remove it.".to_string(),
            |r| format!("Replace with \"{r}\"."),
        );
        issues.push(
            Issue::new(
                Category::TokenWaste,
                filler_severity,
                format!("Filler phrase: \"{phrase}\""),
                format!(
                    "\"{}\" adds {cost} token(s) without changing the meaning.",
                    &text[m.start()..m.end()]
                ),
            )
            .with_suggestion(suggestion)
            .at(Location::indexed(&lines, m.start(), m.end() - m.start())),
        );
    }

    for sentence in &repeats {
        let cost = tokens::token_len(sentence.text, encoding);
        unnecessary += cost;
        issues.push(
            Issue::new(
                Category::TokenWaste,
                Severity::Medium,
                "Repeated instruction",
                format!(
                    "\"{}\" repeats an earlier sentence ({cost} tokens).",
                    text::excerpt(sentence.text, 80)
                ),
            )
            .with_suggestion("State each instruction once.")
            .at(Location::indexed(&lines, sentence.start, sentence.text.len())),
        );
    }

    for sentence in sentences.iter().filter(|s| !in_repeat(s.start)) {
        let len = tokens::token_len(sentence.text, encoding);
        if len > long_threshold {
            issues.push(
                Issue::new(
                    Category::TokenWaste,
                    Severity::Low,
                    "Long sentence",
                    format!(
                        "Sentence has {len} tokens: \"{}\"",
                        text::excerpt(sentence.text, 80)
                    ),
                )
                .with_suggestion("Split it into shorter, single-purpose instructions.")
                .at(Location::indexed(&lines, sentence.start, sentence.text.len())),
            );
        }
    }

    let unnecessary_tokens = unnecessary.min(total_tokens);
    let token_efficiency = if total_tokens == 0 {
        100.0
    } else {
        100.0 * (total_tokens - unnecessary_tokens) as f64 / total_tokens as f64
    };

    tracing::debug!(
        total_tokens,
        unnecessary_tokens,
        fillers = fillers.len(),
        repeats = repeats.len(),
        "token waste analysis complete"
    );

    let metrics = TokenMetrics {
        total_tokens,
        unnecessary_tokens,
        token_efficiency,
        estimated_cost,
        redundant_phrases,
        repeated_sentences: repeats.len(),
        encoding,
    };
    Ok((issues, metrics))
}
