//! Text processing utilities.
//!
//! Sentence splitting with byte spans, word extraction, and position helpers
//! shared by the analyzers.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Lowercased abbreviations (without the trailing period) that do not end a
/// sentence.
static ABBREVIATIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "e.g", "i.e", "vs", "cf", "dr", "mr", "mrs", "ms", "prof", "sr", "jr", "st", "no", "fig",
        "approx", "incl", "esp", "min", "max", "ca",
    ]
    .into_iter()
    .collect()
});

/// A sentence within a larger text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sentence<'a> {
    /// The trimmed sentence text, including its terminator.
    pub text: &'a str,
    /// Byte offset of `text` in the source.
    pub start: usize,
}

impl Sentence<'_> {
    /// Byte offset one past the end of the sentence.
    pub const fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Split text into sentences.
///
/// A sentence ends at `.`, `!`, or `?` followed by whitespace or end of
/// input, and at every line break, since prompts lean on lists and one-line
/// directives. Periods after common abbreviations and single-letter initials
/// do not end a sentence; decimals never do because the period is not
/// followed by whitespace. Fragments with no alphanumeric character are
/// dropped.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn split_sentences(text: &str) -> Vec<Sentence<'_>> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        let boundary = match ch {
            '\n' => true,
            '.' | '!' | '?' => match chars.peek() {
                None => true,
                Some(&(_, next)) if next.is_whitespace() => {
                    ch != '.' || !ends_with_abbreviation(&text[start..i])
                }
                Some(_) => false,
            },
            _ => false,
        };

        if boundary {
            let end = i + ch.len_utf8();
            push_trimmed(text, start, end, &mut sentences);
            start = end;
        }
    }

    push_trimmed(text, start, text.len(), &mut sentences);
    sentences
}

fn push_trimmed<'a>(text: &'a str, start: usize, end: usize, out: &mut Vec<Sentence<'a>>) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if !trimmed.chars().any(char::is_alphanumeric) {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    out.push(Sentence {
        text: trimmed,
        start: start + lead,
    });
}

fn ends_with_abbreviation(before: &str) -> bool {
    let last = before
        .rsplit(|c: char| c.is_whitespace() || c == '(')
        .next()
        .unwrap_or_default();
    if last.len() == 1 && last.chars().all(|c| c.is_ascii_uppercase()) {
        return true;
    }
    ABBREVIATIONS.contains(last.to_lowercase().as_str())
}

/// Extract words from text, splitting on whitespace and stripping punctuation.
pub fn extract_words(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'' && c != '-'))
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

/// Number of words in text, using the same rules as [`extract_words`].
pub fn word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .count()
}

/// Bytes per block in the [`LineIndex`] character table.
const CHAR_BLOCK: usize = 256;

/// Line and column lookups for one text.
///
/// Built once per analysis; each lookup is a binary search over line starts
/// plus a character count within one block.
#[derive(Debug, Clone)]
pub struct LineIndex<'a> {
    text: &'a str,
    /// Byte offset of the first byte of each line.
    line_starts: Vec<usize>,
    /// Characters before each `CHAR_BLOCK`-byte block, plus the total.
    chars_before: Vec<usize>,
}

impl<'a> LineIndex<'a> {
    /// Index `text`.
    pub fn new(text: &'a str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(text.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        let mut chars_before = Vec::with_capacity(text.len() / CHAR_BLOCK + 1);
        let mut total = 0;
        for block in text.as_bytes().chunks(CHAR_BLOCK) {
            chars_before.push(total);
            total += char_starts(block);
        }
        chars_before.push(total);
        Self {
            text,
            line_starts,
            chars_before,
        }
    }

    /// 1-based line and column (in characters) of a byte offset.
    ///
    /// Offsets past the end clamp to the end of the text.
    pub fn line_col(&self, offset: usize) -> (usize, usize) {
        let mut offset = offset.min(self.text.len());
        while !self.text.is_char_boundary(offset) {
            offset -= 1;
        }
        let line = self.line_starts.partition_point(|&start| start <= offset);
        let line_start = self.line_starts[line - 1];
        let column = self.char_index(offset) - self.char_index(line_start) + 1;
        (line, column)
    }

    /// Characters before byte `offset`.
    fn char_index(&self, offset: usize) -> usize {
        let block = offset / CHAR_BLOCK;
        self.chars_before[block] + char_starts(&self.text.as_bytes()[block * CHAR_BLOCK..offset])
    }
}

/// Bytes that begin a UTF-8 character.
fn char_starts(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b & 0xC0 != 0x80).count()
}

/// 1-based line and column (in characters) of a byte offset.
///
/// Offsets past the end clamp to the end of the text. Use a [`LineIndex`]
/// when locating many offsets in the same text.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    LineIndex::new(text).line_col(offset)
}

/// First `max_chars` characters of `text` on a single line, with an
/// ellipsis when truncated.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        return flat;
    }
    let mut out: String = flat.chars().take(max_chars).collect();
    out.push('…');
    out
}

/// Whether the byte range `start..end` of `text` sits on word boundaries.
///
/// Used to reject substring hits from the phrase automata ("just" inside
/// "adjust").
pub fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    !before.is_some_and(is_word) && !after.is_some_and(is_word)
}
