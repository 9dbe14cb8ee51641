//! Curated word lists for prompt analysis.
//!
//! Vague terms, acronym whitelist, contradictory directive pairs, filler
//! phrases with their replacements, and open-ended terms.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Vague quantifiers and hedges flagged by the ambiguity analyzer.
pub const VAGUE_TERMS: &[&str] = &[
    "some",
    "various",
    "many",
    "several",
    "few",
    "numerous",
    "stuff",
    "things",
    "thing",
    "etc",
    "a lot",
    "lots of",
    "plenty of",
    "maybe",
    "perhaps",
    "appropriate",
    "relevant",
];

/// Additional vague terms flagged only in strict mode.
pub const STRICT_VAGUE_TERMS: &[&str] = &[
    "might",
    "possibly",
    "probably",
    "suitable",
    "good",
    "better",
    "nice",
    "kind of",
    "sort of",
    "somewhat",
    "multiple",
    "certain",
    "often",
    "usually",
    "soon",
    "reasonable",
    "proper",
    "interesting",
];

/// All-caps words that are not treated as undefined acronyms.
///
/// Well-known technical acronyms plus the English words prompts commonly
/// write in capitals for emphasis.
pub static ACRONYM_WHITELIST: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // technical
        "AI", "ML", "LLM", "LLMS", "GPT", "NLP", "RAG", "API", "APIS", "SDK", "CLI", "UI", "UX",
        "JSON", "XML", "HTML", "CSS", "YAML", "TOML", "CSV", "PDF", "SQL", "URL", "URLS", "URI",
        "HTTP", "HTTPS", "REST", "TCP", "UDP", "IP", "DNS", "SSH", "TLS", "SSL", "JWT", "UUID",
        "UTF", "ASCII", "CPU", "GPU", "RAM", "OS", "IO", "ID", "IDS", "AWS", "GCP", "PHP", "JS",
        "TS", "SMS", "PR", "QA", "FAQ", "SEO", "KPI", "ROI", "MVP", "CEO", "CTO", "HR", "IT",
        "TV", "AM", "PM", "ETA", "FYI", "ASAP", "TODO", "USA", "US", "UK", "EU", "UN", "NASA",
        "OK", "DIY", "GDPR", "PII",
        // emphasis
        "DO", "NOT", "DON", "NO", "YES", "ONLY", "MUST", "ALL", "ANY", "NEVER", "AND", "OR",
        "THE", "IS", "ARE", "BE", "IF", "TO", "IN", "ON", "OF", "AT", "BY", "FOR", "IT", "ME",
        "MY", "WE", "YOU", "YOUR", "STOP", "NOTE", "WARN", "NONE", "TRUE", "FALSE", "NULL",
        "END", "NEW", "USE", "WILL", "NEED", "KEEP", "ONE", "TWO", "STEP", "TASK", "ROLE",
        "RULES", "RULE", "INPUT", "DATA", "TEXT", "BEGIN", "SHALL", "THIS", "THAT", "WITH",
        "VERY", "EVERY", "EACH", "JUST", "NOW",
    ]
    .into_iter()
    .collect()
});

/// Opposing directives that cannot both be satisfied.
///
/// Each entry is `(label, one side, other side)`; a prompt containing a term
/// from both sides is contradictory.
pub const CONTRADICTORY_PAIRS: &[(&str, &[&str], &[&str])] = &[
    (
        "brevity vs. detail",
        &["concise", "brief", "succinct"],
        &["detailed", "comprehensive", "thorough", "in-depth", "exhaustive"],
    ),
    ("mandatory vs. optional", &["must"], &["optional", "optionally"]),
    ("formal vs. casual tone", &["formal"], &["casual", "informal"]),
    ("simple vs. complex", &["simple"], &["complex"]),
    (
        "technical vs. lay audience",
        &["technical"],
        &["layman", "non-technical", "nontechnical"],
    ),
    ("creative vs. factual", &["creative"], &["factual"]),
    ("subjective vs. objective", &["subjective"], &["objective"]),
    ("short vs. lengthy", &["short"], &["lengthy", "extensive"]),
];

/// Filler phrases and words that spend tokens without adding meaning.
///
/// Each entry is `(phrase, replacement)`; `None` means the phrase can simply
/// be dropped.
pub const FILLER_PHRASES: &[(&str, Option<&str>)] = &[
    ("please note that", Some("Note:")),
    ("it is important to note that", Some("Important:")),
    ("it should be noted that", Some("Note:")),
    ("it is worth noting that", Some("Note:")),
    ("in order to", Some("to")),
    ("due to the fact that", Some("because")),
    ("at this point in time", Some("now")),
    ("for the purpose of", Some("for")),
    ("in the event that", Some("if")),
    ("with regard to", Some("about")),
    ("with respect to", Some("about")),
    ("is able to", Some("can")),
    ("has the ability to", Some("can")),
    ("make sure that", Some("ensure")),
    ("in spite of the fact that", Some("although")),
    ("i would like you to", None),
    ("i want you to", None),
    ("could you please", None),
    ("can you please", None),
    ("as a matter of fact", None),
    ("needless to say", None),
    ("it goes without saying that", None),
    ("basically", None),
    ("actually", None),
    ("essentially", None),
    ("literally", None),
    ("really", None),
    ("very", None),
    ("quite", None),
    ("rather", None),
    ("somewhat", None),
    ("just", None),
    ("simply", None),
    ("merely", None),
];

/// Terms that leave the expected answer open-ended.
pub const OPEN_ENDED_TERMS: &[&str] = &["any", "anything", "whatever", "maybe", "perhaps"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_vague_terms_do_not_repeat_defaults() {
        for term in STRICT_VAGUE_TERMS {
            assert!(!VAGUE_TERMS.contains(term), "{term} listed twice");
        }
    }

    #[test]
    fn filler_phrases_are_lowercase() {
        for (phrase, _) in FILLER_PHRASES {
            assert_eq!(*phrase, phrase.to_lowercase());
        }
    }

    #[test]
    fn contradiction_sides_are_disjoint() {
        for (label, a, b) in CONTRADICTORY_PAIRS {
            for term in *a {
                assert!(!b.contains(term), "{label}: {term} on both sides");
            }
        }
    }

    #[test]
    fn whitelist_is_uppercase() {
        for word in ACRONYM_WHITELIST.iter() {
            assert_eq!(*word, word.to_uppercase());
        }
    }
}
