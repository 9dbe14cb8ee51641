//! Security scanning.
//!
//! Looks for prompt-injection and jailbreak phrasing, secrets and personal
//! data pasted into the prompt, and markup or template syntax that suggests
//! unsanitized input.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::AnalyzerConfig;
use crate::text::LineIndex;

use super::reports::{Category, Issue, Location, SecurityMetrics, SensitiveMatch, Severity};

/// Score lost per critical finding.
pub const CRITICAL_PENALTY: f64 = 25.0;
/// Score lost per high finding.
pub const HIGH_PENALTY: f64 = 15.0;
/// Score lost per medium finding.
pub const MEDIUM_PENALTY: f64 = 5.0;

/// Minimum body length of a prefixed credential token.
const TOKEN_BODY_MIN: usize = 10;
const STRICT_TOKEN_BODY_MIN: usize = 6;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid regex")
}

static INJECTION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            re(r"(?i)\b(?:ignore|disregard|forget|skip)\s+(?:all\s+)?(?:(?:the|your|any)\s+)?(?:previous|prior|above|earlier|preceding)\s+(?:instructions?|prompts?|rules?|directions?|context)\b"),
            "ignore previous instructions",
        ),
        (
            re(r"(?i)\bdisregard\s+(?:everything\s+|all\s+)?(?:the\s+)?above\b"),
            "disregard the above",
        ),
        (
            re(r"(?i)\bforget\s+(?:everything|all)\s+(?:you\s+(?:know|were\s+told)|above|before)\b"),
            "forget everything",
        ),
        (
            re(r"(?i)\byou\s+are\s+now\s+(?:in\s+)?(?:an?\s+)?\w+\s+mode\b"),
            "mode switch",
        ),
        (
            re(r"(?i)\b(?:developer|sudo|god|admin|unrestricted)\s+mode\b"),
            "privileged mode",
        ),
        (
            re(r"(?i)\bsystem\s*(?::\s*)?override\b"),
            "system override",
        ),
        (
            re(r"(?i)\bnew\s+system\s+(?:prompt|instructions?)\b"),
            "new system prompt",
        ),
        (
            re(r"(?i)\bbegin\s+(?:a\s+)?new\s+(?:prompt|instructions?|session)\b"),
            "begin new prompt",
        ),
        (
            re(r"(?i)\bpretend\s+(?:that\s+)?you\s+(?:have|had)\s+no\s+(?:rules|restrictions|guidelines|limits)\b"),
            "pretend no rules",
        ),
        (
            re(r"(?i:\bdo\s+anything\s+now\b)|(?i:\b(?:you\s+are|act\s+as|enable|activate)\s+(?:now\s+)?)DAN\b|\bDAN\s+(?i:mode|prompt|jailbreak)\b"),
            "do anything now",
        ),
        (re(r"(?i)\bjailbr(?:eak|oken)\b"), "jailbreak"),
    ]
});

static STRICT_INJECTION_PATTERNS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (
            re(r"(?i)\b(?:reveal|show|print|repeat|output)\s+(?:your|the)\s+(?:system\s+prompt|hidden\s+instructions|initial\s+instructions)\b"),
            "reveal system prompt",
        ),
        (
            re(r"(?i)\bact\s+as\s+if\s+(?:you\s+have\s+)?no\s+(?:restrictions|rules|filters)\b"),
            "act without restrictions",
        ),
        (
            re(r"(?i)\boverride\s+(?:your|the|all)\s+(?:rules|instructions|guidelines|safety)\b"),
            "override rules",
        ),
        (
            re(r"(?i)\bwithout\s+(?:any\s+)?(?:restrictions|filters|limitations|censorship)\b"),
            "without restrictions",
        ),
        (
            re(r"(?i)\bbypass\s+(?:the\s+|your\s+|any\s+)?(?:safety|filters?|guardrails|restrictions|content\s+polic(?:y|ies))\b"),
            "bypass safety",
        ),
        (re(r"(?i)\bnew\s+instructions\s*:"), "new instructions"),
    ]
});

/// A kind of sensitive value.
///
/// When the regex has a capture group, only that group is the secret (the
/// key name in `password=...` is not).
struct SensitivePattern {
    kind: &'static str,
    regex: Regex,
    validate: Option<fn(&str) -> bool>,
}

impl SensitivePattern {
    fn new(kind: &'static str, pattern: &str) -> Self {
        Self {
            kind,
            regex: re(pattern),
            validate: None,
        }
    }

    fn validated(mut self, validate: fn(&str) -> bool) -> Self {
        self.validate = Some(validate);
        self
    }
}

fn sensitive_patterns(token_body_min: usize) -> Vec<SensitivePattern> {
    vec![
        SensitivePattern::new(
            "private key",
            r"-----BEGIN (?:[A-Z]+ )?PRIVATE KEY-----",
        ),
        SensitivePattern::new("AWS access key", r"\bAKIA[0-9A-Z]{16}\b"),
        SensitivePattern::new(
            "API token",
            &format!(
                r"\b(?:sk|pk|rk|ghp|gho|ghs|ghu|glpat|xox[abprs])[_-][A-Za-z0-9_-]{{{token_body_min},}}"
            ),
        ),
        SensitivePattern::new(
            "credential",
            r#"(?i)\b(?:api[_\s-]?key|secret(?:[_-]?key)?|token|password|passwd|pwd|access[_-]?token|auth[_-]?token)\b\s*[:=]\s*["']?([^\s"']{4,})"#,
        ),
        SensitivePattern::new("bearer token", r"(?i)\bbearer\s+([A-Za-z0-9._~+/-]{16,}=*)"),
        SensitivePattern::new(
            "JWT",
            r"\beyJ[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}\.[A-Za-z0-9_-]{8,}",
        ),
        SensitivePattern::new(
            "database password",
            r"\b(?:postgres(?:ql)?|mysql|mongodb(?:\+srv)?|redis|amqp)://[^\s:@/]+:([^\s@/]+)@",
        ),
        SensitivePattern::new(
            "email address",
            r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b",
        ),
        SensitivePattern::new("credit card number", r"\b(?:\d{4}[ -]?){3}\d{4}\b")
            .validated(luhn_valid),
        SensitivePattern::new("US Social Security number", r"\b\d{3}-\d{2}-\d{4}\b"),
    ]
}

static SENSITIVE_PATTERNS: LazyLock<Vec<SensitivePattern>> =
    LazyLock::new(|| sensitive_patterns(TOKEN_BODY_MIN));

static STRICT_SENSITIVE_PATTERNS: LazyLock<Vec<SensitivePattern>> =
    LazyLock::new(|| sensitive_patterns(STRICT_TOKEN_BODY_MIN));

static SANITIZATION_MARKERS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    vec![
        (re(r"(?i)<script\b"), "an HTML <script> tag"),
        (re(r"\$\{"), "a ${...} template expression"),
        (re(r"\{\{"), "a {{...}} template placeholder"),
        (re(r"\.\./\.\./"), "a ../../ path traversal"),
        (
            re(r"(?i);\s*(?:drop|delete|truncate)\s+(?:table|database|from)\b"),
            "an SQL statement injection",
        ),
        (re(r"(?i)'\s*or\s*'?1'?\s*=\s*'?1"), "an SQL tautology"),
        (re(r"<!--"), "an HTML comment that can hide instructions"),
    ]
});

/// Luhn checksum over the digits of `candidate`.
fn luhn_valid(candidate: &str) -> bool {
    let digits: Vec<u32> = candidate.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Mask a secret, keeping at most two characters at each end.
pub fn redact(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let n = chars.len();
    let keep = match n {
        10.. => 2,
        6..=9 => 1,
        _ => 0,
    };
    let mut out: String = chars[..keep].iter().collect();
    out.push_str(&"*".repeat(n - 2 * keep));
    out.extend(&chars[n - keep..]);
    out
}

/// A match that survived overlap filtering.
struct Finding<'a> {
    start: usize,
    end: usize,
    label: &'a str,
}

/// Drop matches that overlap an earlier (or, at the same start, longer) one.
fn non_overlapping(mut found: Vec<Finding<'_>>) -> Vec<Finding<'_>> {
    found.sort_by_key(|f| (f.start, std::cmp::Reverse(f.end)));
    let mut kept: Vec<Finding<'_>> = Vec::new();
    for f in found {
        if kept.last().is_some_and(|k| f.start < k.end) {
            continue;
        }
        kept.push(f);
    }
    kept
}

/// Scan a prompt for security risks.
#[tracing::instrument(skip_all, fields(text_len = text.len(), strict = config.strict_mode))]
pub fn analyze(text: &str, config: &AnalyzerConfig) -> (Vec<Issue>, SecurityMetrics) {
    if text.trim().is_empty() {
        return (Vec::new(), SecurityMetrics::default());
    }

    let lines = LineIndex::new(text);
    let mut issues = Vec::new();

    // Injection phrasing.
    let strict_injections: &[(Regex, &str)] = if config.strict_mode {
        STRICT_INJECTION_PATTERNS.as_slice()
    } else {
        &[]
    };
    let injections = non_overlapping(
        INJECTION_PATTERNS
            .iter()
            .chain(strict_injections)
            .flat_map(|(regex, name)| {
                regex.find_iter(text).map(move |m| Finding {
                    start: m.start(),
                    end: m.end(),
                    label: *name,
                })
            })
            .collect(),
    );
    let mut potential_injections = Vec::new();
    for f in &injections {
        let phrase = &text[f.start..f.end];
        potential_injections.push(phrase.to_string());
        issues.push(
            Issue::new(
                Category::Security,
                Severity::Critical,
                "Possible prompt injection",
                format!("\"{phrase}\" matches the \"{}\" pattern.", f.label),
            )
            .with_suggestion(
                "Remove instructions that try to override the system prompt; treat user-supplied text as data.",
            )
            .at(Location::indexed(&lines, f.start, f.end - f.start)),
        );
    }

    // Secrets and personal data.
    let patterns: &[SensitivePattern] = if config.strict_mode {
        STRICT_SENSITIVE_PATTERNS.as_slice()
    } else {
        SENSITIVE_PATTERNS.as_slice()
    };
    let secrets = non_overlapping(
        patterns
            .iter()
            .flat_map(|p| {
                p.regex.captures_iter(text).filter_map(move |caps| {
                    let m = caps.get(1).or_else(|| caps.get(0))?;
                    if p.validate.is_some_and(|valid| !valid(m.as_str())) {
                        return None;
                    }
                    Some(Finding {
                        start: m.start(),
                        end: m.end(),
                        label: p.kind,
                    })
                })
            })
            .collect(),
    );
    let mut sensitive_data = Vec::new();
    for f in &secrets {
        let redacted = redact(&text[f.start..f.end]);
        let location = Location::indexed(&lines, f.start, f.end - f.start);
        issues.push(
            Issue::new(
                Category::Security,
                Severity::High,
                format!("Sensitive data: {}", f.label),
                format!("Found what looks like a {}: {redacted}", f.label),
            )
            .with_suggestion("Remove the value or replace it with a placeholder such as <API_KEY>.")
            .at(location),
        );
        sensitive_data.push(SensitiveMatch {
            kind: f.label.to_string(),
            redacted,
            location,
        });
    }

    // Markup and template markers: one issue per kind.
    let mut sanitization_issues = Vec::new();
    for (regex, label) in SANITIZATION_MARKERS.iter() {
        let Some(m) = regex.find(text) else {
            continue;
        };
        sanitization_issues.push(format!("Contains {label}"));
        issues.push(
            Issue::new(
                Category::Security,
                Severity::Medium,
                "Unsanitized markup",
                format!("Contains {label}."),
            )
            .with_suggestion("Escape or strip markup and template syntax from untrusted input.")
            .at(Location::indexed(&lines, m.start(), m.len())),
        );
    }

    let penalty = CRITICAL_PENALTY * injections.len() as f64
        + HIGH_PENALTY * secrets.len() as f64
        + MEDIUM_PENALTY * sanitization_issues.len() as f64;
    let security_score = (100.0 - penalty).clamp(0.0, 100.0);

    tracing::debug!(
        injections = injections.len(),
        secrets = secrets.len(),
        markers = sanitization_issues.len(),
        security_score,
        "security scan complete"
    );

    let metrics = SecurityMetrics {
        security_score,
        potential_injections,
        sensitive_data,
        sanitization_issues,
    };
    (issues, metrics)
}
