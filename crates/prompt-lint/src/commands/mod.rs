//! Command implementations.

use std::io::Read;

use anyhow::Context;
use camino::Utf8Path;
use clap::Args;
use owo_colors::OwoColorize;
use prompt_lint_core::{AnalyzerConfig, AnalyzerKind, Encoding, Grade, Severity};

pub mod analyze;
pub mod compare;
pub mod info;
pub mod schema;
pub mod tokens;

/// Path that means "read standard input".
pub const STDIN: &str = "-";

/// Read a prompt from a file, or from stdin when `source` is `-`.
///
/// Files are checked against the size limit before they are read: a
/// character is at most four bytes, so anything over `4 * max_chars` bytes
/// cannot fit. The exact character limit is enforced by the analyzer.
pub fn read_input(source: &Utf8Path, max_chars: usize) -> anyhow::Result<String> {
    if source.as_str() == STDIN {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read prompt from stdin")?;
        return Ok(content);
    }

    let metadata = std::fs::metadata(source.as_std_path())
        .with_context(|| format!("failed to read {source}"))?;
    let max_bytes = max_chars.saturating_mul(4) as u64;
    if metadata.len() > max_bytes {
        anyhow::bail!(
            "input too large: {source} is {} bytes (limit: {max_chars} characters)",
            metadata.len()
        );
    }

    std::fs::read_to_string(source.as_std_path())
        .with_context(|| format!("failed to read {source}"))
}

/// Analyzer options shared by `analyze` and `compare`.
///
/// Each flag overrides the matching `analyzer.*` config value.
#[derive(Args, Debug, Default, Clone)]
pub struct AnalyzerFlags {
    /// Tighten thresholds and broaden pattern tables.
    #[arg(long)]
    pub strict: bool,

    /// Hide issues below this severity.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub min_severity: Option<Severity>,

    /// Price per 1,000 input tokens, for cost estimates.
    #[arg(long, value_name = "USD")]
    pub price: Option<f64>,

    /// Skip an analyzer (repeatable).
    #[arg(long, value_enum, value_name = "ANALYZER")]
    pub skip: Vec<AnalyzerKind>,

    /// Tokenizer encoding.
    #[arg(long, value_enum)]
    pub encoding: Option<Encoding>,

    /// Run the analyzers in parallel.
    #[arg(long)]
    pub parallel: bool,
}

impl AnalyzerFlags {
    /// Layer these flags over the configured analyzer settings.
    pub fn apply(&self, config: &AnalyzerConfig) -> AnalyzerConfig {
        let mut config = config.clone();
        config.strict_mode |= self.strict;
        config.parallel |= self.parallel;
        if let Some(severity) = self.min_severity {
            config.min_severity_to_report = severity;
        }
        if let Some(price) = self.price {
            config.token_price_per_1k = price;
        }
        if let Some(encoding) = self.encoding {
            config.encoding = encoding;
        }
        for kind in &self.skip {
            kind.disable(&mut config);
        }
        config
    }
}

/// Colorize a score the way a grade reads: green, yellow, red.
pub fn paint_score(score: f64) -> String {
    let text = format!("{score:.1}");
    match Grade::from_score(score) {
        Grade::A | Grade::B => text.green().to_string(),
        Grade::C | Grade::D => text.yellow().to_string(),
        Grade::F => text.red().to_string(),
    }
}

/// Colorize a severity label.
pub fn paint_severity(severity: Severity) -> String {
    let label = severity.as_str().to_uppercase();
    match severity {
        Severity::Critical | Severity::High => label.red().bold().to_string(),
        Severity::Medium => label.yellow().to_string(),
        Severity::Low | Severity::Info => label.dimmed().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let flags = AnalyzerFlags {
            strict: true,
            min_severity: Some(Severity::High),
            price: Some(0.01),
            skip: vec![AnalyzerKind::Security],
            encoding: Some(Encoding::O200k),
            parallel: false,
        };
        let config = flags.apply(&AnalyzerConfig::default());
        assert!(config.strict_mode);
        assert_eq!(config.min_severity_to_report, Severity::High);
        assert_eq!(config.token_price_per_1k, 0.01);
        assert!(!config.enable_security);
        assert!(config.enable_ambiguity);
        assert_eq!(config.encoding, Encoding::O200k);
    }

    #[test]
    fn unset_flags_keep_config() {
        let base = AnalyzerConfig {
            strict_mode: true,
            ..AnalyzerConfig::default()
        };
        assert_eq!(AnalyzerFlags::default().apply(&base), base);
    }

    #[test]
    fn read_input_rejects_oversized_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("big.txt");
        std::fs::write(&path, "x".repeat(100)).unwrap();
        let path = camino::Utf8PathBuf::try_from(path).unwrap();
        let err = read_input(&path, 10).unwrap_err();
        assert!(err.to_string().contains("input too large"));
        assert_eq!(read_input(&path, 25).unwrap().len(), 100);
    }

    #[test]
    fn read_input_reports_missing_file() {
        let err = read_input(Utf8Path::new("does/not/exist.txt"), 10).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.txt"));
    }
}
