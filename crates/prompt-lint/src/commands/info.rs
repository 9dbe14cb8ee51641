//! Info command implementation

use std::collections::BTreeMap;

use clap::Args;
use owo_colors::OwoColorize;
use prompt_lint_core::AnalyzerKind;
use prompt_lint_core::analysis::token_waste;
use prompt_lint_core::config::{AnalyzerConfig, Config, ConfigSources};
use serde::Serialize;
use tracing::{debug, instrument};

use super::AnalyzerFlags;

/// Arguments for the `info` subcommand.
///
/// The analyzer flags are the ones `analyze` takes; `info` shows the
/// settings they would produce without reading a prompt.
#[derive(Args, Debug, Default)]
pub struct InfoArgs {
    #[command(flatten)]
    pub flags: AnalyzerFlags,
}

#[derive(Serialize)]
struct PackageInfo {
    name: &'static str,
    version: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    description: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    repository: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    homepage: &'static str,
    #[serde(skip_serializing_if = "str::is_empty")]
    license: &'static str,
}

impl PackageInfo {
    const fn new() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            description: env!("CARGO_PKG_DESCRIPTION"),
            repository: env!("CARGO_PKG_REPOSITORY"),
            homepage: env!("CARGO_PKG_HOMEPAGE"),
            license: env!("CARGO_PKG_LICENSE"),
        }
    }
}

#[derive(Serialize)]
struct ConfigInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<String>,
    log_level: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    log_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_budget: Option<usize>,
    analyzer: AnalyzerConfig,
}

impl ConfigInfo {
    fn from_config(config: &Config, sources: &ConfigSources, flags: &AnalyzerFlags) -> Self {
        Self {
            config_file: sources.primary_file().map(|p| p.to_string()),
            log_level: config.log_level.as_str().to_string(),
            log_dir: config.log_dir.as_ref().map(|p| p.to_string()),
            token_budget: config.token_budget,
            analyzer: flags.apply(&config.analyzer),
        }
    }
}

/// How one analyzer takes part in a run with the effective settings.
#[derive(Debug, Serialize)]
struct AnalyzerStatus {
    name: AnalyzerKind,
    enabled: bool,
    score_field: &'static str,
    /// Share of the overall score, after normalizing the weights.
    weight: f64,
    /// What the report carries in place of a skipped analyzer.
    #[serde(skip_serializing_if = "Option::is_none")]
    when_skipped: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    thresholds: BTreeMap<&'static str, f64>,
}

impl AnalyzerStatus {
    fn all(config: &AnalyzerConfig) -> Vec<Self> {
        let total = config.weights.total();
        AnalyzerKind::ALL
            .into_iter()
            .map(|kind| {
                let enabled = kind.is_enabled(config);
                Self {
                    name: kind,
                    enabled,
                    score_field: kind.score_field(),
                    weight: if total > 0.0 {
                        kind.weight(&config.weights) / total
                    } else {
                        0.0
                    },
                    when_skipped: (!enabled).then(|| skipped_policy(kind)),
                    thresholds: thresholds(kind, config),
                }
            })
            .collect()
    }
}

/// Neutral metrics a skipped analyzer leaves in the report.
///
/// The score still enters the overall score at its weight.
fn skipped_policy(kind: AnalyzerKind) -> String {
    let extra = match kind {
        AnalyzerKind::TokenWaste => ", token counts 0",
        AnalyzerKind::Security => ", no sensitive data",
        AnalyzerKind::Ambiguity | AnalyzerKind::SuccessPrediction => "",
    };
    format!(
        "{} fixed at 100{extra}, no issues, not listed in analyzers_run",
        kind.score_field()
    )
}

fn thresholds(kind: AnalyzerKind, config: &AnalyzerConfig) -> BTreeMap<&'static str, f64> {
    match kind {
        AnalyzerKind::TokenWaste => {
            let (repeat, density, long) = if config.strict_mode {
                (
                    token_waste::STRICT_REPEAT_SIMILARITY,
                    token_waste::STRICT_FILLER_DENSITY,
                    token_waste::STRICT_LONG_SENTENCE_TOKENS,
                )
            } else {
                (
                    token_waste::REPEAT_SIMILARITY,
                    token_waste::FILLER_DENSITY,
                    token_waste::LONG_SENTENCE_TOKENS,
                )
            };
            BTreeMap::from([
                ("repeat_similarity", repeat),
                ("filler_density", density),
                ("long_sentence_tokens", long as f64),
            ])
        }
        AnalyzerKind::SuccessPrediction => BTreeMap::from([
            ("min_words", config.min_words as f64),
            ("max_words", config.max_words as f64),
        ]),
        AnalyzerKind::Ambiguity | AnalyzerKind::Security => BTreeMap::new(),
    }
}

#[derive(Serialize)]
struct FullInfo {
    #[serde(flatten)]
    package: PackageInfo,
    config: ConfigInfo,
    analyzers: Vec<AnalyzerStatus>,
}

/// Print package information
///
/// # Arguments
/// * `args` - Analyzer flags to preview
/// * `global_json` - Global `--json` flag from CLI
/// * `config` - Loaded configuration
/// * `sources` - Config source metadata from loading
#[instrument(name = "cmd_info", skip_all, fields(json_output))]
pub fn cmd_info(
    args: InfoArgs,
    global_json: bool,
    config: &Config,
    sources: &ConfigSources,
) -> anyhow::Result<()> {
    let info = PackageInfo::new();

    debug!(json_output = global_json, "executing info command");

    let config_info = ConfigInfo::from_config(config, sources, &args.flags);
    let analyzers = AnalyzerStatus::all(&config_info.analyzer);
    let full_info = FullInfo {
        package: info,
        config: config_info,
        analyzers,
    };

    if global_json {
        println!("{}", serde_json::to_string_pretty(&full_info)?);
    } else {
        println!(
            "{} {}",
            full_info.package.name.bold(),
            full_info.package.version.green()
        );
        if !full_info.package.description.is_empty() {
            println!("{}", full_info.package.description);
        }
        if !full_info.package.license.is_empty() {
            println!("{}: {}", "License".dimmed(), full_info.package.license);
        }
        if !full_info.package.repository.is_empty() {
            println!(
                "{}: {}",
                "Repository".dimmed(),
                full_info.package.repository.cyan()
            );
        }
        if !full_info.package.homepage.is_empty() {
            println!(
                "{}: {}",
                "Homepage".dimmed(),
                full_info.package.homepage.cyan()
            );
        }

        // Configuration section
        println!();
        println!("{}", "Configuration".bold().underline());
        if let Some(ref path) = full_info.config.config_file {
            println!("{}: {}", "Config file".dimmed(), path.cyan());
        } else {
            println!("{}: {}", "Config file".dimmed(), "none loaded".yellow());
        }
        println!("{}: {}", "Log level".dimmed(), full_info.config.log_level);
        if let Some(ref dir) = full_info.config.log_dir {
            println!("{}: {}", "Log directory".dimmed(), dir);
        }

        // Analyzer settings
        let analyzer = &full_info.config.analyzer;
        println!();
        println!("{}", "Analyzers".bold().underline());
        for status in &full_info.analyzers {
            print_status(status);
        }
        println!();
        println!("{}: {}", "Strict mode".dimmed(), analyzer.strict_mode);
        println!(
            "{}: {}",
            "Min severity".dimmed(),
            analyzer.min_severity_to_report
        );
        println!("{}: {}", "Encoding".dimmed(), analyzer.encoding);
        println!(
            "{}: ${}",
            "Price per 1K tokens".dimmed(),
            analyzer.token_price_per_1k
        );
        println!("{}: {}", "Max input chars".dimmed(), analyzer.max_input_chars);
        println!("{}: {}", "Parallel".dimmed(), analyzer.parallel);
        print_opt("Token budget", &full_info.config.token_budget);
    }

    Ok(())
}

fn print_status(status: &AnalyzerStatus) {
    let state = if status.enabled {
        format!("{:<8}", "run").green().to_string()
    } else {
        format!("{:<8}", "skipped").yellow().to_string()
    };
    println!(
        "  {:<20}{state}{} x {:.2}",
        status.name.as_str(),
        status.score_field,
        status.weight
    );
    if let Some(policy) = &status.when_skipped {
        println!("  {:<28}{}", "", policy.dimmed());
    } else if !status.thresholds.is_empty() {
        let limits: Vec<String> = status
            .thresholds
            .iter()
            .map(|(name, value)| format!("{name} {value}"))
            .collect();
        println!("  {:<28}{}", "", limits.join(", ").dimmed());
    }
}

/// Print an optional numeric value or "(not set)".
fn print_opt<T: std::fmt::Display>(label: &str, value: &Option<T>) {
    match value {
        Some(v) => println!("{}: {}", label.dimmed(), v),
        None => println!("{}: {}", label.dimmed(), "(not set)".dimmed()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config::default()
    }

    fn test_sources() -> ConfigSources {
        ConfigSources::default()
    }

    #[test]
    fn test_cmd_info_text_succeeds() {
        assert!(cmd_info(InfoArgs::default(), false, &test_config(), &test_sources()).is_ok());
    }

    #[test]
    fn test_cmd_info_json_via_global() {
        assert!(cmd_info(InfoArgs::default(), true, &test_config(), &test_sources()).is_ok());
    }

    #[test]
    fn test_config_info_no_file() {
        let config = Config::default();
        let sources = ConfigSources::default();
        let info = ConfigInfo::from_config(&config, &sources, &AnalyzerFlags::default());
        assert!(info.config_file.is_none());
        assert_eq!(info.log_level, "info");
        assert_eq!(info.analyzer, AnalyzerConfig::default());
    }

    #[test]
    fn test_config_info_serializes_analyzer_section() {
        let info = ConfigInfo::from_config(
            &Config::default(),
            &ConfigSources::default(),
            &AnalyzerFlags::default(),
        );
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["analyzer"]["strict_mode"], false);
        assert_eq!(json["analyzer"]["encoding"], "cl100k");
        assert_eq!(json["analyzer"]["min_severity_to_report"], "low");
    }

    #[test]
    fn skipped_analyzer_shows_neutral_policy() {
        let flags = AnalyzerFlags {
            skip: vec![AnalyzerKind::Security],
            ..AnalyzerFlags::default()
        };
        let info = ConfigInfo::from_config(&Config::default(), &ConfigSources::default(), &flags);
        let statuses = AnalyzerStatus::all(&info.analyzer);

        let security = &statuses[3];
        assert_eq!(security.name, AnalyzerKind::Security);
        assert!(!security.enabled);
        let policy = security.when_skipped.as_deref().unwrap();
        assert!(policy.contains("security_score fixed at 100"));
        assert!(policy.contains("analyzers_run"));
        assert!(
            statuses[..3]
                .iter()
                .all(|s| s.enabled && s.when_skipped.is_none())
        );

        let json = serde_json::to_value(security).unwrap();
        assert_eq!(json["name"], "security");
        assert_eq!(json["score_field"], "security_score");
        assert!(json.get("thresholds").is_none());
    }

    #[test]
    fn weights_are_normalized_shares() {
        let statuses = AnalyzerStatus::all(&AnalyzerConfig::default());
        let total: f64 = statuses.iter().map(|s| s.weight).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((statuses[2].weight - 0.35).abs() < 1e-9);
    }

    #[test]
    fn strict_flag_tightens_shown_thresholds() {
        let relaxed = AnalyzerStatus::all(&AnalyzerConfig::default());
        assert_eq!(relaxed[1].thresholds["repeat_similarity"], 0.8);
        assert_eq!(relaxed[1].thresholds["long_sentence_tokens"], 50.0);

        let flags = AnalyzerFlags {
            strict: true,
            ..AnalyzerFlags::default()
        };
        let strict = AnalyzerStatus::all(&flags.apply(&AnalyzerConfig::default()));
        assert_eq!(strict[1].thresholds["repeat_similarity"], 0.6);
        assert_eq!(strict[1].thresholds["filler_density"], 0.02);
        assert_eq!(strict[1].thresholds["long_sentence_tokens"], 35.0);
        assert!(strict[0].thresholds.is_empty());
    }
}
