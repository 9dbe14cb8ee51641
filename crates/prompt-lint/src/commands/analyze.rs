//! Analyze command: score one prompt.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use prompt_lint_core::{AnalyzerConfig, Issue, PromptAnalyzer, PromptReport};

use super::{AnalyzerFlags, paint_score, paint_severity, read_input};

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Prompt file to analyze (`-` reads stdin).
    pub file: Utf8PathBuf,

    #[command(flatten)]
    pub flags: AnalyzerFlags,

    /// Fail when the overall score is below this value (0-100).
    #[arg(long, value_name = "SCORE")]
    pub fail_under: Option<f64>,
}

/// Analyze a prompt and print the report.
#[instrument(name = "cmd_analyze", skip_all, fields(file = %args.file))]
pub fn cmd_analyze(
    args: AnalyzeArgs,
    global_json: bool,
    config: &AnalyzerConfig,
) -> anyhow::Result<()> {
    debug!(file = %args.file, flags = ?args.flags, "executing analyze command");

    let config = args.flags.apply(config);
    let analyzer = PromptAnalyzer::new(config).context("invalid analyzer configuration")?;
    let content = read_input(&args.file, analyzer.config().max_input_chars)?;
    let report = analyzer
        .analyze(&content)
        .with_context(|| format!("failed to analyze {}", args.file))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(args.file.as_str(), &report);
    }

    if let Some(min) = args.fail_under
        && report.overall_quality_score < min
    {
        bail!(
            "{} scored {:.1} (minimum: {min:.1})",
            args.file,
            report.overall_quality_score
        );
    }

    Ok(())
}

fn print_report(name: &str, report: &PromptReport) {
    println!("{}", name.bold());
    println!(
        "\n  {} {}/100 (grade {})",
        "Overall:".cyan(),
        paint_score(report.overall_quality_score),
        report.overall_grade.bold(),
    );

    let tokens = &report.tokens;
    println!(
        "\n  {} {}  {} {}  {} {}  {} {}",
        "Clarity".dimmed(),
        paint_score(report.ambiguity.clarity_score),
        "Efficiency".dimmed(),
        paint_score(tokens.token_efficiency),
        "Success".dimmed(),
        paint_score(report.success.success_probability),
        "Security".dimmed(),
        paint_score(report.security.security_score),
    );
    println!(
        "  {} {} ({}), {} unnecessary, est. ${:.6}",
        "Tokens:".dimmed(),
        tokens.total_tokens,
        tokens.encoding,
        tokens.unnecessary_tokens,
        tokens.estimated_cost,
    );
    println!(
        "  {} {:.1}%",
        "Confidence:".dimmed(),
        report.success.confidence_score
    );

    if report.issues.is_empty() {
        println!("\n  {}", "No issues found.".green());
    } else {
        println!("\n  {} ({})", "Issues".bold(), report.issues.len());
        for issue in &report.issues {
            print_issue(issue);
        }
    }

    print_list("Strengths", &report.success.strengths);
    print_list("Recommendations", &report.success.recommended_improvements);
}

fn print_issue(issue: &Issue) {
    let at = issue
        .location
        .map(|loc| format!(" {}:{}", loc.line, loc.column))
        .unwrap_or_default();
    println!(
        "    [{}] {}{} {}",
        paint_severity(issue.severity),
        issue.category.dimmed(),
        at.dimmed(),
        issue.title,
    );
    println!("      {}", issue.description);
    if let Some(ref suggestion) = issue.suggestion {
        println!("      {} {}", "->".cyan(), suggestion);
    }
}

fn print_list(label: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("\n  {}", label.bold());
    for item in items {
        println!("    - {item}");
    }
}
