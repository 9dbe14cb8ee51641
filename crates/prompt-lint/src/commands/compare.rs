//! Compare command: which of two prompts is better.

use anyhow::{Context, bail};
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use prompt_lint_core::analysis::reports::Winner;
use prompt_lint_core::{AnalyzerConfig, ComparisonReport, PromptAnalyzer};

use super::{AnalyzerFlags, STDIN, paint_score, read_input};

/// Arguments for the `compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// The original prompt (`-` reads stdin).
    pub first: Utf8PathBuf,

    /// The revised prompt.
    pub second: Utf8PathBuf,

    #[command(flatten)]
    pub flags: AnalyzerFlags,
}

/// Compare two prompts and print the result.
#[instrument(name = "cmd_compare", skip_all, fields(first = %args.first, second = %args.second))]
pub fn cmd_compare(
    args: CompareArgs,
    global_json: bool,
    config: &AnalyzerConfig,
) -> anyhow::Result<()> {
    debug!(flags = ?args.flags, "executing compare command");

    if args.first.as_str() == STDIN && args.second.as_str() == STDIN {
        bail!("only one prompt can be read from stdin");
    }

    let config = args.flags.apply(config);
    let analyzer = PromptAnalyzer::new(config).context("invalid analyzer configuration")?;
    let limit = analyzer.config().max_input_chars;
    let first = read_input(&args.first, limit)?;
    let second = read_input(&args.second, limit)?;
    let report = analyzer
        .compare(&first, &second)
        .with_context(|| format!("failed to compare {} and {}", args.first, args.second))?;

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_comparison(&args, &report);
    }

    Ok(())
}

fn print_comparison(args: &CompareArgs, report: &ComparisonReport) {
    for (label, name, side) in [
        ("First: ", &args.first, &report.first),
        ("Second:", &args.second, &report.second),
    ] {
        println!(
            "{} {} {}/100 (grade {}), {} tokens",
            label.cyan(),
            name.bold(),
            paint_score(side.overall_quality_score),
            side.overall_grade,
            side.tokens.total_tokens,
        );
    }

    let (winner, name) = match report.better {
        Winner::First => ("first", &args.first),
        Winner::Second => ("second", &args.second),
    };
    let delta = format!("{:+.1}", report.quality_delta);
    let delta = if report.quality_delta > 0.0 {
        delta.green().to_string()
    } else if report.quality_delta < 0.0 {
        delta.red().to_string()
    } else {
        delta
    };
    println!(
        "\n{} {winner} ({name}), quality {delta}, tokens {:+}, cost {:+.6}",
        "Better:".bold(),
        report.token_delta,
        report.cost_delta,
    );

    if !report.key_differences.is_empty() {
        println!("\n{}", "Key differences".bold());
        for difference in &report.key_differences {
            println!("  - {difference}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_from_stdin_is_rejected() {
        let args = CompareArgs {
            first: Utf8PathBuf::from("-"),
            second: Utf8PathBuf::from("-"),
            flags: AnalyzerFlags::default(),
        };
        let err = cmd_compare(args, false, &AnalyzerConfig::default()).unwrap_err();
        assert!(err.to_string().contains("stdin"));
    }

    #[test]
    fn compares_two_files() {
        let tmp = tempfile::tempdir().unwrap();
        let first = tmp.path().join("a.txt");
        let second = tmp.path().join("b.txt");
        std::fs::write(&first, "Write a function that sorts numbers.").unwrap();
        std::fs::write(
            &second,
            "Write a function that sorts numbers. Return the result as JSON.",
        )
        .unwrap();
        let args = CompareArgs {
            first: Utf8PathBuf::try_from(first).unwrap(),
            second: Utf8PathBuf::try_from(second).unwrap(),
            flags: AnalyzerFlags::default(),
        };
        assert!(cmd_compare(args, true, &AnalyzerConfig::default()).is_ok());
    }
}
