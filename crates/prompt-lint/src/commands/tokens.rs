//! Tokens command: count tokens in a prompt.

use anyhow::bail;
use camino::Utf8PathBuf;
use clap::Args;
use owo_colors::OwoColorize;
use tracing::{debug, instrument};

use prompt_lint_core::tokens::{self, Encoding};

use super::read_input;

/// Arguments for the `tokens` subcommand.
#[derive(Args, Debug)]
pub struct TokensArgs {
    /// Prompt file to count (`-` reads stdin).
    pub file: Utf8PathBuf,

    /// Maximum token budget.
    #[arg(long)]
    pub budget: Option<usize>,

    /// Tokenizer encoding.
    #[arg(long, value_enum)]
    pub encoding: Option<Encoding>,
}

/// Count tokens in a prompt and optionally check against a budget.
#[instrument(name = "cmd_tokens", skip_all, fields(file = %args.file))]
pub fn cmd_tokens(
    args: TokensArgs,
    global_json: bool,
    config_budget: Option<usize>,
    config_encoding: Encoding,
    max_chars: usize,
) -> anyhow::Result<()> {
    debug!(file = %args.file, budget = ?args.budget, "executing tokens command");

    let content = read_input(&args.file, max_chars)?;

    let budget = args.budget.or(config_budget);
    let encoding = args.encoding.unwrap_or(config_encoding);
    let report = tokens::count_tokens(&content, budget, encoding);

    if global_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.over_budget {
        let max = report.budget.unwrap_or(0);
        bail!(
            "{} is {} tokens (budget: {}). Compress.",
            args.file,
            report.count.red(),
            max,
        );
    } else if let Some(max) = report.budget {
        println!(
            "{} {} is {} tokens (budget: {max})",
            "PASS:".green(),
            args.file,
            report.count,
        );
    } else {
        println!("{}", report.count);
    }

    Ok(())
}
