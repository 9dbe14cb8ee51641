//! Schema command: print the JSON schema of a report type.

use clap::Args;
use tracing::{debug, instrument};

use prompt_lint_core::{AnalyzerConfig, ComparisonReport, PromptReport};

/// Which document to describe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaKind {
    /// Output of `analyze --json`.
    #[default]
    Report,
    /// Output of `compare --json`.
    Comparison,
    /// The `analyzer` section of the config file.
    Config,
}

/// Arguments for the `schema` subcommand.
#[derive(Args, Debug, Default)]
pub struct SchemaArgs {
    /// Document to describe.
    #[arg(value_enum, default_value_t)]
    pub kind: SchemaKind,
}

/// Print a JSON schema. Output is always JSON.
#[instrument(name = "cmd_schema", skip_all, fields(kind = ?args.kind))]
pub fn cmd_schema(args: SchemaArgs) -> anyhow::Result<()> {
    debug!(kind = ?args.kind, "executing schema command");

    let schema = match args.kind {
        SchemaKind::Report => schemars::schema_for!(PromptReport),
        SchemaKind::Comparison => schemars::schema_for!(ComparisonReport),
        SchemaKind::Config => schemars::schema_for!(AnalyzerConfig),
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_schema_prints() {
        for kind in [SchemaKind::Report, SchemaKind::Comparison, SchemaKind::Config] {
            assert!(cmd_schema(SchemaArgs { kind }).is_ok());
        }
    }
}
