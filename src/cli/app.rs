//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use super::generate::{self, GenerateArgs};
use super::output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "mdsuite")]
#[command(author, version, about = "Generate test suites from markdown examples")]
pub struct Cli {
    /// Directory tree holding the example documents
    #[arg(default_value = ".")]
    pub input: PathBuf,

    /// Directory receiving generated artifacts (defaults to the input directory)
    pub output: Option<PathBuf>,

    /// Package path that OUTPUT is importable as
    #[arg(long, env = "MDSUITE_MODULE")]
    pub module: Option<String>,

    /// Package providing the base suite and runner (defaults to <module>/base)
    #[arg(long)]
    pub runtime_import: Option<String>,

    /// Document file name to look for in each directory
    #[arg(long)]
    pub document: Option<String>,

    /// Generate standalone bash scripts instead of compiled suites
    #[arg(long, alias = "bash")]
    pub script: bool,

    /// Only generate suites or tests whose name matches this regex
    #[arg(long = "match", value_name = "PATTERN", requires = "script")]
    pub pattern: Option<String>,

    /// Output format
    #[arg(long, short = 'f', default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("mdsuite starting");
    output.verbose_ctx(
        "generate",
        &format!(
            "input={} script={} match={:?}",
            cli.input.display(),
            cli.script,
            cli.pattern
        ),
    );

    generate::run(
        GenerateArgs {
            input: cli.input,
            output: cli.output,
            module: cli.module,
            runtime_import: cli.runtime_import,
            document: cli.document,
            script: cli.script,
            pattern: cli.pattern,
        },
        &output,
    )?;

    output.verbose("Command completed successfully");
    Ok(())
}
