//! Annotate a template catalog with Traefik and Mafl labels.
//!
//! With no flags, reads `templates.json` one directory above the executable
//! and writes `templates_with_labels.json` next to it. Exits non-zero with the
//! error chain on stderr when the input cannot be read, fails the optional
//! schema check, or (with `--strict`) contains a template that cannot be
//! labeled.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use template_labeler::logging::{Verbosity, init_logging};
use template_labeler::run_support::sibling_output_path;
use template_labeler::{PortPolicy, RunConfig, default_input_path, run};

#[derive(Debug, Parser)]
#[command(name = "label-templates", version, about)]
struct CliArgs {
    /// Input catalog (default: ../templates.json relative to the executable)
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Output catalog (default: templates_with_labels.json beside the input)
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// JSON Schema the input catalog must satisfy
    #[arg(long, value_name = "PATH")]
    schema: Option<PathBuf>,

    /// Abort when a routable template has no tcp port or usable name
    #[arg(long)]
    strict: bool,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Report per-template progress
    #[arg(short, long)]
    verbose: bool,
}

impl CliArgs {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn into_config(self) -> Result<RunConfig> {
        let input = match self.input {
            Some(path) => path,
            None => default_input_path()?,
        };
        let output = self
            .output
            .unwrap_or_else(|| sibling_output_path(&input));
        let policy = if self.strict {
            PortPolicy::Abort
        } else {
            PortPolicy::Skip
        };
        Ok(RunConfig {
            input,
            output,
            schema: self.schema,
            policy,
        })
    }
}

fn main() {
    if let Err(err) = real_main() {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.verbosity());
    let config = args.into_config()?;
    run(&config)?;
    Ok(())
}
