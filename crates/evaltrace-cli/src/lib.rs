//! Command-line front end for evaltrace.
//!
//! ```text
//! evaltrace trace factorial 3 --context
//! evaltrace trace square_of_pred 5 --format json
//! evaltrace source fact
//! evaltrace digest fact 3
//! ```

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use evaltrace_eval::{CallContext, Scenario, Trace, Tracer, TracerConfig, DEFAULT_GAS_LIMIT};
use std::fmt::Write as _;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "evaltrace", version, about = "Trace substitution evaluation of small OCaml programs")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print every evaluation step of a scenario.
    Trace(TraceArgs),
    /// Print the definition of the function a scenario calls.
    Source(SourceArgs),
    /// Print the SHA-256 fingerprint of a trace.
    Digest(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// `factorial` (`fact`) or `square_of_pred`.
    pub scenario: Scenario,

    /// Integer argument passed to the function.
    #[arg(allow_negative_numbers = true)]
    pub argument: i64,

    /// Maximum number of expression nodes to evaluate.
    #[arg(long, default_value_t = DEFAULT_GAS_LIMIT)]
    pub gas_limit: u64,
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Show the call-context panel after each step (text format only).
    #[arg(long)]
    pub context: bool,
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    pub scenario: Scenario,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Text,
    Json,
}

impl RunArgs {
    fn run(&self) -> anyhow::Result<Trace> {
        debug!(
            scenario = %self.scenario,
            argument = self.argument,
            gas_limit = self.gas_limit,
            "running scenario"
        );
        Tracer::new(TracerConfig::with_gas_limit(self.gas_limit))
            .trace(self.scenario, self.argument)
            .with_context(|| format!("trace {} {}", self.scenario, self.argument))
    }
}

/// Execute a parsed command line and return what should be printed.
pub fn execute(cli: &Cli) -> anyhow::Result<String> {
    match &cli.cmd {
        Command::Trace(args) => {
            let trace = args.run.run()?;
            Ok(match args.format {
                Format::Text => render_text(&trace, args.context)?,
                Format::Json => trace.to_json_pretty()?,
            })
        }
        Command::Source(args) => Ok(args.scenario.function()?.to_string()),
        Command::Digest(args) => Ok(args.run()?.fingerprint()?),
    }
}

/// Human-readable listing of a trace.
pub fn render_text(trace: &Trace, with_context: bool) -> anyhow::Result<String> {
    let mut out = String::new();
    writeln!(out, "{}", trace.scenario.function()?)?;
    writeln!(
        out,
        "\n{} {} ~> {} ({} steps)\n",
        trace.scenario.function_name(),
        trace.argument,
        trace.result,
        trace.len()
    )?;
    for (i, step) in trace.iter().enumerate() {
        writeln!(out, "{i:>4} {step}")?;
        if with_context {
            let panel = CallContext::at(step).to_string();
            for line in panel.lines() {
                writeln!(out, "{:>6}{line}", "")?;
            }
        }
    }
    Ok(out)
}
