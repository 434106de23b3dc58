use clap::Parser;
use evaltrace_cli::{execute, Cli};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_tracing() {
    // Logs go to stderr; stdout carries only the command output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(filter)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let output = execute(&cli)?;
    println!("{}", output.trim_end());
    Ok(())
}
