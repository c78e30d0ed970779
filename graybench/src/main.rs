use anyhow::{Context, Result};
use clap::Parser;
use graybench::cli::Args;
use graybench::harness::{self, BenchError};
use std::io::{self, Write};
use std::process::ExitCode;

fn run() -> Result<()> {
    let args = Args::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = args.into_config();
    let mut sampler = harness::sampler_for(&config);
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    harness::run(&config, sampler.as_mut(), &mut input, &mut out)?;
    out.flush().context("flushing stdout")?;
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let code = err
                .downcast_ref::<BenchError>()
                .map_or(1, BenchError::exit_code);
            eprintln!("Error: {:#}", err);
            ExitCode::from(code)
        }
    }
}
