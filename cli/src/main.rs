//! Hoist - idempotent single-host provisioning over SSH

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use hoist_cli::cli::Cli;
use hoist_cli::output::json;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let json_mode = cli.json;

    match cli.run().await {
        Ok(code) => code,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let message = format!("{e:#}");
            match json::format_error(&message, json::error_code(&e)) {
                Ok(doc) if json_mode => println!("{doc}"),
                _ => eprintln!("Error: {message}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// `HOIST_LOG` wins; otherwise `--verbose` enables debug for this crate.
fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("HOIST_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "warn,hoist_cli=debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
