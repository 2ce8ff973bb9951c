//! CLI entrypoint for toolgate.
//!
//! Wires configuration, tracing, the HTTP transport, the spec loader and
//! the gateway together, then runs one subcommand.

mod app;
mod cli;

use std::process::ExitCode;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match app::run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
