//! docket - CLI tool for exploring a file-backed document store.
//!
//! A thin wrapper over the `docket` engine and the `docket-file` driver,
//! intended for manual inspection and debugging of collections on disk.

mod cli;
mod commands;
mod output;
mod store;

use std::io;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    commands::handle(cli.command, &cli.store).await
}

/// Filter used when `RUST_LOG` is unset. Verbosity raises docket's own
/// crates; dependencies stay at `warn` until `-vvv`.
fn default_directives(verbosity: u8) -> String {
    let level = match verbosity {
        0 => return "warn".to_string(),
        1 => "info",
        2 => "debug",
        _ => return "trace".to_string(),
    };
    ["docket", "docket_core", "docket_file"]
        .iter()
        .fold("warn".to_string(), |acc, krate| format!("{acc},{krate}={level}"))
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbosity)));

    let json_layer = json.then(|| fmt::layer().json().with_writer(io::stderr));
    let text_layer = (!json).then(|| fmt::layer().with_target(false).with_writer(io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_scopes_to_docket_crates() {
        assert_eq!(default_directives(0), "warn");
        assert_eq!(
            default_directives(2),
            "warn,docket=debug,docket_core=debug,docket_file=debug"
        );
        assert_eq!(default_directives(7), "trace");
        for verbosity in 0..4 {
            assert!(EnvFilter::try_new(default_directives(verbosity)).is_ok());
        }
    }
}
