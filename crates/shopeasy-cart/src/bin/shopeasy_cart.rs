//! `shopeasy-cart`: inspect and edit a file-backed ShopEasy cart.
//!
//! Usage:
//!   shopeasy-cart [--store DIR] [--config FILE] <command> [args...]
//!
//! Log verbosity comes from `SHOPEASY_LOG` (default `warn`).

use std::io::{self, Write};

use shopeasy_cart::cli::{parse_args, run, CliError, USAGE};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("SHOPEASY_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = parse_args(&args).and_then(|invocation| run(&invocation));
    match result {
        Ok(output) => {
            let mut stdout = io::stdout();
            if writeln!(stdout, "{output}").is_err() {
                std::process::exit(1);
            }
        }
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}\n{USAGE}");
            std::process::exit(2);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
