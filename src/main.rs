//! Binary entry point for the metap CLI.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use metap::cli::{run_to_stdout, Cli, LogLevel};
use metap::output::{emit_response, ErrorResponse};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level);

    match run_to_stdout(&cli) {
        Ok(response) => {
            if cli.json {
                let _ = emit_response(&response, &mut io::stdout());
                let _ = io::stdout().flush();
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.code();
            if cli.json {
                let _ = emit_response(&ErrorResponse::from_error(&err), &mut io::stdout());
                let _ = io::stdout().flush();
            } else {
                eprintln!("{}", err.render());
            }
            ExitCode::from(code.code())
        }
    }
}

/// Initialize tracing subscriber. `RUST_LOG` wins over `--log-level`.
fn init_tracing(level: LogLevel) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
