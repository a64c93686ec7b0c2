//! Binary entry point for the varscope CLI.
//!
//! ## Usage
//!
//! ```bash
//! # Scope snippets of a Java file
//! varscope scopes src/Main.java
//!
//! # Variables visible at each node of a statement snippet
//! varscope visible --parse-kind statements --code 'int a = 1; for (String s : xs) { }'
//!
//! # Token stream with byte offsets
//! varscope tokens src/Main.java --positions
//! ```

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;

use varscope::cli::{run, Cli, LogLevel};
use varscope_core::error::OutputErrorCode;
use varscope_core::output::{emit_response, ErrorResponse};

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.global.log_level);

    match run(&cli) {
        Ok(response) => {
            if let Err(e) = emit_response(&response, &mut io::stdout()) {
                let response = ErrorResponse::new(
                    OutputErrorCode::InternalError,
                    format!("failed to write output: {}", e),
                );
                let _ = emit_response(&response, &mut io::stderr());
                return ExitCode::from(OutputErrorCode::InternalError.code());
            }
            let _ = io::stdout().flush();
            ExitCode::SUCCESS
        }
        Err(err) => {
            // Errors go to stdout as JSON, like successful responses
            let response = ErrorResponse::from_error(&err);
            let _ = emit_response(&response, &mut io::stdout());
            let _ = io::stdout().flush();
            ExitCode::from(OutputErrorCode::from(&err).code())
        }
    }
}

fn init_tracing(level: LogLevel) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_tracing_level().to_string()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}
