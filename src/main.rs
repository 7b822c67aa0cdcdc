//! hostprep CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use hostprep::cli::{Cli, CommandDispatcher, ReportFormat};
use hostprep::shell::is_ci;
use hostprep::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is WARN, so step outcomes are not printed twice
///
/// Logs go to stderr; stdout carries the report.
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("hostprep=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hostprep=warn"))
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("hostprep starting with args: {:?}", cli);

    // JSON reports own stdout
    let json = cli
        .run_args()
        .is_some_and(|args| args.format == ReportFormat::Json);
    let output_mode = if json {
        OutputMode::Silent
    } else {
        OutputMode::from_flags(cli.verbose, cli.quiet)
    };

    let is_interactive = !is_ci() && console::Term::stdout().is_term();
    let mut ui = create_ui(is_interactive, output_mode, cli.no_color);

    let dispatcher = CommandDispatcher::new(cli.config.clone(), cli.no_color);

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(u8::try_from(result.exit_code).unwrap_or(u8::MAX)),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
