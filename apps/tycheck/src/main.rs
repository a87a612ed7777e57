//! Tycheck CLI binary entry point.
//! Resolves configuration, runs the checker and maps the outcome to an exit status.

use clap::Parser;
use std::io;
use tracing::debug;
use tycheck::checker::Checker;
use tycheck::cli::Cli;
use tycheck::config;
use tycheck::error::CheckerError;
use tycheck::outcome::ChannelNotifier;
use tycheck::output::use_colors;
use tycheck::tsc::TscEngine;
use tycheck::tslint::TslintEngine;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.debug);
    if let Err(e) = run(&cli) {
        eprintln!("tycheck: {}", e);
        std::process::exit(e.exit_code());
    }
}

fn run(cli: &Cli) -> Result<(), CheckerError> {
    let eff = config::resolve_effective(cli.root.as_deref(), &cli.overrides())?;
    debug!(base = %eff.base_path.display(), "configuration resolved");

    let mut checker = Checker::new(
        TscEngine::new(eff.engine_command.clone()),
        TslintEngine::new(eff.lint_command.clone()),
    )
    .with_color(use_colors(cli.no_color));
    if let Some(path) = cli.parent_channel.as_ref() {
        checker = checker.with_parent(Box::new(ChannelNotifier::new(path)));
    }

    let stdin = io::stdin();
    checker.serve(&eff, cli.listen, stdin.lock(), &mut io::stdout().lock())?;
    Ok(())
}

/// Initialize tracing/logging based on CLI flags.
fn init_logging(verbose: bool, debug: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let level = if debug {
        "debug"
    } else if verbose {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}
