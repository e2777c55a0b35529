//! sasspiler CLI - compile Sass stylesheet trees into CSS

use anyhow::Result;
use clap::Parser;
use miette::Diagnostic;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};
use sasspiler::util::diagnostic::SasspilerError;
use sasspiler::util::shell::Shell;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        if let Some(help) = e.downcast_ref::<SasspilerError>().and_then(|d| d.help()) {
            eprintln!("help: {}", help);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("sasspiler=debug")
    } else if cli.quiet {
        EnvFilter::new("sasspiler=warn")
    } else {
        EnvFilter::new("sasspiler=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();

    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    // Execute command
    match cli.command {
        Some(Commands::Version) => commands::version::execute(),
        Some(Commands::Completions(args)) => commands::completions::execute(args),
        None => commands::compile::execute(cli.compile, &shell),
    }
}
