mod cli;
mod commands;
mod engine;
mod node;
mod platform;
mod progress;
mod runner;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command};
use cookbook::PlatformFamily;
use std::io;

/// Global context for the application
pub struct Context {
    pub verbose: u8,
    pub quiet: bool,
    pub node_file: Option<String>,
    pub platform: Option<PlatformFamily>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context {
        verbose: cli.verbose,
        quiet: cli.quiet,
        node_file: cli.node_file,
        platform: cli.platform.map(Into::into),
    };

    match cli.command {
        Command::Plan(args) => commands::plan::run(&ctx, args),
        Command::Config(args) => commands::config::run(&ctx, args),
        Command::Converge(args) => commands::converge::run(&ctx, args),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "preview-converge", &mut io::stdout());
            Ok(())
        }
    }
}
