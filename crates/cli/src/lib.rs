pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "babelflag",
    about = "Babelflag operator CLI",
    long_about = "Inspect babelflag configuration, check deployment readiness, and try flag resolution.",
    after_help = "Examples:\n  babelflag doctor --json\n  babelflag doctor --offline\n  babelflag config\n  babelflag resolve flag-jp"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, Slack token readiness, and AWS credential checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
        #[arg(long, help = "Skip Slack auth.test and AWS credential resolution")]
        offline: bool,
    },
    #[command(about = "Show the language a flag reaction translates into")]
    Resolve {
        #[arg(help = "Reaction name, with or without the `flag-` prefix (e.g. `jp`)")]
        reaction: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json, offline } => commands::doctor::run(json, offline),
        Command::Resolve { reaction } => commands::resolve::run(&reaction),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
