// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repoledger CLI - deduplication ledger for trending-project pipelines

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use repoledger::{commands, config};

#[derive(Parser)]
#[command(name = "repoledger")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long)]
    quiet: bool,

    /// Ledger file path
    #[arg(short, long, global = true, env = "REPOLEDGER_FILE")]
    file: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a project was already analyzed (exit 1 if duplicate)
    Check {
        /// Project URL or owner/repo slug
        ident: String,
    },

    /// Record a project as analyzed
    Record {
        /// Project URL or owner/repo slug
        ident: String,

        /// GitHub web URL to store verbatim alongside the entry
        #[arg(long)]
        url: Option<String>,

        /// Star count at analysis time
        #[arg(long)]
        stars: Option<u64>,
    },

    /// Show ledger statistics
    Stats {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Upgrade a ledger file from the legacy v1 format
    Migrate {
        /// Only report the detected format, change nothing
        #[arg(short, long)]
        check: bool,

        /// Restore the most recent backup
        #[arg(short, long)]
        rollback: bool,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },

    /// Generate shell completions
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: clap_complete::Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 if cli.quiet => tracing::Level::ERROR,
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let file = cli.file.unwrap_or_else(config::default_store_path);

    // Execute command
    match cli.command {
        Commands::Check { ident } => {
            commands::check::run(file, &ident)
        }
        Commands::Record { ident, url, stars } => {
            commands::record::run(file, &ident, url, stars)
        }
        Commands::Stats { json } => {
            commands::stats::run(file, json)
        }
        Commands::Migrate { check, rollback, force } => {
            commands::migrate::run(file, check, rollback, force)
        }
        Commands::Completions { shell } => {
            commands::completions::run(shell, &mut Cli::command())
        }
    }
}
