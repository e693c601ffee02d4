// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Migrate command - operator-invoked ledger format upgrade

use crate::migrate::{Migrator, StoreFormat};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Run the migrate command
pub fn run(file: PathBuf, check: bool, rollback: bool, force: bool) -> Result<()> {
    let migrator = Migrator::new(&file);

    if rollback {
        let backup = migrator.rollback()?;
        println!("{} restored {} from {}", "ok:".green(), file.display(), backup.display());
        return Ok(());
    }

    if check {
        let format = migrator.detect_format();
        println!("detected format: {}", format.label());
        match format {
            StoreFormat::V2 => println!("{} already current, nothing to do", "ok:".green()),
            StoreFormat::V1 | StoreFormat::V1Simple => {
                println!("{} migration to v2 required", "note:".yellow());
            }
            StoreFormat::Empty => println!("no ledger file yet"),
            StoreFormat::Invalid => println!("{} file is not a ledger", "error:".red()),
        }
        return Ok(());
    }

    let format = migrator.detect_format();
    if format.needs_migration() && !force && !confirm(&file)? {
        println!("aborted");
        return Ok(());
    }

    let report = migrator.migrate()?;
    match report.detected {
        StoreFormat::V2 => println!("{} already v2, nothing migrated", "ok:".green()),
        StoreFormat::Empty => println!("{} created fresh v2 ledger", "ok:".green()),
        _ => {
            println!(
                "{} migrated {} entries ({} -> v2)",
                "ok:".green(),
                report.migrated,
                report.detected.label()
            );
            if let Some(backup) = &report.backup {
                println!("  backup: {}", backup.display());
            }
        }
    }

    let total = migrator.validate()?;
    println!("  validated: ledger reopens with {total} entries");
    Ok(())
}

/// Interactive confirmation before rewriting the live file
fn confirm(file: &std::path::Path) -> Result<bool> {
    print!("This will rewrite {}. Continue? (y/N): ", file.display());
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
