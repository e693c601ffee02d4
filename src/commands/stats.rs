// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Stats command - summary report over the ledger

use crate::dedup::Deduplicator;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Run the stats command
pub fn run(file: PathBuf, json: bool) -> Result<()> {
    let dedup = Deduplicator::open(&file);
    let stats = dedup.statistics();

    if json {
        let out = serde_json::to_string_pretty(&stats).context("failed to serialize statistics")?;
        println!("{out}");
        return Ok(());
    }

    println!("{}", "Analyzed-project ledger".bold());
    println!("  file:           {}", file.display());
    println!("  total projects: {}", stats.total_projects);
    println!("  generated at:   {}", stats.last_updated.to_rfc3339());

    if !stats.projects_by_date.is_empty() {
        println!("  by date:");
        for (day, count) in &stats.projects_by_date {
            println!("    {day}  {count}");
        }
    }

    Ok(())
}
