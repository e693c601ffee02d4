// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Record command - mark a project as analyzed

use crate::dedup::Deduplicator;
use crate::normalize::canonical_key;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::warn;

/// Run the record command.
///
/// A failed ledger write is reported but not fatal: the pipeline contract
/// is that dedup bookkeeping never kills a run.
pub fn run(file: PathBuf, ident: &str, url: Option<String>, stars: Option<u64>) -> Result<()> {
    let mut record = super::candidate_from_ident(ident);
    if url.is_some() {
        record.html_url = url;
    }
    record.stargazers_count = stars;

    let key = canonical_key(&record);
    let mut dedup = Deduplicator::open(&file);

    if dedup.is_duplicate(&record) {
        println!("{} {} was already recorded, refreshing entry", "note:".yellow(), key);
    }

    if let Err(err) = dedup.record(&record) {
        warn!("{err:#}");
        eprintln!(
            "{} entry for {} held in memory only, write failed",
            "warning:".yellow(),
            key
        );
        return Ok(());
    }

    println!("{} {} recorded in {}", "ok:".green(), key, file.display());
    Ok(())
}
