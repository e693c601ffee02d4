// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Check command - duplicate verdict for one candidate

use crate::dedup::Deduplicator;
use crate::normalize::canonical_key;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::PathBuf;
use tracing::debug;

/// Run the check command. Exits with status 1 when the project is already
/// recorded, so shell pipelines can branch on the verdict.
pub fn run(file: PathBuf, ident: &str) -> Result<()> {
    let record = super::candidate_from_ident(ident);
    let key = canonical_key(&record);
    debug!("checking key {} in {}", key, file.display());

    let dedup = Deduplicator::open(&file);
    if dedup.is_duplicate(&record) {
        println!("{} {} already analyzed", "duplicate:".yellow(), key);
        std::process::exit(1);
    }

    println!("{} {} not seen before", "new:".green(), key);
    Ok(())
}
