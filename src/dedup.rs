// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! The deduplicator - in-memory ledger plus best-effort persistence

use crate::normalize::{canonical_key, project_hash};
use crate::store::{JsonFileStore, Store};
use crate::types::{AnalyzedEntry, EntryMap, ProjectRecord, Statistics};
use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Tracks which projects the pipeline has already analyzed.
///
/// The in-memory map is the source of truth for the lifetime of the
/// process; the store is a durable mirror rewritten after every mutation.
/// A failed write is reported through [`record`](Self::record)'s `Result`,
/// but the map keeps the new entry either way - pipeline callers are
/// expected to log such failures and keep going rather than abort a run
/// over a dedup bookkeeping write.
pub struct Deduplicator<S: Store = JsonFileStore> {
    store: S,
    entries: EntryMap,
}

impl Deduplicator<JsonFileStore> {
    /// Open a ledger backed by the JSON file at `path`.
    ///
    /// An absent file starts an empty ledger. A corrupt file is logged as
    /// a warning and also starts empty - construction never fails for bad
    /// store contents, only genuine I/O errors (permission denied on an
    /// existing file) surface as warnings too, again with an empty ledger.
    #[must_use]
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::with_store(JsonFileStore::new(path.as_ref()))
    }
}

impl<S: Store> Deduplicator<S> {
    /// Build a ledger over any store implementation, loading it eagerly.
    #[must_use]
    pub fn with_store(store: S) -> Self {
        let entries = match store.load() {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to load analyzed-project ledger, starting empty: {err}");
                EntryMap::new()
            }
        };
        Self { store, entries }
    }

    /// Has a project with this record's canonical key been recorded?
    ///
    /// Pure lookup: never mutates, never fails. Records with no identity
    /// fields resolve to the `"unknown/unknown"` fallback key, so after
    /// one such record every later identity-less record reads as a
    /// duplicate of it.
    #[must_use]
    pub fn is_duplicate(&self, record: &ProjectRecord) -> bool {
        self.entries.contains_key(&canonical_key(record))
    }

    /// Mark a project as analyzed and persist the ledger.
    ///
    /// Re-recording a known key overwrites the whole entry, `added_date`
    /// included; the ledger tracks the most recent analysis, not the
    /// first. The in-memory insert happens before the write, so an `Err`
    /// here means "not durable yet", not "not recorded".
    pub fn record(&mut self, record: &ProjectRecord) -> Result<()> {
        let key = canonical_key(record);
        let entry = AnalyzedEntry {
            added_date: Utc::now(),
            project_hash: project_hash(record),
            github_url: record.html_url.clone().unwrap_or_default(),
            stars_when_analyzed: record.stargazers_count.unwrap_or(0),
            migrated_from_v1: false,
        };
        self.entries.insert(key, entry);

        self.store
            .save(&self.entries)
            .context("failed to persist analyzed-project ledger")
    }

    /// Summary report: entry count, per-day recording counts, and the
    /// report's own generation time.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        let mut projects_by_date: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.entries.values() {
            let day = entry.added_date.format("%Y-%m-%d").to_string();
            *projects_by_date.entry(day).or_insert(0) += 1;
        }

        Statistics {
            total_projects: self.entries.len(),
            projects_by_date,
            last_updated: Utc::now(),
        }
    }

    /// Number of recorded projects
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Is the ledger empty?
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read access to the raw entry map, for reporting and validation
    #[must_use]
    pub fn entries(&self) -> &EntryMap {
        &self.entries
    }
}

/// A store whose writes always fail, for exercising the degraded path.
#[cfg(test)]
struct BrokenWrites;

#[cfg(test)]
impl Store for BrokenWrites {
    fn load(&self) -> Result<EntryMap, crate::store::StoreError> {
        Ok(EntryMap::new())
    }

    fn save(&self, _entries: &EntryMap) -> Result<(), crate::store::StoreError> {
        Err(crate::store::StoreError::Io {
            path: "/nowhere".into(),
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        })
    }
}
