// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Ledger persistence - a `Store` seam over a single JSON file, with
//! explicit decoding of the legacy v1 shapes and a pure v1-to-v2 upgrade

use crate::normalize::key_hash;
use crate::types::{AnalyzedEntry, EntryMap, StoreDocument};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Errors from loading or saving a ledger
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem-level failure
    #[error("failed to access {path}: {source}")]
    Io {
        /// Store file involved
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },
    /// The file exists but is not a ledger document in any known shape
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Store file involved
        path: PathBuf,
        /// Underlying decode error
        source: serde_json::Error,
    },
}

/// Persistence seam for the ledger. The deduplicator only ever sees an
/// entry map; how it reaches disk lives behind this trait, so a real
/// embedded store could be substituted without touching dedup logic.
pub trait Store {
    /// Read the full entry map. An absent backing file is an empty
    /// ledger, not an error.
    fn load(&self) -> Result<EntryMap, StoreError>;

    /// Persist the full entry map, replacing whatever was there.
    fn save(&self, entries: &EntryMap) -> Result<(), StoreError>;
}

// =============================================================================
// On-disk shapes
// =============================================================================

/// Every document shape ever written by this pipeline, decoded explicitly.
/// v1 variants exist on the read path only; nothing can write them back.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStore {
    /// Wrapped document: v2, or v1 with a list-shaped projects field
    Document(RawDocument),
    /// Oldest shape: the whole file is a flat list of keys
    BareKeys(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(default)]
    analyzed_projects: RawProjects,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawProjects {
    /// v2: key -> entry map (lenient on missing entry fields)
    Entries(EntryMap),
    /// v1: flat list of keys
    Keys(Vec<String>),
}

impl Default for RawProjects {
    fn default() -> Self {
        Self::Entries(EntryMap::new())
    }
}

/// Upgrade a v1 key list to v2 entries. Synthesizes the metadata the v1
/// format never had: `added_date` is the upgrade time, the fingerprint
/// covers just the key, the URL is reconstructed from the key, and stars
/// are zero. Blank keys are dropped.
#[must_use]
pub fn upgrade_v1<I>(keys: I, now: DateTime<Utc>) -> EntryMap
where
    I: IntoIterator<Item = String>,
{
    keys.into_iter()
        .filter(|key| !key.trim().is_empty())
        .map(|key| {
            let entry = AnalyzedEntry {
                added_date: now,
                project_hash: key_hash(&key),
                github_url: format!("https://github.com/{key}"),
                stars_when_analyzed: 0,
                migrated_from_v1: true,
            };
            (key, entry)
        })
        .collect()
}

// =============================================================================
// JSON file store
// =============================================================================

/// File-backed [`Store`]: one pretty-printed UTF-8 JSON document per
/// ledger, rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Bind a store to a file path. Nothing is read until [`Store::load`].
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The bound file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl Store for JsonFileStore {
    fn load(&self) -> Result<EntryMap, StoreError> {
        if !self.path.exists() {
            return Ok(EntryMap::new());
        }

        let content = fs::read_to_string(&self.path).map_err(|e| self.io_err(e))?;
        let raw: RawStore = serde_json::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;

        let entries = match raw {
            RawStore::Document(doc) => match doc.analyzed_projects {
                RawProjects::Entries(entries) => entries,
                RawProjects::Keys(keys) => {
                    let upgraded = upgrade_v1(keys, Utc::now());
                    info!(
                        "upgraded {} v1 entries from {} in memory",
                        upgraded.len(),
                        self.path.display()
                    );
                    upgraded
                }
            },
            RawStore::BareKeys(keys) => {
                let upgraded = upgrade_v1(keys, Utc::now());
                info!(
                    "upgraded {} v1 entries from {} in memory",
                    upgraded.len(),
                    self.path.display()
                );
                upgraded
            }
        };

        Ok(entries)
    }

    fn save(&self, entries: &EntryMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }

        let document = StoreDocument::wrap(entries.clone());
        let json = serde_json::to_string_pretty(&document).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|e| self.io_err(e))
    }
}
