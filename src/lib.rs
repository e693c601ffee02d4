// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Repoledger library - deduplication ledger for trending-project pipelines
//!
//! This crate answers one question for content-generation pipelines that
//! periodically discover GitHub projects: "have I already analyzed this
//! project?" It owns a single JSON-backed ledger mapping a canonical
//! `owner/repo` key to analysis metadata, and tolerates every URL spelling
//! GitHub projects arrive under (HTTPS, `.git` suffixed, SSH, REST API).
//!
//! The ledger is single-process and synchronous: [`dedup::Deduplicator`]
//! takes `&mut self` to record, and no file locking is performed. Callers
//! that need concurrent access must wrap it in their own `Mutex`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod commands;
pub mod config;
pub mod dedup;
pub mod migrate;
pub mod normalize;
pub mod store;

/// Core data types for the ledger and its on-disk document
pub mod types {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    /// Current on-disk schema version tag
    pub const SCHEMA_VERSION: &str = "2.0";

    // =========================================================================
    // Candidate Project (input)
    // =========================================================================

    /// Owner fragment of a GitHub API project payload
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct ProjectOwner {
        /// Owner login name
        pub login: Option<String>,
    }

    /// A candidate project as handed over by the discovery side of the
    /// pipeline. Mirrors the GitHub API payload shape; every field is
    /// optional because scraped candidates arrive in varying completeness.
    #[derive(Debug, Clone, Default, Serialize, Deserialize)]
    pub struct ProjectRecord {
        /// `"<owner>/<repo>"`, case preserved as supplied
        #[serde(default)]
        pub full_name: Option<String>,
        /// GitHub web URL in whatever spelling the source used
        #[serde(default)]
        pub html_url: Option<String>,
        /// GitHub's numeric project ID
        #[serde(default)]
        pub id: Option<u64>,
        /// Repository name, fallback identity when `full_name` is absent
        #[serde(default)]
        pub name: Option<String>,
        /// Repository owner, fallback identity when `full_name` is absent
        #[serde(default)]
        pub owner: Option<ProjectOwner>,
        /// Star count at discovery time, stored as metadata only
        #[serde(default)]
        pub stargazers_count: Option<u64>,
    }

    impl ProjectRecord {
        /// Convenience constructor for the common `full_name`-only case
        #[must_use]
        pub fn named(full_name: &str) -> Self {
            Self {
                full_name: Some(full_name.to_string()),
                ..Self::default()
            }
        }
    }

    // =========================================================================
    // Analyzed Entry (persisted, one per canonical key)
    // =========================================================================

    /// Metadata stored once per project ever recorded
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct AnalyzedEntry {
        /// When the project was recorded
        #[serde(default = "Utc::now")]
        pub added_date: DateTime<Utc>,
        /// SHA-256 fingerprint over the record's identity fields; audit
        /// only, never consulted for lookups
        #[serde(default)]
        pub project_hash: String,
        /// The `html_url` as supplied at insertion time, verbatim
        #[serde(default)]
        pub github_url: String,
        /// Star count snapshot at insertion time
        #[serde(default)]
        pub stars_when_analyzed: u64,
        /// Set on entries carried over from the v1 list schema
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        pub migrated_from_v1: bool,
    }

    /// Map from canonical `owner/repo` key to its entry. `BTreeMap` keeps
    /// the persisted document deterministic.
    pub type EntryMap = BTreeMap<String, AnalyzedEntry>;

    // =========================================================================
    // Store Document (persisted)
    // =========================================================================

    /// The complete persisted v2 document
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct StoreDocument {
        /// Schema version tag, `"2.0"`
        pub version: String,
        /// When the document was last written
        pub last_updated: DateTime<Utc>,
        /// Entry count; recomputed on every save, never trusted on read
        pub total_projects: usize,
        /// The ledger itself
        #[serde(default)]
        pub analyzed_projects: EntryMap,
    }

    impl StoreDocument {
        /// Wrap an entry map in a fresh v2 document with recomputed counters
        #[must_use]
        pub fn wrap(entries: EntryMap) -> Self {
            Self {
                version: SCHEMA_VERSION.to_string(),
                last_updated: Utc::now(),
                total_projects: entries.len(),
                analyzed_projects: entries,
            }
        }
    }

    // =========================================================================
    // Statistics
    // =========================================================================

    /// Summary report over the ledger
    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Statistics {
        /// Number of recorded projects
        pub total_projects: usize,
        /// Recorded-project counts grouped by `YYYY-MM-DD` of `added_date`
        pub projects_by_date: BTreeMap<String, usize>,
        /// When this report was generated (wall clock at call time, not the
        /// store's persisted write timestamp)
        pub last_updated: DateTime<Utc>,
    }
}

/// Prelude for common imports
pub mod prelude {
    pub use crate::dedup::Deduplicator;
    pub use crate::types::{AnalyzedEntry, EntryMap, ProjectRecord, Statistics};
    pub use anyhow::{Context, Result};
}
