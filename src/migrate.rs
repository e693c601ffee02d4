// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Offline migration tooling for ledger files
//!
//! The live [`crate::dedup::Deduplicator`] already upgrades v1 data
//! lazily in memory on load; this module is the operator-facing path that
//! forces the upgrade onto disk, with a timestamped backup and rollback.
//! Unlike the live path, everything here fails loudly.

use crate::dedup::Deduplicator;
use crate::store::{upgrade_v1, JsonFileStore, Store};
use crate::types::EntryMap;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Detected shape of a ledger file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreFormat {
    /// No file at the path
    Empty,
    /// Wrapped document with a list-shaped `analyzed_projects`
    V1,
    /// Bare list of keys, the oldest shape
    V1Simple,
    /// Current dict-shaped format
    V2,
    /// Exists but is not a ledger in any known shape
    Invalid,
}

impl StoreFormat {
    /// Short operator-facing label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::V1 => "v1",
            Self::V1Simple => "v1_simple",
            Self::V2 => "v2",
            Self::Invalid => "invalid",
        }
    }

    /// Does this format need migrating?
    #[must_use]
    pub fn needs_migration(self) -> bool {
        matches!(self, Self::V1 | Self::V1Simple)
    }
}

/// Outcome of a completed migration run
#[derive(Debug)]
pub struct MigrationReport {
    /// Format found before migrating
    pub detected: StoreFormat,
    /// Entries written to the upgraded file (0 for no-op runs)
    pub migrated: usize,
    /// Backup file written before the upgrade, if one was taken
    pub backup: Option<PathBuf>,
}

/// One-shot migrator bound to a single ledger file
pub struct Migrator {
    path: PathBuf,
}

impl Migrator {
    /// Bind to a ledger file path
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The bound ledger path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Inspect the file and classify its shape without touching it.
    #[must_use]
    pub fn detect_format(&self) -> StoreFormat {
        if !self.path.exists() {
            return StoreFormat::Empty;
        }
        let Ok(content) = fs::read_to_string(&self.path) else {
            return StoreFormat::Invalid;
        };
        let Ok(value) = serde_json::from_str::<Value>(&content) else {
            return StoreFormat::Invalid;
        };

        match value {
            Value::Array(_) => StoreFormat::V1Simple,
            Value::Object(map) => {
                if map.get("version").and_then(Value::as_str) == Some(crate::types::SCHEMA_VERSION)
                {
                    return StoreFormat::V2;
                }
                match map.get("analyzed_projects") {
                    Some(Value::Array(_)) => StoreFormat::V1,
                    Some(Value::Object(_)) => StoreFormat::V2,
                    _ => StoreFormat::Invalid,
                }
            }
            _ => StoreFormat::Invalid,
        }
    }

    /// Copy the live file aside as `<file>.backup_<timestamp>`. Returns
    /// the backup path, or `None` when there is nothing to back up.
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let backup_path = backup_sibling(&self.path, &stamp.to_string());
        fs::copy(&self.path, &backup_path).with_context(|| {
            format!(
                "failed to back up {} to {}",
                self.path.display(),
                backup_path.display()
            )
        })?;
        info!("backed up {} to {}", self.path.display(), backup_path.display());
        Ok(Some(backup_path))
    }

    /// Run the migration: detect, back up, upgrade, write.
    ///
    /// v2 files are a no-op; an absent file gets a fresh empty v2
    /// document; invalid files are an error. Backup failure aborts before
    /// anything is rewritten.
    pub fn migrate(&self) -> Result<MigrationReport> {
        let detected = self.detect_format();
        let store = JsonFileStore::new(&self.path);

        match detected {
            StoreFormat::V2 => Ok(MigrationReport {
                detected,
                migrated: 0,
                backup: None,
            }),
            StoreFormat::Empty => {
                store
                    .save(&EntryMap::new())
                    .context("failed to create fresh v2 ledger")?;
                Ok(MigrationReport {
                    detected,
                    migrated: 0,
                    backup: None,
                })
            }
            StoreFormat::Invalid => {
                bail!("{} is not a ledger in any known format", self.path.display())
            }
            StoreFormat::V1 | StoreFormat::V1Simple => {
                let backup = self.backup()?;
                let keys = self.read_v1_keys()?;
                let upgraded = upgrade_v1(keys, Utc::now());
                let migrated = upgraded.len();
                store
                    .save(&upgraded)
                    .context("failed to write upgraded ledger")?;
                info!("migrated {} entries to v2 in {}", migrated, self.path.display());
                Ok(MigrationReport {
                    detected,
                    migrated,
                    backup,
                })
            }
        }
    }

    /// Restore the most recent `<file>.backup_*` sibling over the live
    /// file. Errors when no backup exists.
    pub fn rollback(&self) -> Result<PathBuf> {
        let backup = self
            .latest_backup()?
            .with_context(|| format!("no backup found for {}", self.path.display()))?;
        fs::copy(&backup, &self.path).with_context(|| {
            format!("failed to restore {} from {}", self.path.display(), backup.display())
        })?;
        info!("restored {} from {}", self.path.display(), backup.display());
        Ok(backup)
    }

    /// Reopen the migrated file through the deduplicator and report its
    /// entry count, proving the live path can read the result.
    pub fn validate(&self) -> Result<usize> {
        let format = self.detect_format();
        if format != StoreFormat::V2 {
            bail!(
                "post-migration ledger {} reads as {}, expected v2",
                self.path.display(),
                format.label()
            );
        }
        Ok(Deduplicator::open(&self.path).len())
    }

    fn read_v1_keys(&self) -> Result<Vec<String>> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let value: Value = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;

        let list = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("analyzed_projects") {
                Some(Value::Array(items)) => items,
                _ => bail!("{} does not hold a v1 key list", self.path.display()),
            },
            _ => bail!("{} does not hold a v1 key list", self.path.display()),
        };

        Ok(list
            .into_iter()
            .filter_map(|item| item.as_str().map(ToString::to_string))
            .collect())
    }

    fn latest_backup(&self) -> Result<Option<PathBuf>> {
        let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) else {
            return Ok(None);
        };
        let Some(file_name) = self.path.file_name().map(|n| n.to_string_lossy().to_string())
        else {
            return Ok(None);
        };
        let prefix = format!("{file_name}.backup_");

        let mut backups: Vec<PathBuf> = Vec::new();
        for dir_entry in fs::read_dir(parent)
            .with_context(|| format!("failed to list {}", parent.display()))?
        {
            let dir_entry = dir_entry?;
            if dir_entry.file_name().to_string_lossy().starts_with(&prefix) {
                backups.push(dir_entry.path());
            }
        }
        // Timestamps sort lexicographically, so max is the newest.
        backups.sort();
        Ok(backups.pop())
    }
}

fn backup_sibling(path: &Path, stamp: &str) -> PathBuf {
    let file_name = path
        .file_name()
        .map_or_else(|| "ledger.json".to_string(), |n| n.to_string_lossy().to_string());
    path.with_file_name(format!("{file_name}.backup_{stamp}"))
}
