// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Configuration - where the ledger file lives

use std::path::PathBuf;

/// Default ledger file name inside the data directory
pub const LEDGER_FILE_NAME: &str = "analyzed_projects.json";

/// Resolve the data directory for the ledger.
///
/// `REPOLEDGER_DATA_DIR` wins when set; otherwise the platform data
/// directory, falling back to `.repoledger` under the working directory.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("REPOLEDGER_DATA_DIR") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("org", "hyperpolymath", "repoledger")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".repoledger")
        })
}

/// Default path of the ledger file
#[must_use]
pub fn default_store_path() -> PathBuf {
    data_dir().join(LEDGER_FILE_NAME)
}
