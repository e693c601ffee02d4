// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//! Identity normalization - collapses the many spellings of a GitHub
//! project into one canonical `owner/repo` key

use crate::types::ProjectRecord;
use sha2::{Digest, Sha256};

/// Collapse a recognized GitHub URL to its `owner/repo` form.
///
/// Recognized spellings:
/// - `https://github.com/owner/repo` (trailing slash and `.git` optional)
/// - `git@github.com:owner/repo.git`
/// - `https://api.github.com/repos/owner/repo`
/// - `http://` variants of the web and API forms
///
/// Anything else - other hosts, malformed input, the empty string - comes
/// back unchanged. This function is total: it degrades to the identity
/// transform rather than failing. Case of owner and repo is preserved;
/// case-folding happens at key derivation, not here.
#[must_use]
pub fn normalize_github_url(url: &str) -> String {
    let trimmed = url.trim();

    // SSH form: git@github.com:owner/repo(.git)
    if let Some(rest) = trimmed.strip_prefix("git@github.com:") {
        if let Some(slug) = owner_repo_slug(rest) {
            return slug;
        }
        return url.to_string();
    }

    // Web and API forms, either scheme
    let without_scheme = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"));
    let Some(host_and_path) = without_scheme else {
        return url.to_string();
    };

    let path = if let Some(p) = host_and_path.strip_prefix("github.com/") {
        p
    } else if let Some(p) = host_and_path.strip_prefix("api.github.com/repos/") {
        p
    } else {
        return url.to_string();
    };

    owner_repo_slug(path).unwrap_or_else(|| url.to_string())
}

/// Take the first two path segments as `owner/repo`, dropping a `.git`
/// suffix and ignoring anything after the repo name.
fn owner_repo_slug(path: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?;
    let repo = repo.strip_suffix(".git").unwrap_or(repo);
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some(format!("{owner}/{repo}"))
}

/// Derive the canonical ledger key for a candidate project.
///
/// Priority, first match wins:
/// 1. non-empty `full_name`, lowercased - upstream APIs supply this
///    pre-normalized, so it is trusted as authoritative;
/// 2. `html_url` whose normalization actually matched a GitHub spelling,
///    lowercased;
/// 3. the `owner.login`/`name` pair, each defaulting to `"unknown"`.
///
/// Records with no identity at all therefore resolve to
/// `"unknown/unknown"` and collide with each other. That collision is
/// long-standing observed behavior the pipeline relies on not changing;
/// in practice GitHub payloads always carry `full_name`.
#[must_use]
pub fn canonical_key(record: &ProjectRecord) -> String {
    if let Some(full_name) = &record.full_name {
        if !full_name.is_empty() {
            return full_name.to_lowercase();
        }
    }

    if let Some(html_url) = &record.html_url {
        let normalized = normalize_github_url(html_url);
        if !normalized.is_empty() && normalized != *html_url {
            return normalized.to_lowercase();
        }
    }

    let owner = record
        .owner
        .as_ref()
        .and_then(|o| o.login.as_deref())
        .unwrap_or("unknown");
    let name = record.name.as_deref().unwrap_or("unknown");
    format!("{owner}/{name}").to_lowercase()
}

/// SHA-256 fingerprint over a record's identity fields.
///
/// Concatenates, `|`-separated and in fixed order: lowercased `full_name`,
/// lowercased normalized `html_url`, decimal `id`. Absent fields are
/// omitted rather than placeheld. Stored for audit and debugging only;
/// duplicate checks go through [`canonical_key`], never through this.
#[must_use]
pub fn project_hash(record: &ProjectRecord) -> String {
    let mut parts = Vec::new();

    if let Some(full_name) = &record.full_name {
        if !full_name.is_empty() {
            parts.push(full_name.to_lowercase());
        }
    }

    if let Some(html_url) = &record.html_url {
        if !html_url.is_empty() {
            parts.push(normalize_github_url(html_url).to_lowercase());
        }
    }

    if let Some(id) = record.id {
        parts.push(id.to_string());
    }

    let mut hasher = Sha256::new();
    hasher.update(parts.join("|").as_bytes());
    hex::encode(hasher.finalize())
}

/// SHA-256 fingerprint of a bare ledger key, used when upgrading v1
/// entries that carry no other identity material.
#[must_use]
pub fn key_hash(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hex::encode(hasher.finalize())
}
