// SPDX-License-Identifier: AGPL-3.0-or-later
// SPDX-FileCopyrightText: 2025 Jonathan D.A. Jewell
//
//! Command implementations

pub mod check;
pub mod completions;
pub mod migrate;
pub mod record;
pub mod stats;

use crate::types::ProjectRecord;

/// Build a candidate record from a CLI identifier, which may be a URL in
/// any supported spelling or a bare `owner/repo` slug.
#[must_use]
pub fn candidate_from_ident(ident: &str) -> ProjectRecord {
    let looks_like_url = ident.contains("://") || ident.starts_with("git@");
    if looks_like_url {
        ProjectRecord {
            html_url: Some(ident.to_string()),
            ..ProjectRecord::default()
        }
    } else {
        ProjectRecord::named(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_becomes_full_name() {
        let record = candidate_from_ident("acme/widget");
        assert_eq!(record.full_name.as_deref(), Some("acme/widget"));
        assert!(record.html_url.is_none());
    }

    #[test]
    fn url_forms_become_html_url() {
        for ident in ["https://github.com/acme/widget", "git@github.com:acme/widget.git"] {
            let record = candidate_from_ident(ident);
            assert_eq!(record.html_url.as_deref(), Some(ident));
            assert!(record.full_name.is_none());
        }
    }
}
