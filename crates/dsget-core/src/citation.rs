//! CITATION.cff maintenance: sync the version and release date fields with
//! the latest release published on the hosting API.

use crate::transport::Transport;
use anyhow::{bail, Context, Result};
use regex::{NoExpand, Regex};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Fields we use from the hosting API's `releases/latest` response.
#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: String,
    published_at: String,
}

/// A release distilled to what CITATION.cff needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    /// Version without a leading `v`.
    pub version: String,
    /// Publication date as `YYYY-MM-DD`.
    pub date: String,
}

/// API endpoint for the latest release of `repo` ("owner/name").
pub fn latest_release_url(repo: &str) -> String {
    format!("https://api.github.com/repos/{repo}/releases/latest")
}

/// Fetch and distill the latest release via `transport`.
pub fn latest_release(transport: &dyn Transport, api_url: &str) -> Result<Release> {
    let resp = transport.get(api_url)?;
    if !resp.is_success() {
        bail!("release lookup {} returned HTTP {}", api_url, resp.status);
    }
    let latest: LatestRelease =
        serde_json::from_slice(&resp.body).context("parse release JSON")?;

    let version = latest.tag_name.trim_start_matches('v').to_string();
    // published_at is an ISO timestamp; the date is everything before 'T'.
    let date = latest
        .published_at
        .split('T')
        .next()
        .unwrap_or_default()
        .to_string();
    if version.is_empty() || date.is_empty() {
        bail!("release response has empty tag_name or published_at");
    }
    Ok(Release { version, date })
}

/// Rewrite the `version:` and `date-released:` fields of the CFF file at
/// `path` in place. Everything else is left untouched.
pub fn sync_citation(path: &Path, release: &Release) -> Result<()> {
    let content =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;

    let version_re = Regex::new(r#"version: "[^"]*""#)?;
    let date_re = Regex::new(r"date-released: \d{4}-\d{2}-\d{2}")?;

    let replacement = format!(r#"version: "{}""#, release.version);
    let content = version_re.replace_all(&content, NoExpand(&replacement));
    let replacement = format!("date-released: {}", release.date);
    let content = date_re.replace_all(&content, NoExpand(&replacement));

    fs::write(path, content.as_bytes()).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(
        "updated {} to v{} ({})",
        path.display(),
        release.version,
        release.date
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ScriptedTransport;
    use std::io::Write;

    const CFF: &str = r#"cff-version: 1.2.0
message: "If you use this dataset, please cite it."
title: "Example Dataset"
authors:
  - family-names: "Doe"
    given-names: "Jane"
version: "0.0.1"
date-released: 2020-01-01
url: "https://example.com/dataset"
"#;

    fn release() -> Release {
        Release {
            version: "1.4.2".to_string(),
            date: "2026-08-01".to_string(),
        }
    }

    #[test]
    fn latest_release_strips_v_and_truncates_date() {
        let body = r#"{"tag_name": "v1.4.2", "published_at": "2026-08-01T12:34:56Z"}"#;
        let transport =
            ScriptedTransport::new().respond("http://api.example/latest", 200, body);
        let rel = latest_release(&transport, "http://api.example/latest").unwrap();
        assert_eq!(rel, release());
    }

    #[test]
    fn latest_release_rejects_non_success() {
        let transport =
            ScriptedTransport::new().respond("http://api.example/latest", 403, "{}");
        assert!(latest_release(&transport, "http://api.example/latest").is_err());
    }

    #[test]
    fn latest_release_rejects_missing_fields() {
        let transport = ScriptedTransport::new().respond(
            "http://api.example/latest",
            200,
            r#"{"tag_name": "v", "published_at": ""}"#,
        );
        assert!(latest_release(&transport, "http://api.example/latest").is_err());
    }

    #[test]
    fn release_url_shape() {
        assert_eq!(
            latest_release_url("owner/name"),
            "https://api.github.com/repos/owner/name/releases/latest"
        );
    }

    #[test]
    fn sync_rewrites_version_and_date_only() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(CFF.as_bytes()).unwrap();
        f.flush().unwrap();

        sync_citation(f.path(), &release()).unwrap();

        let updated = fs::read_to_string(f.path()).unwrap();
        assert!(updated.contains(r#"version: "1.4.2""#));
        assert!(updated.contains("date-released: 2026-08-01"));
        // Everything else is untouched.
        assert!(updated.contains("title: \"Example Dataset\""));
        assert!(updated.contains("family-names: \"Doe\""));
        assert!(!updated.contains("0.0.1"));
        assert!(!updated.contains("2020-01-01"));
    }

    #[test]
    fn sync_keeps_required_cff_fields() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(CFF.as_bytes()).unwrap();
        f.flush().unwrap();

        sync_citation(f.path(), &release()).unwrap();

        let updated = fs::read_to_string(f.path()).unwrap();
        for field in [
            "cff-version",
            "message",
            "authors",
            "title",
            "version",
            "date-released",
            "url",
        ] {
            assert!(
                updated.lines().any(|l| l.starts_with(&format!("{field}:"))),
                "missing field {field}"
            );
        }
    }

    #[test]
    fn sync_is_idempotent() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(CFF.as_bytes()).unwrap();
        f.flush().unwrap();

        sync_citation(f.path(), &release()).unwrap();
        let first = fs::read_to_string(f.path()).unwrap();
        sync_citation(f.path(), &release()).unwrap();
        let second = fs::read_to_string(f.path()).unwrap();
        assert_eq!(first, second);
    }
}
