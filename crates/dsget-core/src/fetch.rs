//! The verified fetcher.
//!
//! Acquires every file of the selected URL groups into a destination
//! directory, skipping targets whose on-disk content already matches the
//! published checksum and re-verifying everything that gets downloaded.
//! Execution is strictly sequential; each target gets at most one GET per run.

use crate::checksum;
use crate::config::DatasetConfig;
use crate::manifest::{Manifest, ManifestParseError, MANIFEST_FILE_NAME};
use crate::transport::Transport;
use crate::url_model;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Conditions that abort a fetch run. A post-download digest mismatch is not
/// one of them; it is collected in the [`FetchReport`] instead.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no URLs selected; configuration must supply at least one non-empty group")]
    NoUrlsSelected,
    #[error("cannot derive a file name from URL {0}")]
    BadUrl(String),
    #[error("manifest GET {url} returned HTTP {status}")]
    ManifestUnavailable { url: String, status: u32 },
    #[error("manifest {url} is malformed")]
    ManifestParse {
        url: String,
        #[source]
        source: ManifestParseError,
    },
    /// The manifest has no entry for a requested file, so it cannot be
    /// verified at all. Distinct from a checksum mismatch.
    #[error("no manifest entry for {file}; cannot verify")]
    MissingManifestEntry { file: String },
    #[error("GET {url} returned HTTP {status}")]
    TargetUnavailable { url: String, status: u32 },
    /// Transport-level or local I/O failure, with context attached.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Terminal state of one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Local copy already matched the manifest; no GET was issued.
    AlreadyValid,
    /// Downloaded (first time or after a mismatch) and verified.
    Downloaded,
    /// Downloaded but the digest still does not match the manifest.
    Corrupt,
}

#[derive(Debug, Clone)]
pub struct TargetResult {
    pub url: String,
    pub path: PathBuf,
    pub outcome: Outcome,
}

/// Post-download digest mismatch for a single file.
#[derive(Debug, Clone)]
pub struct IntegrityFailure {
    pub path: PathBuf,
    pub expected: String,
    pub actual: String,
}

/// What happened to every target of a run. Integrity failures do not abort
/// the run; callers inspect them here.
#[derive(Debug, Default)]
pub struct FetchReport {
    pub targets: Vec<TargetResult>,
    pub failures: Vec<IntegrityFailure>,
}

impl FetchReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Acquire every file of the selected groups into `dest_dir`, verified
/// against the `SHA256SUMS.txt` manifest published alongside the data files.
///
/// Fatal conditions (manifest unavailable or unparseable, missing manifest
/// entry, non-success data GET, transport/disk failure) abort the run.
pub fn fetch_datasets(
    dest_dir: &Path,
    config: &DatasetConfig,
    demo: bool,
    transport: &dyn Transport,
) -> Result<FetchReport, FetchError> {
    let groups = config.selected_groups(demo);
    let first_url = groups
        .iter()
        .flat_map(|(_, urls)| urls.iter())
        .next()
        .ok_or(FetchError::NoUrlsSelected)?;

    fs::create_dir_all(dest_dir)
        .with_context(|| format!("create destination directory {}", dest_dir.display()))?;

    let manifest = fetch_manifest(first_url, transport)?;

    let mut report = FetchReport::default();
    for (group, urls) in groups {
        tracing::debug!("fetching group {} ({} urls)", group, urls.len());
        for url in urls {
            fetch_one(dest_dir, url, &manifest, transport, &mut report)?;
        }
    }
    Ok(report)
}

fn fetch_manifest(
    first_data_url: &str,
    transport: &dyn Transport,
) -> Result<Manifest, FetchError> {
    let url = url_model::sibling_url(first_data_url, MANIFEST_FILE_NAME)
        .ok_or_else(|| FetchError::BadUrl(first_data_url.to_string()))?;

    let resp = transport.get(&url)?;
    if !resp.is_success() {
        return Err(FetchError::ManifestUnavailable {
            url,
            status: resp.status,
        });
    }
    let text = resp.text()?;
    let manifest = Manifest::parse(text).map_err(|source| FetchError::ManifestParse {
        url: url.clone(),
        source,
    })?;
    tracing::info!("loaded checksum manifest from {} ({} entries)", url, manifest.len());
    Ok(manifest)
}

/// Drive one target to its terminal state and record it in `report`.
fn fetch_one(
    dest_dir: &Path,
    url: &str,
    manifest: &Manifest,
    transport: &dyn Transport,
    report: &mut FetchReport,
) -> Result<(), FetchError> {
    let name = url_model::file_name_from_url(url)
        .ok_or_else(|| FetchError::BadUrl(url.to_string()))?;
    let expected = manifest
        .expected(&name)
        .ok_or_else(|| FetchError::MissingManifestEntry { file: name.clone() })?;
    let dest = dest_dir.join(&name);

    if dest.exists() {
        let actual = checksum::sha256_file(&dest)?;
        if actual == expected {
            tracing::info!(
                "Skipping download, file already exists and valid checksum: {}",
                dest.display()
            );
            report.targets.push(TargetResult {
                url: url.to_string(),
                path: dest,
                outcome: Outcome::AlreadyValid,
            });
            return Ok(());
        }
        tracing::info!("Checksum mismatch for {}, redownloading", dest.display());
    }

    tracing::info!("Downloading {}", url);
    let resp = transport.get(url)?;
    if !resp.is_success() {
        return Err(FetchError::TargetUnavailable {
            url: url.to_string(),
            status: resp.status,
        });
    }
    fs::write(&dest, &resp.body).with_context(|| format!("write {}", dest.display()))?;

    // Verify what actually landed on disk, not the response buffer.
    let actual = checksum::sha256_file(&dest)?;
    let outcome = if actual == expected {
        Outcome::Downloaded
    } else {
        tracing::error!(
            "Downloaded file failed verification: {} (expected {}, got {})",
            dest.display(),
            expected,
            actual
        );
        report.failures.push(IntegrityFailure {
            path: dest.clone(),
            expected: expected.to_string(),
            actual,
        });
        Outcome::Corrupt
    };
    report.targets.push(TargetResult {
        url: url.to_string(),
        path: dest,
        outcome,
    });
    Ok(())
}
