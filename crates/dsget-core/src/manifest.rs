//! Checksum manifest: relative path -> expected SHA-256 hex digest.
//!
//! Parsed once per fetch run from the `SHA256SUMS.txt` published alongside
//! the data files, then read-only for the rest of the run.

use std::collections::HashMap;
use thiserror::Error;

/// Fixed manifest filename, published in the same directory as the data files.
pub const MANIFEST_FILE_NAME: &str = "SHA256SUMS.txt";

#[derive(Debug, Clone, Error)]
#[error("malformed manifest line {line_no}: {line:?}")]
pub struct ManifestParseError {
    pub line_no: usize,
    pub line: String,
}

/// Read-only mapping from relative file path to expected digest.
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    entries: HashMap<String, String>,
}

impl Manifest {
    /// Parse manifest text: one `<64-hex-digest> <relative-path>` record per
    /// line. Blank lines are skipped; anything else malformed is an error.
    /// If a path appears twice, the last line wins.
    pub fn parse(text: &str) -> Result<Self, ManifestParseError> {
        let mut entries = HashMap::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim_end();
            if line.is_empty() {
                continue;
            }
            let malformed = || ManifestParseError {
                line_no: idx + 1,
                line: raw.to_string(),
            };
            let (digest, path) = line.split_once(' ').ok_or_else(malformed)?;
            // Tolerate the coreutils two-space separator.
            let path = path.trim_start();
            if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(malformed());
            }
            if path.is_empty() {
                return Err(malformed());
            }
            entries.insert(path.to_string(), digest.to_ascii_lowercase());
        }
        Ok(Manifest { entries })
    }

    /// Expected digest for `rel_path`, if the manifest lists it.
    pub fn expected(&self, rel_path: &str) -> Option<&str> {
        self.entries.get(rel_path).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
