//! Destination file naming derived from data URLs.

/// Last non-empty path segment of `url`, used as the relative file name.
///
/// Returns `None` if the URL does not parse or has no usable segment.
pub fn file_name_from_url(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let name = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// URL of `name` in the same directory as the file `url` points at.
/// Used to locate the checksum manifest published alongside the data files.
pub fn sibling_url(url: &str, name: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    parsed.join(name).ok().map(|u| u.to_string())
}
