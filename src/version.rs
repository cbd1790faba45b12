//! Release label normalization.
//!
//! Fix versions and sprints are named freely in the tracker, e.g.
//! `"6.12.0 (16.9 - 29.9)"`. Reports group by the `MAJOR.MINOR` prefix.

/// Extract the `MAJOR.MINOR` token from a release or sprint label.
///
/// Only the first whitespace-separated word is considered. Labels with fewer
/// than two dot-separated parts are returned as they are.
pub fn extract_version(raw_name: &str) -> Option<String> {
    let token = raw_name.split_whitespace().next()?;

    let mut parts = token.split('.');
    match (parts.next(), parts.next()) {
        (Some(major), Some(minor)) => Some(format!("{}.{}", major, minor)),
        _ => Some(token.to_string()),
    }
}

/// Pick the lexicographically greatest label and normalize it.
pub fn latest_version<S: AsRef<str>>(names: &[S]) -> Option<String> {
    names
        .iter()
        .map(AsRef::as_ref)
        .max()
        .and_then(extract_version)
}
