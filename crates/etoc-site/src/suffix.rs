//! File suffix helpers shared by the model and the filesystem side.

/// Suffixes recognised as document sources.
pub const DOCUMENT_SUFFIXES: [&str; 2] = [".rst", ".md"];

/// Remove the first matching suffix from `name`.
///
/// Returns `name` unchanged if none of `suffixes` match. A name consisting
/// only of a suffix (e.g. `".md"`) is kept as is.
#[must_use]
pub fn strip_suffix<'a, S: AsRef<str>>(name: &'a str, suffixes: &[S]) -> &'a str {
    suffixes
        .iter()
        .filter_map(|suffix| name.strip_suffix(suffix.as_ref()))
        .find(|stem| !stem.is_empty())
        .unwrap_or(name)
}

/// Whether `name` ends with one of the [`DOCUMENT_SUFFIXES`].
#[must_use]
pub fn has_document_suffix(name: &str) -> bool {
    DOCUMENT_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
}
