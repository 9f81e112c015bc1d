//! Folder assessment: which documents and subfolders a directory holds.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use etoc_site::{DOCUMENT_SUFFIXES, natural_sort, strip_suffix};
use glob::Pattern;

use crate::error::SiteError;

/// Rules for recognizing documents while scanning folders.
#[derive(Clone, Debug)]
pub struct ScanOptions {
    suffixes: Vec<String>,
    default_index: String,
    ignore_matches: Vec<Pattern>,
}

impl ScanOptions {
    /// Create scan options.
    ///
    /// `ignore_matches` are shell-style glob patterns matched against entry names.
    ///
    /// # Errors
    ///
    /// Returns [`SiteError::Config`] if a pattern is not a valid glob.
    pub fn new<S: AsRef<str>>(
        suffixes: Vec<String>,
        default_index: impl Into<String>,
        ignore_matches: &[S],
    ) -> Result<Self, SiteError> {
        let ignore_matches = ignore_matches
            .iter()
            .map(|pattern| {
                Pattern::new(pattern.as_ref()).map_err(|e| {
                    SiteError::Config(format!("invalid ignore pattern '{}': {e}", pattern.as_ref()))
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            suffixes,
            default_index: default_index.into(),
            ignore_matches,
        })
    }

    /// File suffixes considered as documents.
    #[must_use]
    pub fn suffixes(&self) -> &[String] {
        &self.suffixes
    }

    /// File stem preferred as a folder's index.
    #[must_use]
    pub fn default_index(&self) -> &str {
        &self.default_index
    }

    fn is_ignored(&self, name: &str) -> bool {
        self.ignore_matches.iter().any(|pattern| pattern.matches(name))
    }

    fn is_document(&self, name: &str) -> bool {
        self.suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
    }
}

impl Default for ScanOptions {
    /// `.rst`/`.md` documents, `index` stems, hidden entries ignored.
    fn default() -> Self {
        Self {
            suffixes: DOCUMENT_SUFFIXES.iter().map(|&s| s.to_owned()).collect(),
            default_index: "index".to_owned(),
            ignore_matches: Pattern::new(".*").into_iter().collect(),
        }
    }
}

/// Documents and subfolders of one folder, in natural order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FolderAssessment {
    /// Stem of the index document, if the folder holds any document.
    pub index: Option<String>,
    /// Stems of the other documents.
    pub files: Vec<String>,
    /// Names of subfolders.
    pub folders: Vec<String>,
}

/// Assess a folder for ToC items.
///
/// Document stems are deduplicated (`doc.rst` and `doc.md` count once) and,
/// like subfolder names, returned in natural order. The index is the default
/// index stem if present, otherwise the first stem.
///
/// # Errors
///
/// Returns [`SiteError::NotADirectory`] if `folder` is not a directory, or
/// [`SiteError::Io`] if it cannot be listed.
pub fn assess_folder(folder: &Path, options: &ScanOptions) -> Result<FolderAssessment, SiteError> {
    if !folder.is_dir() {
        return Err(SiteError::NotADirectory(folder.to_path_buf()));
    }

    let mut stems = BTreeSet::new();
    let mut folders = Vec::new();
    for entry in fs::read_dir(folder).map_err(|e| SiteError::io(folder, e))? {
        let entry = entry.map_err(|e| SiteError::io(folder, e))?;
        let Ok(name) = entry.file_name().into_string() else {
            tracing::warn!(path = %entry.path().display(), "Skipping non UTF-8 file name");
            continue;
        };
        if options.is_ignored(&name) {
            continue;
        }
        let path = entry.path();
        if path.is_dir() {
            folders.push(name);
        } else if path.is_file() && options.is_document(&name) {
            stems.insert(strip_suffix(&name, &options.suffixes).to_owned());
        }
    }

    // Natural sort is stable; ties keep byte order, not `read_dir` order.
    folders.sort_unstable();
    let mut files = natural_sort(stems);
    let folders = natural_sort(folders);
    let index = if files.is_empty() {
        None
    } else {
        let position = files
            .iter()
            .position(|stem| *stem == options.default_index)
            .unwrap_or(0);
        Some(files.remove(position))
    };

    tracing::debug!(
        folder = %folder.display(),
        index = index.as_deref().unwrap_or(""),
        files = files.len(),
        folders = folders.len(),
        "Assessed folder"
    );
    Ok(FolderAssessment {
        index,
        files,
        folders,
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn touch(dir: &Path, name: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    fn strings(names: &[&str]) -> Vec<String> {
        names.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn test_index_and_files() {
        let dir = TempDir::new().unwrap();
        for name in ["b.rst", "index.rst", "a.md"] {
            touch(dir.path(), name);
        }

        let result = assess_folder(dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(
            result,
            FolderAssessment {
                index: Some("index".to_owned()),
                files: strings(&["a", "b"]),
                folders: vec![],
            }
        );
    }

    #[test]
    fn test_first_file_is_index_without_default() {
        let dir = TempDir::new().unwrap();
        for name in ["10_end.md", "2_middle.md", "1_start.md"] {
            touch(dir.path(), name);
        }

        let result = assess_folder(dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(result.index.as_deref(), Some("1_start"));
        assert_eq!(result.files, strings(&["2_middle", "10_end"]));
    }

    #[test]
    fn test_duplicate_stems_count_once() {
        let dir = TempDir::new().unwrap();
        for name in ["index.rst", "doc.rst", "doc.md"] {
            touch(dir.path(), name);
        }

        let result = assess_folder(dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(result.files, strings(&["doc"]));
    }

    #[test]
    fn test_filters_suffixes_and_ignored() {
        let dir = TempDir::new().unwrap();
        for name in [
            "index.md",
            "notes.txt",
            ".hidden.md",
            "draft.md",
            ".git/config",
            "sub10/x.md",
            "sub2/y.md",
            "_build/z.md",
        ] {
            touch(dir.path(), name);
        }
        let options = ScanOptions::new(strings(&[".md"]), "index", &[".*", "_*", "draft*"]).unwrap();

        let result = assess_folder(dir.path(), &options).unwrap();

        assert_eq!(result.index.as_deref(), Some("index"));
        assert!(result.files.is_empty());
        assert_eq!(result.folders, strings(&["sub2", "sub10"]));
    }

    #[test]
    fn test_folders_without_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b/index.md");
        touch(dir.path(), "a/index.md");

        let result = assess_folder(dir.path(), &ScanOptions::default()).unwrap();

        assert_eq!(result.index, None);
        assert!(result.files.is_empty());
        assert_eq!(result.folders, strings(&["a", "b"]));
    }

    #[test]
    fn test_equal_natural_keys_have_fixed_order() {
        let dir = TempDir::new().unwrap();
        for name in ["index.md", "b.md", "B.md", "x7.md", "x007.md", "d7/index.md", "d007/index.md"] {
            touch(dir.path(), name);
        }

        for _ in 0..16 {
            let result = assess_folder(dir.path(), &ScanOptions::default()).unwrap();
            assert_eq!(result.files, strings(&["B", "b", "x007", "x7"]));
            assert_eq!(result.folders, strings(&["d007", "d7"]));
        }
    }

    #[test]
    fn test_index_pick_is_fixed_on_ties() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "intro.rst");
        touch(dir.path(), "Intro.md");

        for _ in 0..16 {
            let result = assess_folder(dir.path(), &ScanOptions::default()).unwrap();
            assert_eq!(result.index.as_deref(), Some("Intro"));
            assert_eq!(result.files, strings(&["intro"]));
        }
    }

    #[test]
    fn test_not_a_directory() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "file.md");

        let err = assess_folder(&dir.path().join("file.md"), &ScanOptions::default()).unwrap_err();

        assert!(matches!(err, SiteError::NotADirectory(_)));
        assert!(err.to_string().starts_with("path must be a directory: "));
    }

    #[test]
    fn test_invalid_ignore_pattern() {
        let err = ScanOptions::new(strings(&[".md"]), "index", &["[unclosed"]).unwrap_err();
        assert!(matches!(err, SiteError::Config(_)));
    }
}
