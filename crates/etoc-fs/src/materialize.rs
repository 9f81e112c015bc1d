//! Writing a project skeleton from a site map.
//!
//! Each document gets a file holding a generated heading plus any text
//! registered for it under `meta.create_append`. Extra files listed in
//! `meta.create_files` are created the same way.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use etoc_site::{SchemaError, SiteMap, has_document_suffix, parse_toc_yaml};
use serde_yaml::{Mapping, Value};

use crate::error::SiteError;

const CREATE_FILES_KEY: &str = "create_files";
const CREATE_APPEND_KEY: &str = "create_append";

/// Extension given to created documents that have none.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SourceSuffix {
    /// reStructuredText.
    #[default]
    Rst,
    /// Markdown.
    Md,
}

impl SourceSuffix {
    /// Suffix with leading dot.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rst => ".rst",
            Self::Md => ".md",
        }
    }
}

impl fmt::Display for SourceSuffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceSuffix {
    type Err = SiteError;

    /// Accepts `rst`, `.rst`, `md` and `.md`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('.').unwrap_or(s) {
            "rst" => Ok(Self::Rst),
            "md" => Ok(Self::Md),
            _ => Err(SiteError::Config(format!(
                "default extension must be one of '.rst', '.md', got '{s}'"
            ))),
        }
    }
}

/// Options for [`materialize`].
#[derive(Clone, Debug)]
pub struct MaterializeOptions {
    /// Extension for documents without one, unless `create_files` favours the other.
    pub default_ext: SourceSuffix,
    /// Output encoding; only UTF-8 is supported.
    pub encoding: String,
    /// Replace existing files instead of failing.
    pub overwrite: bool,
    /// File name under the root to copy the ToC file to, if it does not exist.
    pub toc_copy_name: Option<String>,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            default_ext: SourceSuffix::Rst,
            encoding: "utf8".to_owned(),
            overwrite: false,
            toc_copy_name: Some("_toc.yml".to_owned()),
        }
    }
}

/// Extension most used among `create_files`, or `default_ext` on a tie.
///
/// One `.rst` entry is discounted since a root `index.rst` is usually listed.
#[must_use]
pub fn default_affinity<S: AsRef<str>>(
    additional_files: &[S],
    default_ext: SourceSuffix,
) -> SourceSuffix {
    let count = |ext: &str| {
        additional_files
            .iter()
            .filter(|name| Path::new(name.as_ref()).extension().is_some_and(|e| e == ext))
            .count()
    };
    let md_count = count("md");
    let rst_count = count("rst").saturating_sub(1);

    if md_count > rst_count {
        SourceSuffix::Md
    } else if rst_count > md_count {
        SourceSuffix::Rst
    } else {
        default_ext
    }
}

/// Parse the ToC file at `toc_path` and create its documents.
///
/// `root_path` defaults to the ToC file's directory and is created if needed.
/// The ToC file itself is the source for `toc_copy_name`.
///
/// # Errors
///
/// See [`materialize`]; also fails if the ToC file cannot be loaded or parsed.
pub fn create_site_from_toc(
    toc_path: &Path,
    root_path: Option<&Path>,
    options: &MaterializeOptions,
) -> Result<SiteMap, SiteError> {
    let site_map = parse_toc_yaml(toc_path)?;

    let root_path = match root_path {
        Some(path) => path,
        None => toc_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new(".")),
    };
    fs::create_dir_all(root_path).map_err(|e| SiteError::io(root_path, e))?;

    materialize(&site_map, root_path, options, Some(toc_path))?;
    Ok(site_map)
}

/// Create a file for every document of `site_map` and every `create_files` entry.
///
/// Metadata types, the encoding, and references between documents are all
/// checked before anything is written. A conflict with an existing file
/// stops the run; files written before it are left in place. On success the
/// same `site_map` is handed back.
///
/// # Errors
///
/// - [`SiteError::Config`] for an unsupported encoding or mistyped metadata
/// - [`SiteError::Schema`] if an entry names a document missing from the site map
/// - [`SiteError::AlreadyExists`] if a target exists and `overwrite` is off
/// - [`SiteError::Io`] if a directory or file cannot be written
pub fn materialize<'a>(
    site_map: &'a SiteMap,
    root_path: &Path,
    options: &MaterializeOptions,
    toc_source: Option<&Path>,
) -> Result<&'a SiteMap, SiteError> {
    check_encoding(&options.encoding)?;
    let additional_files = create_files(site_map.meta())?;
    let append_text = create_append(site_map.meta())?;
    if let Some(docname) = site_map.dangling_references().first() {
        return Err(SchemaError::DanglingReference((*docname).to_owned()).into());
    }

    let affinity = default_affinity(additional_files.as_slice(), options.default_ext);

    if let (Some(source), Some(name)) = (toc_source, options.toc_copy_name.as_deref()) {
        let target = root_path.join(name);
        if !name.is_empty() && !target.exists() {
            fs::copy(source, &target).map_err(|e| SiteError::io(&target, e))?;
            tracing::debug!(path = %target.display(), "Copied ToC file");
        }
    }

    let docnames = site_map.docnames().chain(additional_files.iter().copied());
    let mut written = 0_usize;
    for docname in docnames {
        let mut filename = docname.to_owned();
        if !has_document_suffix(docname) {
            filename.push_str(affinity.as_str());
        }

        let path = root_path.join(&filename);
        if path.exists() && !options.overwrite {
            return Err(SiteError::AlreadyExists(path));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SiteError::io(parent, e))?;
        }

        let content = document_content(&filename, append_text.get(docname).copied());
        fs::write(&path, content).map_err(|e| SiteError::io(&path, e))?;
        tracing::debug!(path = %path.display(), "Wrote document");
        written += 1;
    }

    tracing::info!(root = %root_path.display(), files = written, "Created project");
    Ok(site_map)
}

fn check_encoding(encoding: &str) -> Result<(), SiteError> {
    if encoding.eq_ignore_ascii_case("utf8") || encoding.eq_ignore_ascii_case("utf-8") {
        Ok(())
    } else {
        Err(SiteError::Config(format!(
            "unsupported encoding '{encoding}': only UTF-8 is supported"
        )))
    }
}

fn create_files(meta: &Mapping) -> Result<Vec<&str>, SiteError> {
    let Some(value) = meta.get(CREATE_FILES_KEY) else {
        return Ok(Vec::new());
    };
    let Value::Sequence(items) = value else {
        return Err(SiteError::Config("'create_files' should be a list".to_owned()));
    };
    items
        .iter()
        .map(|item| {
            item.as_str().ok_or_else(|| {
                SiteError::Config("'create_files' should be a list of strings".to_owned())
            })
        })
        .collect()
}

fn create_append(meta: &Mapping) -> Result<HashMap<&str, &str>, SiteError> {
    let Some(value) = meta.get(CREATE_APPEND_KEY) else {
        return Ok(HashMap::new());
    };
    let Value::Mapping(entries) = value else {
        return Err(SiteError::Config("'create_append' should be a mapping".to_owned()));
    };
    entries
        .iter()
        .map(|(key, text)| match (key.as_str(), text.as_str()) {
            (Some(docname), Some(text)) => Ok((docname, text)),
            _ => Err(SiteError::Config(
                "'create_append' should map document names to text".to_owned(),
            )),
        })
        .collect()
}

/// Heading for `filename` followed by the lines of `append`.
fn document_content(filename: &str, append: Option<&str>) -> String {
    let heading = format!("Heading: {filename}");
    let mut lines = if filename.ends_with(".rst") {
        let underline = "=".repeat(heading.chars().count());
        vec![heading, underline, String::new()]
    } else if filename.ends_with(".md") {
        vec![format!("# {heading}"), String::new()]
    } else {
        Vec::new()
    };

    let extra: Vec<String> = append
        .map(|text| text.lines().map(str::to_owned).collect())
        .unwrap_or_default();
    if !extra.is_empty() {
        lines.extend(extra);
        lines.push(String::new());
    }
    lines.join("\n")
}
