//! Documents, toctrees and their entries.
//!
//! A [`Document`] owns an ordered list of [`TocTree`]s. Entries that point at
//! other documents are [`FileItem`]s: name-based links resolved through the
//! owning [`SiteMap`](crate::SiteMap), never owning references.

use crate::suffix::{DOCUMENT_SUFFIXES, strip_suffix};

/// Normalize a docname: POSIX separators, no document suffix.
fn normalize_docname(docname: &str) -> String {
    let posix = docname.replace('\\', "/");
    strip_suffix(&posix, &DOCUMENT_SUFFIXES).to_owned()
}

/// A document in the site map, keyed by its docname.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    docname: String,
    /// Optional display title.
    pub title: Option<String>,
    /// Toctrees declared by this document, in order.
    pub subtrees: Vec<TocTree>,
}

impl Document {
    /// Create a document without title or subtrees.
    ///
    /// A trailing `.rst`/`.md` suffix is removed from `docname`.
    #[must_use]
    pub fn new(docname: &str) -> Self {
        Self {
            docname: normalize_docname(docname),
            title: None,
            subtrees: Vec::new(),
        }
    }

    /// Create a document from a docname that already has its suffix removed.
    ///
    /// Only separators are normalized, so `notes.md` stays `notes.md`.
    #[must_use]
    pub fn from_stem(docname: &str) -> Self {
        Self {
            docname: docname.replace('\\', "/"),
            title: None,
            subtrees: Vec::new(),
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the subtrees.
    #[must_use]
    pub fn with_subtrees(mut self, subtrees: Vec<TocTree>) -> Self {
        self.subtrees = subtrees;
        self
    }

    /// Unique docname (POSIX relative path without suffix).
    #[must_use]
    pub fn docname(&self) -> &str {
        &self.docname
    }

    /// Docnames referenced by [`FileItem`] entries, in declaration order.
    pub fn child_files(&self) -> impl Iterator<Item = &str> {
        self.subtrees
            .iter()
            .flat_map(|tree| tree.items.iter())
            .filter_map(|item| match item {
                TocItem::File(file) => Some(file.docname()),
                TocItem::Glob(_) | TocItem::Url(_) => None,
            })
    }
}

/// Reference to another document by docname.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FileItem(String);

impl FileItem {
    /// Create a reference; a trailing document suffix is removed.
    #[must_use]
    pub fn new(docname: &str) -> Self {
        Self(normalize_docname(docname))
    }

    /// Create a reference from an already stripped docname.
    #[must_use]
    pub fn from_stem(docname: &str) -> Self {
        Self(docname.replace('\\', "/"))
    }

    /// Referenced docname.
    #[must_use]
    pub fn docname(&self) -> &str {
        &self.0
    }
}

/// Glob pattern matching several documents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobItem(pub String);

/// External link with optional title.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlItem {
    /// Link target, including the scheme.
    pub url: String,
    /// Link text.
    pub title: Option<String>,
}

/// Entry of a toctree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TocItem {
    /// Another document of the site map.
    File(FileItem),
    /// Documents matching a glob.
    Glob(GlobItem),
    /// External URL.
    Url(UrlItem),
}

impl From<FileItem> for TocItem {
    fn from(item: FileItem) -> Self {
        Self::File(item)
    }
}

/// Value of the `numbered` toctree option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Numbered {
    /// Numbering on or off.
    Flag(bool),
    /// Numbering limited to a depth.
    Depth(u64),
}

impl Default for Numbered {
    fn default() -> Self {
        Self::Flag(false)
    }
}

/// Options of a toctree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocTreeOptions {
    /// Caption shown above the toctree.
    pub caption: Option<String>,
    /// Whether the toctree is hidden in the page body.
    pub hidden: bool,
    /// Maximum depth; `-1` for unlimited.
    pub maxdepth: i64,
    /// Section numbering.
    pub numbered: Numbered,
    /// Reverse the entry order.
    pub reversed: bool,
    /// Only show document titles.
    pub titlesonly: bool,
}

impl Default for TocTreeOptions {
    fn default() -> Self {
        Self {
            caption: None,
            hidden: true,
            maxdepth: -1,
            numbered: Numbered::default(),
            reversed: false,
            titlesonly: false,
        }
    }
}

/// Ordered entries plus options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TocTree {
    /// Entries in order.
    pub items: Vec<TocItem>,
    /// Toctree options.
    pub options: TocTreeOptions,
}

impl TocTree {
    /// Create a toctree with default options.
    #[must_use]
    pub fn new(items: Vec<TocItem>) -> Self {
        Self {
            items,
            options: TocTreeOptions::default(),
        }
    }
}
