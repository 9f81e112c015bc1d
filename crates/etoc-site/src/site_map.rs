//! Site map aggregate and file formats.
//!
//! Documents are stored in a flat `Vec<Document>` in insertion order, which
//! reflects build or parse traversal order. A `HashMap` index gives O(1)
//! docname lookups.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde_yaml::{Mapping, Value};

use crate::document::Document;
use crate::error::SchemaError;

/// Normalized key holding a document's list of toctrees.
pub const SUBTREES_KEY: &str = "subtrees";
/// Normalized key holding a toctree's entries.
pub const ITEMS_KEY: &str = "entries";

/// Key-name convention used when reading and writing a ToC mapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// `subtrees` / `entries` at every depth.
    #[default]
    Default,
    /// Jupyter Book style: `parts` / `chapters` at the top, `sections` below.
    Book,
    /// Jupyter Book article style: `sections` at every depth.
    Article,
}

impl FileFormat {
    /// All formats, in the order offered to users.
    pub const ALL: [Self; 3] = [Self::Default, Self::Book, Self::Article];

    /// Name used in the `format` key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Book => "jb-book",
            Self::Article => "jb-article",
        }
    }

    /// Key for the list of toctrees of a document at `depth`.
    #[must_use]
    pub fn subtrees_key(self, depth: usize) -> &'static str {
        match (self, depth) {
            (Self::Book, 0) => "parts",
            _ => SUBTREES_KEY,
        }
    }

    /// Key for the entries of a toctree at `depth`.
    #[must_use]
    pub fn items_key(self, depth: usize) -> &'static str {
        match (self, depth) {
            (Self::Default, _) => ITEMS_KEY,
            (Self::Book, 0) => "chapters",
            (Self::Book | Self::Article, _) => "sections",
        }
    }

    /// Toctree option defaults implied by the format.
    #[must_use]
    pub fn toc_defaults(self) -> Mapping {
        let mut defaults = Mapping::new();
        if self != Self::Default {
            defaults.insert(Value::from("titlesonly"), Value::Bool(true));
        }
        defaults
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == s)
            .ok_or_else(|| SchemaError::UnknownFormat(s.to_owned()))
    }
}

/// Documents of a project keyed by docname, plus the root and metadata.
///
/// The root document is always present and always first in iteration order.
#[derive(Clone, Debug, PartialEq)]
pub struct SiteMap {
    documents: Vec<Document>,
    index: HashMap<String, usize>,
    meta: Mapping,
    /// Key-name convention for serialization.
    pub file_format: FileFormat,
}

impl SiteMap {
    /// Create a site map holding only `root`.
    #[must_use]
    pub fn new(root: Document) -> Self {
        let index = HashMap::from([(root.docname().to_owned(), 0)]);
        Self {
            documents: vec![root],
            index,
            meta: Mapping::new(),
            file_format: FileFormat::Default,
        }
    }

    /// Set the metadata mapping.
    #[must_use]
    pub fn with_meta(mut self, meta: Mapping) -> Self {
        self.meta = meta;
        self
    }

    /// Set the file format.
    #[must_use]
    pub fn with_file_format(mut self, file_format: FileFormat) -> Self {
        self.file_format = file_format;
        self
    }

    /// The root document.
    #[must_use]
    pub fn root(&self) -> &Document {
        // Root is inserted by `new` and documents are never removed
        &self.documents[0]
    }

    /// Docname of the root document.
    #[must_use]
    pub fn root_docname(&self) -> &str {
        self.root().docname()
    }

    /// Get a document by docname.
    #[must_use]
    pub fn get(&self, docname: &str) -> Option<&Document> {
        self.index.get(docname).map(|&i| &self.documents[i])
    }

    /// Get a document by docname for in-place edits (e.g. titles).
    pub fn get_mut(&mut self, docname: &str) -> Option<&mut Document> {
        self.index.get(docname).map(|&i| &mut self.documents[i])
    }

    /// Whether a document with `docname` is registered.
    #[must_use]
    pub fn contains(&self, docname: &str) -> bool {
        self.index.contains_key(docname)
    }

    /// Register a document.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateDocname`] if the docname is already
    /// registered; the existing document is left untouched.
    pub fn insert(&mut self, document: Document) -> Result<(), SchemaError> {
        if self.index.contains_key(document.docname()) {
            return Err(SchemaError::DuplicateDocname(document.docname().to_owned()));
        }
        self.index
            .insert(document.docname().to_owned(), self.documents.len());
        self.documents.push(document);
        Ok(())
    }

    /// Number of documents, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always `false`: a site map holds at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Docnames in insertion order.
    pub fn docnames(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(Document::docname)
    }

    /// Documents in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }

    /// Metadata mapping (e.g. `create_files`, `create_append`).
    #[must_use]
    pub fn meta(&self) -> &Mapping {
        &self.meta
    }

    /// Mutable metadata mapping.
    pub fn meta_mut(&mut self) -> &mut Mapping {
        &mut self.meta
    }

    /// Docnames referenced by a `FileItem` but not registered, in order.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<&str> {
        self.documents
            .iter()
            .flat_map(Document::child_files)
            .filter(|docname| !self.contains(docname))
            .collect()
    }
}

impl<'a> IntoIterator for &'a SiteMap {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
