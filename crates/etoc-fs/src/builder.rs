//! Site map construction from a folder tree.
//!
//! Every folder with an index document becomes a [`Document`] whose single
//! toctree lists the folder's other documents followed by the index documents
//! of its indexed subfolders. Folders are visited breadth-first.

use std::collections::VecDeque;
use std::path::Path;

use etoc_site::{Document, FileFormat, FileItem, SchemaError, SiteMap, TocItem, TocTree};

use crate::assess::{FolderAssessment, ScanOptions, assess_folder};
use crate::error::SiteError;

/// Indexed folder waiting to be turned into a document.
struct PendingFolder {
    /// POSIX path relative to the root, empty for the root itself.
    prefix: String,
    index: String,
    assessment: FolderAssessment,
}

impl PendingFolder {
    fn docname(&self, name: &str) -> String {
        join_docname(&self.prefix, name)
    }
}

fn join_docname(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_owned()
    } else {
        format!("{prefix}/{name}")
    }
}

/// Create a site map from the folder tree at `root_path`.
///
/// Docnames are POSIX paths relative to `root_path`, without suffix. Every
/// document is registered, including leaves without toctrees, so titles can
/// be assigned later. Subfolders without an index document are skipped along
/// with everything beneath them.
///
/// # Errors
///
/// Returns [`SiteError::NoRootIndex`] if `root_path` holds no document,
/// [`SiteError::NotADirectory`] if it is not a directory, and
/// [`SiteError::DuplicateDocname`] if two paths map to the same docname.
pub fn create_site_map_from_path(
    root_path: &Path,
    options: &ScanOptions,
    file_format: FileFormat,
) -> Result<SiteMap, SiteError> {
    let assessment = assess_folder(root_path, options)?;
    let Some(index) = assessment.index.clone() else {
        return Err(SiteError::NoRootIndex(root_path.to_path_buf()));
    };
    let root = PendingFolder {
        prefix: String::new(),
        index,
        assessment,
    };

    let (root_document, mut pending) = document_from_folder(root_path, &root, options)?;
    let mut site_map = SiteMap::new(root_document).with_file_format(file_format);
    register_files(&mut site_map, &root)?;

    while let Some(folder) = pending.pop_front() {
        register_files(&mut site_map, &folder)?;
        let (document, indexed) = document_from_folder(root_path, &folder, options)?;
        insert(&mut site_map, document)?;
        pending.extend(indexed);
    }

    tracing::info!(
        root = %root_path.display(),
        documents = site_map.len(),
        "Built site map from folder"
    );
    Ok(site_map)
}

/// Register the non-index documents of a folder as leaves.
fn register_files(site_map: &mut SiteMap, folder: &PendingFolder) -> Result<(), SiteError> {
    for name in &folder.assessment.files {
        insert(site_map, Document::from_stem(&folder.docname(name)))?;
    }
    Ok(())
}

fn insert(site_map: &mut SiteMap, document: Document) -> Result<(), SiteError> {
    site_map.insert(document).map_err(|e| match e {
        SchemaError::DuplicateDocname(docname) => SiteError::DuplicateDocname(docname),
        other => SiteError::Schema(other),
    })
}

/// Build the document of an indexed folder and assess its subfolders.
///
/// Returns the document and the subfolders that have an index, in order.
fn document_from_folder(
    root_path: &Path,
    folder: &PendingFolder,
    options: &ScanOptions,
) -> Result<(Document, VecDeque<PendingFolder>), SiteError> {
    let mut items: Vec<TocItem> = folder
        .assessment
        .files
        .iter()
        .map(|name| FileItem::from_stem(&folder.docname(name)).into())
        .collect();

    let mut indexed = VecDeque::new();
    for name in &folder.assessment.folders {
        let prefix = join_docname(&folder.prefix, name);
        let assessment = assess_folder(&root_path.join(&prefix), options)?;
        let Some(index) = assessment.index.clone() else {
            tracing::debug!(folder = %prefix, "Skipping subfolder without index");
            continue;
        };
        let child = PendingFolder {
            prefix,
            index,
            assessment,
        };
        items.push(FileItem::from_stem(&child.docname(&child.index)).into());
        indexed.push_back(child);
    }

    let mut document = Document::from_stem(&folder.docname(&folder.index));
    if !items.is_empty() {
        document = document.with_subtrees(vec![TocTree::new(items)]);
    }
    Ok((document, indexed))
}
