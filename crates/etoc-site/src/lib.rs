//! Site map model and ToC schema for external tables of contents.
//!
//! This crate provides:
//! - [`SiteMap`]: documents of a project, their toctrees, and metadata
//! - [`parse_toc_data`] / [`create_toc_dict`]: conversion from and to the ToC schema
//! - [`migrate_jupyter_book`]: migration of Jupyter Book v0.10 ToC files
//! - [`natural_sort`]: ordering of file names with embedded numbers
//!
//! # Quick Start
//!
//! ```
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use etoc_site::{dump_yaml, parse_toc_data};
//!
//! let data = serde_yaml::from_str("root: intro\nentries:\n- file: a\n")?;
//! let site_map = parse_toc_data(&data)?;
//! assert_eq!(site_map.docnames().collect::<Vec<_>>(), ["intro", "a"]);
//!
//! let text = dump_yaml(&site_map)?;
//! assert!(text.starts_with("root: intro"));
//! # Ok(())
//! # }
//! ```

mod document;
mod dump;
mod error;
mod migrate;
mod natsort;
mod parse;
mod site_map;
mod suffix;
mod yaml;

pub use document::{
    Document, FileItem, GlobItem, Numbered, TocItem, TocTree, TocTreeOptions, UrlItem,
};
pub use dump::create_toc_dict;
pub use error::SchemaError;
pub use migrate::{Migrated, migrate_jupyter_book, migrate_path};
pub use natsort::{NaturalKey, natural_sort};
pub use parse::parse_toc_data;
pub use site_map::{FileFormat, ITEMS_KEY, SUBTREES_KEY, SiteMap};
pub use suffix::{DOCUMENT_SUFFIXES, has_document_suffix, strip_suffix};
pub use yaml::{dump_mapping, dump_yaml, load_yaml, parse_toc_yaml};
