//! Filesystem side of etoc.
//!
//! - [`assess_folder`]: documents and subfolders of a single folder
//! - [`create_site_map_from_path`]: site map from a folder tree
//! - [`create_site_from_toc`] / [`materialize`]: project skeleton from a site map
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), etoc_fs::SiteError> {
//! use std::path::Path;
//! use etoc_fs::{ScanOptions, create_site_map_from_path};
//! use etoc_site::FileFormat;
//!
//! let site_map = create_site_map_from_path(
//!     Path::new("docs"),
//!     &ScanOptions::default(),
//!     FileFormat::Default,
//! )?;
//! println!("{} documents", site_map.len());
//! # Ok(())
//! # }
//! ```

mod assess;
mod builder;
mod error;
mod materialize;

pub use assess::{FolderAssessment, ScanOptions, assess_folder};
pub use builder::create_site_map_from_path;
pub use error::{SiteError, SiteErrorKind};
pub use materialize::{
    MaterializeOptions, SourceSuffix, create_site_from_toc, default_affinity, materialize,
};
