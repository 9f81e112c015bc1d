//! YAML load and dump for ToC files.

use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::dump::create_toc_dict;
use crate::error::SchemaError;
use crate::parse::parse_toc_data;
use crate::site_map::SiteMap;

/// Read a YAML file into a raw value.
///
/// # Errors
///
/// Returns [`SchemaError::Io`] if the file cannot be read and
/// [`SchemaError::Yaml`] if it is not valid YAML.
pub fn load_yaml(path: &Path) -> Result<Value, SchemaError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Read and parse a ToC file.
pub fn parse_toc_yaml(path: &Path) -> Result<SiteMap, SchemaError> {
    let data = load_yaml(path)?;
    parse_toc_data(&data)
}

/// Serialize a site map to YAML text, skipping default toctree options.
pub fn dump_yaml(site_map: &SiteMap) -> Result<String, SchemaError> {
    dump_mapping(&create_toc_dict(site_map, true)?)
}

/// Serialize a raw ToC mapping to YAML text.
pub fn dump_mapping(data: &Mapping) -> Result<String, SchemaError> {
    Ok(serde_yaml::to_string(data)?)
}
