//! Parsing of the current ToC schema into a [`SiteMap`].
//!
//! Nested documents are processed with an explicit stack of pending mappings
//! so documents land in the site map in depth-first pre-order: a document is
//! registered before any of its own children, and all of a document's
//! descendants before its next sibling.

use serde_yaml::{Mapping, Value};

use crate::document::{
    Document, FileItem, GlobItem, Numbered, TocItem, TocTree, TocTreeOptions, UrlItem,
};
use crate::error::SchemaError;
use crate::site_map::{FileFormat, ITEMS_KEY, SUBTREES_KEY, SiteMap};

pub(crate) const ROOT_KEY: &str = "root";
pub(crate) const FILE_KEY: &str = "file";
pub(crate) const GLOB_KEY: &str = "glob";
pub(crate) const URL_KEY: &str = "url";
pub(crate) const TITLE_KEY: &str = "title";
pub(crate) const OPTIONS_KEY: &str = "options";
pub(crate) const FORMAT_KEY: &str = "format";
pub(crate) const DEFAULTS_KEY: &str = "defaults";
pub(crate) const META_KEY: &str = "meta";

/// Keys only valid on the top-level mapping.
const TOP_LEVEL_KEYS: [&str; 3] = [FORMAT_KEY, DEFAULTS_KEY, META_KEY];

/// Toctree option keys, in serialization order.
pub(crate) const TOCTREE_OPTIONS: [&str; 6] = [
    "caption",
    "hidden",
    "maxdepth",
    "numbered",
    "reversed",
    "titlesonly",
];

/// Parse a current-schema ToC mapping into a [`SiteMap`].
///
/// # Errors
///
/// Returns [`SchemaError`] naming the violated rule and its location if the
/// mapping does not follow the schema, or if a docname appears twice.
pub fn parse_toc_data(data: &Value) -> Result<SiteMap, SchemaError> {
    let Value::Mapping(data) = data else {
        return Err(SchemaError::malformed("toc is not a mapping", "/"));
    };

    let file_format = match data.get(FORMAT_KEY) {
        None => FileFormat::Default,
        Some(Value::String(name)) => name.parse()?,
        Some(_) => return Err(SchemaError::malformed("'format' is not a string", "/")),
    };

    let mut defaults = file_format.toc_defaults();
    match data.get(DEFAULTS_KEY) {
        None | Some(Value::Null) => {}
        Some(Value::Mapping(overrides)) => {
            check_keys(overrides, &TOCTREE_OPTIONS, "/defaults/")?;
            for (key, value) in overrides {
                defaults.insert(key.clone(), value.clone());
            }
        }
        Some(_) => return Err(SchemaError::malformed("'defaults' is not a mapping", "/")),
    }

    let meta = match data.get(META_KEY) {
        None | Some(Value::Null) => Mapping::new(),
        Some(Value::Mapping(meta)) => meta.clone(),
        Some(_) => return Err(SchemaError::malformed("'meta' is not a mapping", "/")),
    };

    let parser = TocParser {
        file_format,
        defaults,
    };

    let (root, children) = parser.parse_document(data, "/", 0, true)?;
    let mut site_map = SiteMap::new(root)
        .with_meta(meta)
        .with_file_format(file_format);

    let mut pending: Vec<PendingDoc<'_>> = children.into_iter().rev().collect();
    while let Some(doc) = pending.pop() {
        let (document, children) = parser.parse_document(doc.data, &doc.path, doc.depth, false)?;
        site_map.insert(document)?;
        pending.extend(children.into_iter().rev());
    }

    tracing::debug!(
        document_count = site_map.len(),
        format = %file_format,
        "Parsed ToC"
    );
    Ok(site_map)
}

/// A nested document mapping waiting to be parsed.
struct PendingDoc<'a> {
    data: &'a Mapping,
    path: String,
    depth: usize,
}

/// Where a toctree's entries and options come from.
struct TocSource<'a> {
    items_key: &'static str,
    items: &'a Value,
    options: Option<&'a Mapping>,
    path: String,
}

struct TocParser {
    file_format: FileFormat,
    defaults: Mapping,
}

impl TocParser {
    /// Accepted subtrees keys at `depth`: the format's own, then the normalized one.
    fn subtrees_keys(&self, depth: usize) -> Vec<&'static str> {
        key_candidates(self.file_format.subtrees_key(depth), SUBTREES_KEY)
    }

    /// Accepted items keys at `depth`: the format's own, then the normalized one.
    fn items_keys(&self, depth: usize) -> Vec<&'static str> {
        key_candidates(self.file_format.items_key(depth), ITEMS_KEY)
    }

    /// Parse one document mapping, returning the nested documents it declares.
    fn parse_document<'a>(
        &self,
        data: &'a Mapping,
        path: &str,
        depth: usize,
        is_root: bool,
    ) -> Result<(Document, Vec<PendingDoc<'a>>), SchemaError> {
        let file_key = if is_root { ROOT_KEY } else { FILE_KEY };
        let docname = match data.get(file_key) {
            None => {
                return Err(SchemaError::malformed(
                    format!("'{file_key}' key not found"),
                    path,
                ));
            }
            Some(value) => non_empty_str(value).ok_or_else(|| {
                SchemaError::malformed(format!("'{file_key}' must be a non-empty string"), path)
            })?,
        };

        let subtrees_keys = self.subtrees_keys(depth);
        let items_keys = self.items_keys(depth);

        let mut allowed = vec![file_key, TITLE_KEY, OPTIONS_KEY];
        allowed.extend(&subtrees_keys);
        allowed.extend(&items_keys);
        if is_root {
            allowed.extend(TOP_LEVEL_KEYS);
        }
        check_keys(data, &allowed, path)?;

        let title = optional_string(data, TITLE_KEY, path)?;
        let items_key = single_key(data, &items_keys, path)?;
        let subtrees_key = single_key(data, &subtrees_keys, path)?;

        let sources = match (subtrees_key, items_key) {
            (Some(subtrees_key), Some(items_key)) => {
                return Err(SchemaError::malformed(
                    format!("Both '{subtrees_key}' and '{items_key}' found"),
                    path,
                ));
            }
            // Shorthand for a single toctree, options given alongside
            (None, Some(items_key)) => {
                let options = match data.get(OPTIONS_KEY) {
                    None => None,
                    Some(Value::Mapping(options)) => {
                        check_keys(options, &TOCTREE_OPTIONS, &format!("{path}{OPTIONS_KEY}/"))?;
                        Some(options)
                    }
                    Some(_) => {
                        return Err(SchemaError::malformed("'options' is not a mapping", path));
                    }
                };
                vec![TocSource {
                    items_key,
                    items: &data[items_key],
                    options,
                    path: path.to_owned(),
                }]
            }
            (Some(subtrees_key), None) => {
                reject_options(data, path, items_keys[0])?;
                subtree_sources(&data[subtrees_key], subtrees_key, &items_keys, path)?
            }
            (None, None) => {
                reject_options(data, path, items_keys[0])?;
                Vec::new()
            }
        };

        let mut subtrees = Vec::with_capacity(sources.len());
        let mut children = Vec::new();
        for source in sources {
            let Some(items_data) = source.items.as_sequence().filter(|s| !s.is_empty()) else {
                return Err(SchemaError::malformed(
                    format!("'{}' not a non-empty list", source.items_key),
                    source.path,
                ));
            };

            let mut items = Vec::with_capacity(items_data.len());
            for (idx, item_data) in items_data.iter().enumerate() {
                let item_path = format!("{}{}/{idx}/", source.path, source.items_key);
                let (item, child) = parse_item(item_data, &item_path, depth)?;
                items.push(item);
                children.extend(child);
            }

            let options = self.parse_options(source.options, &source.path)?;
            subtrees.push(TocTree { items, options });
        }

        let mut document = Document::new(docname).with_subtrees(subtrees);
        document.title = title;
        Ok((document, children))
    }

    /// Resolve toctree options: explicit values first, then defaults.
    fn parse_options(
        &self,
        explicit: Option<&Mapping>,
        path: &str,
    ) -> Result<TocTreeOptions, SchemaError> {
        let mut options = TocTreeOptions::default();
        for key in TOCTREE_OPTIONS {
            let value = explicit
                .and_then(|m| m.get(key))
                .or_else(|| self.defaults.get(key));
            if let Some(value) = value {
                apply_option(&mut options, key, value, path)?;
            }
        }
        Ok(options)
    }
}

/// `options` is only meaningful with the single-toctree shorthand.
fn reject_options(data: &Mapping, path: &str, items_key: &str) -> Result<(), SchemaError> {
    if data.contains_key(OPTIONS_KEY) {
        return Err(SchemaError::malformed(
            format!("'options' requires '{items_key}'"),
            path,
        ));
    }
    Ok(())
}

/// Collect the toctree mappings listed under a subtrees key.
fn subtree_sources<'a>(
    value: &'a Value,
    subtrees_key: &str,
    items_keys: &[&'static str],
    path: &str,
) -> Result<Vec<TocSource<'a>>, SchemaError> {
    let Some(subtrees) = value.as_sequence().filter(|s| !s.is_empty()) else {
        return Err(SchemaError::malformed(
            format!("'{subtrees_key}' not a non-empty list"),
            path,
        ));
    };

    let mut allowed: Vec<&str> = items_keys.to_vec();
    allowed.extend(TOCTREE_OPTIONS);

    let mut sources = Vec::with_capacity(subtrees.len());
    for (idx, toc_data) in subtrees.iter().enumerate() {
        let toc_path = format!("{path}{subtrees_key}/{idx}/");
        let Some(toc) = toc_data.as_mapping() else {
            return Err(SchemaError::malformed("toctree is not a mapping", toc_path));
        };
        let Some(items_key) = single_key(toc, items_keys, &toc_path)? else {
            return Err(SchemaError::malformed(
                format!("toctree doesn't contain '{}'", items_keys[0]),
                toc_path,
            ));
        };
        check_keys(toc, &allowed, &toc_path)?;
        sources.push(TocSource {
            items_key,
            items: &toc[items_key],
            options: Some(toc),
            path: toc_path,
        });
    }
    Ok(sources)
}

/// Parse one toctree entry; `file` entries also yield the nested document.
fn parse_item<'a>(
    value: &'a Value,
    path: &str,
    depth: usize,
) -> Result<(TocItem, Option<PendingDoc<'a>>), SchemaError> {
    let Some(data) = value.as_mapping() else {
        return Err(SchemaError::malformed("entry not a mapping type", path));
    };

    let link_keys: Vec<&str> = [FILE_KEY, GLOB_KEY, URL_KEY]
        .into_iter()
        .filter(|key| data.contains_key(*key))
        .collect();

    match link_keys.as_slice() {
        [] => Err(SchemaError::malformed(
            "entry does not contain one of 'file', 'glob', 'url'",
            path,
        )),
        [FILE_KEY] => {
            let docname = non_empty_str(&data[FILE_KEY]).ok_or_else(|| {
                SchemaError::malformed("'file' must be a non-empty string", path)
            })?;
            let item = FileItem::new(docname);
            let child = PendingDoc {
                data,
                path: format!("{path}{}/", item.docname()),
                depth: depth + 1,
            };
            Ok((TocItem::File(item), Some(child)))
        }
        [GLOB_KEY] => {
            check_link_keys(data, GLOB_KEY, &[GLOB_KEY], path)?;
            let pattern = non_empty_str(&data[GLOB_KEY]).ok_or_else(|| {
                SchemaError::malformed("'glob' must be a non-empty string", path)
            })?;
            if let Err(e) = glob::Pattern::new(pattern) {
                return Err(SchemaError::malformed(
                    format!("invalid glob pattern '{pattern}': {e}"),
                    path,
                ));
            }
            Ok((TocItem::Glob(GlobItem(pattern.to_owned())), None))
        }
        [URL_KEY] => {
            check_link_keys(data, URL_KEY, &[URL_KEY, TITLE_KEY], path)?;
            let url = non_empty_str(&data[URL_KEY])
                .filter(|url| url.contains("://"))
                .ok_or_else(|| {
                    SchemaError::malformed("'url' must be an absolute URL", path)
                })?;
            let title = optional_string(data, TITLE_KEY, path)?;
            Ok((
                TocItem::Url(UrlItem {
                    url: url.to_owned(),
                    title,
                }),
                None,
            ))
        }
        keys => Err(SchemaError::malformed(
            format!("entry contains incompatible keys {keys:?}"),
            path,
        )),
    }
}

/// Set one toctree option from its raw value, checking its type.
fn apply_option(
    options: &mut TocTreeOptions,
    key: &str,
    value: &Value,
    path: &str,
) -> Result<(), SchemaError> {
    let expect_bool = || {
        value
            .as_bool()
            .ok_or_else(|| SchemaError::malformed(format!("'{key}' must be a boolean"), path))
    };
    match key {
        "caption" => {
            options.caption = match value {
                Value::Null => None,
                Value::String(caption) => Some(caption.clone()),
                _ => return Err(SchemaError::malformed("'caption' must be a string", path)),
            };
        }
        "hidden" => options.hidden = expect_bool()?,
        "reversed" => options.reversed = expect_bool()?,
        "titlesonly" => options.titlesonly = expect_bool()?,
        "maxdepth" => {
            options.maxdepth = value.as_i64().ok_or_else(|| {
                SchemaError::malformed("'maxdepth' must be an integer", path)
            })?;
        }
        "numbered" => {
            options.numbered = match value {
                Value::Bool(flag) => Some(Numbered::Flag(*flag)),
                _ => value.as_u64().map(Numbered::Depth),
            }
            .ok_or_else(|| {
                SchemaError::malformed(
                    "'numbered' must be a boolean or a non-negative integer",
                    path,
                )
            })?;
        }
        other => {
            return Err(SchemaError::malformed(
                format!("unknown toctree option '{other}'"),
                path,
            ));
        }
    }
    Ok(())
}

fn key_candidates(primary: &'static str, normalized: &'static str) -> Vec<&'static str> {
    if primary == normalized {
        vec![primary]
    } else {
        vec![primary, normalized]
    }
}

fn non_empty_str(value: &Value) -> Option<&str> {
    value.as_str().filter(|s| !s.is_empty())
}

fn optional_string(data: &Mapping, key: &str, path: &str) -> Result<Option<String>, SchemaError> {
    match data.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaError::malformed(
            format!("'{key}' must be a string"),
            path,
        )),
    }
}

/// Find which of `candidates` is present, failing if more than one is.
fn single_key(
    data: &Mapping,
    candidates: &[&'static str],
    path: &str,
) -> Result<Option<&'static str>, SchemaError> {
    let present: Vec<&'static str> = candidates
        .iter()
        .copied()
        .filter(|key| data.contains_key(*key))
        .collect();
    match present.as_slice() {
        [] => Ok(None),
        [key] => Ok(Some(*key)),
        [first, second, ..] => Err(SchemaError::malformed(
            format!("Both '{first}' and '{second}' found"),
            path,
        )),
    }
}

/// Fail if `data` has a key outside `allowed`.
fn check_keys(data: &Mapping, allowed: &[&str], path: &str) -> Result<(), SchemaError> {
    let mut unknown = Vec::new();
    for key in data.keys() {
        match key.as_str() {
            Some(key) if allowed.contains(&key) => {}
            Some(key) => unknown.push(key.to_owned()),
            None => unknown.push(format!("{key:?}")),
        }
    }
    if unknown.is_empty() {
        return Ok(());
    }
    Err(SchemaError::malformed(
        format!("Unknown keys found: {unknown:?}, allowed: {allowed:?}"),
        path,
    ))
}

/// `glob` and `url` entries cannot carry nested documents.
fn check_link_keys(
    data: &Mapping,
    link_key: &str,
    allowed: &[&str],
    path: &str,
) -> Result<(), SchemaError> {
    for key in data.keys() {
        let key = key.as_str().unwrap_or("<non-string>");
        if !allowed.contains(&key) {
            return Err(SchemaError::malformed(
                format!("entry contains incompatible keys '{link_key}' and '{key}'"),
                path,
            ));
        }
    }
    Ok(())
}
