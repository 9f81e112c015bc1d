//! Serialization of a [`SiteMap`] back to a ToC mapping.

use std::collections::HashSet;

use serde_yaml::{Mapping, Value};

use crate::document::{Document, Numbered, TocItem, TocTreeOptions};
use crate::error::SchemaError;
use crate::parse::{
    FILE_KEY, FORMAT_KEY, GLOB_KEY, META_KEY, OPTIONS_KEY, ROOT_KEY, TITLE_KEY, TOCTREE_OPTIONS,
    URL_KEY,
};
use crate::site_map::{FileFormat, ITEMS_KEY, SUBTREES_KEY, SiteMap};

/// Which key names to write for subtrees and entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KeyNames {
    /// Keys of the site map's file format.
    Format,
    /// `subtrees` / `entries` regardless of the format.
    Normalized,
}

/// Convert a site map to a ToC mapping using its file format's key names.
///
/// With `skip_defaults`, toctree options equal to their default are omitted.
/// A document with a single toctree is written in shorthand form, with its
/// options under `options`.
///
/// # Errors
///
/// Returns [`SchemaError::Cycle`] if a document is reachable twice.
pub fn create_toc_dict(site_map: &SiteMap, skip_defaults: bool) -> Result<Mapping, SchemaError> {
    write_toc_dict(site_map, skip_defaults, KeyNames::Format)
}

pub(crate) fn write_toc_dict(
    site_map: &SiteMap,
    skip_defaults: bool,
    keys: KeyNames,
) -> Result<Mapping, SchemaError> {
    let writer = TocWriter {
        site_map,
        skip_defaults,
        keys,
    };
    let mut visited = HashSet::new();
    let body = writer.document(site_map.root(), 0, true, &mut visited)?;

    let mut data = Mapping::new();
    if site_map.file_format != FileFormat::Default {
        data.insert(
            Value::from(FORMAT_KEY),
            Value::from(site_map.file_format.as_str()),
        );
    }
    data.extend(body);
    if !site_map.meta().is_empty() {
        data.insert(Value::from(META_KEY), Value::Mapping(site_map.meta().clone()));
    }
    Ok(data)
}

struct TocWriter<'a> {
    site_map: &'a SiteMap,
    skip_defaults: bool,
    keys: KeyNames,
}

impl TocWriter<'_> {
    fn subtrees_key(&self, depth: usize) -> &'static str {
        match self.keys {
            KeyNames::Format => self.site_map.file_format.subtrees_key(depth),
            KeyNames::Normalized => SUBTREES_KEY,
        }
    }

    fn items_key(&self, depth: usize) -> &'static str {
        match self.keys {
            KeyNames::Format => self.site_map.file_format.items_key(depth),
            KeyNames::Normalized => ITEMS_KEY,
        }
    }

    fn document(
        &self,
        document: &Document,
        depth: usize,
        is_root: bool,
        visited: &mut HashSet<String>,
    ) -> Result<Mapping, SchemaError> {
        if !visited.insert(document.docname().to_owned()) {
            return Err(SchemaError::Cycle(document.docname().to_owned()));
        }

        let mut data = Mapping::new();
        let file_key = if is_root { ROOT_KEY } else { FILE_KEY };
        data.insert(Value::from(file_key), Value::from(document.docname()));
        if let Some(title) = &document.title {
            data.insert(Value::from(TITLE_KEY), Value::from(title.as_str()));
        }
        if document.subtrees.is_empty() {
            return Ok(data);
        }

        let items_key = self.items_key(depth);
        let mut trees = Vec::with_capacity(document.subtrees.len());
        for tree in &document.subtrees {
            let mut items = Vec::with_capacity(tree.items.len());
            for item in &tree.items {
                items.push(self.item(item, depth, visited)?);
            }
            let mut tree_data = self.options(&tree.options);
            tree_data.insert(Value::from(items_key), Value::Sequence(items));
            trees.push(tree_data);
        }

        if let [tree] = trees.as_mut_slice() {
            let items = tree.shift_remove(items_key).unwrap_or(Value::Null);
            if !tree.is_empty() {
                data.insert(Value::from(OPTIONS_KEY), Value::Mapping(std::mem::take(tree)));
            }
            data.insert(Value::from(items_key), items);
        } else {
            data.insert(
                Value::from(self.subtrees_key(depth)),
                Value::Sequence(trees.into_iter().map(Value::Mapping).collect()),
            );
        }
        Ok(data)
    }

    fn item(
        &self,
        item: &TocItem,
        depth: usize,
        visited: &mut HashSet<String>,
    ) -> Result<Value, SchemaError> {
        let mut data = Mapping::new();
        match item {
            TocItem::File(file) => match self.site_map.get(file.docname()) {
                Some(document) => {
                    return Ok(Value::Mapping(
                        self.document(document, depth + 1, false, visited)?,
                    ));
                }
                None => {
                    tracing::warn!(docname = file.docname(), "Entry refers to unknown document");
                    data.insert(Value::from(FILE_KEY), Value::from(file.docname()));
                }
            },
            TocItem::Glob(glob) => {
                data.insert(Value::from(GLOB_KEY), Value::from(glob.0.as_str()));
            }
            TocItem::Url(url) => {
                data.insert(Value::from(URL_KEY), Value::from(url.url.as_str()));
                if let Some(title) = &url.title {
                    data.insert(Value::from(TITLE_KEY), Value::from(title.as_str()));
                }
            }
        }
        Ok(Value::Mapping(data))
    }

    /// Toctree options as a mapping, in [`TOCTREE_OPTIONS`] order.
    fn options(&self, options: &TocTreeOptions) -> Mapping {
        let defaults = TocTreeOptions::default();
        let mut data = Mapping::new();
        for key in TOCTREE_OPTIONS {
            let (value, is_default) = match key {
                "caption" => (
                    options.caption.as_deref().map_or(Value::Null, Value::from),
                    options.caption == defaults.caption,
                ),
                "hidden" => (Value::Bool(options.hidden), options.hidden == defaults.hidden),
                "maxdepth" => (
                    Value::from(options.maxdepth),
                    options.maxdepth == defaults.maxdepth,
                ),
                "numbered" => (
                    numbered_value(options.numbered),
                    options.numbered == defaults.numbered,
                ),
                "reversed" => (
                    Value::Bool(options.reversed),
                    options.reversed == defaults.reversed,
                ),
                _ => (
                    Value::Bool(options.titlesonly),
                    options.titlesonly == defaults.titlesonly,
                ),
            };
            if !(self.skip_defaults && is_default) {
                data.insert(Value::from(key), value);
            }
        }
        data
    }
}

fn numbered_value(numbered: Numbered) -> Value {
    match numbered {
        Numbered::Flag(flag) => Value::Bool(flag),
        Numbered::Depth(depth) => Value::from(depth),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::{FileItem, GlobItem, TocTree, UrlItem};
    use crate::parse::parse_toc_data;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn round_trip(text: &str) -> Value {
        let site_map = parse_toc_data(&yaml(text)).unwrap();
        Value::Mapping(create_toc_dict(&site_map, true).unwrap())
    }

    #[test]
    fn test_shorthand_round_trip() {
        let text = r"
root: intro
title: Intro
options:
  caption: Contents
  numbered: 2
entries:
  - file: a
    title: A
  - glob: more/*
  - url: https://example.com
    title: Example
";
        assert_eq!(round_trip(text), yaml(text));
    }

    #[test]
    fn test_subtrees_round_trip() {
        let text = r"
root: index
subtrees:
  - caption: One
    entries:
      - file: a
        entries:
          - file: a/b
  - hidden: false
    entries:
      - file: c
meta:
  create_files:
    - extra
";
        assert_eq!(round_trip(text), yaml(text));
    }

    #[test]
    fn test_book_format_keys_and_format_first() {
        let text = r"
root: intro
subtrees:
  - caption: Part
    entries:
      - file: ch
        entries:
          - file: ch/s
  - entries:
      - file: other
";
        let mut site_map = parse_toc_data(&yaml(text)).unwrap();
        site_map.file_format = FileFormat::Book;
        let data = create_toc_dict(&site_map, true).unwrap();

        let expected = yaml(
            r"
format: jb-book
root: intro
parts:
  - caption: Part
    chapters:
      - file: ch
        sections:
          - file: ch/s
  - chapters:
      - file: other
",
        );
        assert_eq!(Value::Mapping(data), expected);
    }

    #[test]
    fn test_keep_defaults() {
        let site_map = SiteMap::new(
            Document::new("a").with_subtrees(vec![TocTree::new(vec![FileItem::new("b").into()])]),
        );
        let data = create_toc_dict(&site_map, false).unwrap();
        let options = data.get("options").and_then(Value::as_mapping).unwrap();
        let keys: Vec<_> = options.keys().filter_map(Value::as_str).collect();
        assert_eq!(keys, TOCTREE_OPTIONS);
        assert_eq!(options.get("hidden"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_unknown_file_entry_is_kept_bare() {
        let site_map = SiteMap::new(Document::new("a").with_subtrees(vec![TocTree::new(vec![
            FileItem::new("missing").into(),
            TocItem::Glob(GlobItem("g*".to_owned())),
            TocItem::Url(UrlItem {
                url: "https://x.org".to_owned(),
                title: None,
            }),
        ])]));
        let data = create_toc_dict(&site_map, true).unwrap();
        assert_eq!(
            Value::Mapping(data),
            yaml("root: a\nentries:\n  - file: missing\n  - glob: g*\n  - url: https://x.org\n")
        );
    }

    #[test]
    fn test_cycle_is_rejected() {
        let mut site_map = SiteMap::new(
            Document::new("a").with_subtrees(vec![TocTree::new(vec![FileItem::new("b").into()])]),
        );
        site_map
            .insert(
                Document::new("b")
                    .with_subtrees(vec![TocTree::new(vec![FileItem::new("a").into()])]),
            )
            .unwrap();
        let err = create_toc_dict(&site_map, true).unwrap_err();
        assert!(matches!(err, SchemaError::Cycle(ref name) if name == "a"));
    }

    #[test]
    fn test_normalized_keys() {
        let mut site_map = parse_toc_data(&yaml("root: a\nentries: [{file: b}]")).unwrap();
        site_map.file_format = FileFormat::Article;
        let data = write_toc_dict(&site_map, true, KeyNames::Normalized).unwrap();
        assert_eq!(
            Value::Mapping(data),
            yaml("format: jb-article\nroot: a\nentries:\n  - file: b\n")
        );
    }
}
