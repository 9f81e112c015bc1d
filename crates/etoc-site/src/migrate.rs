//! Migration of Jupyter Book v0.10 ToC files to the current schema.
//!
//! The legacy schema uses `file` for the root, `sections`/`chapters` for
//! entries, `parts` for subtrees, `part`/`chapter` for captions, and allows a
//! top-level `numbered` flag. It may also be a list whose first item is the
//! root document.

use std::collections::VecDeque;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::dump::{KeyNames, write_toc_dict};
use crate::error::SchemaError;
use crate::parse::{FILE_KEY, OPTIONS_KEY, ROOT_KEY, parse_toc_data};
use crate::site_map::{FileFormat, ITEMS_KEY, SUBTREES_KEY, SiteMap};
use crate::yaml::load_yaml;

const NUMBERED_KEY: &str = "numbered";

/// Legacy keys and their current names, applied in this order.
const RENAMES: [(&str, &str); 5] = [
    ("parts", SUBTREES_KEY),
    ("sections", ITEMS_KEY),
    ("chapters", ITEMS_KEY),
    ("part", "caption"),
    ("chapter", "caption"),
];

/// Result of a migration.
#[derive(Debug)]
pub struct Migrated {
    /// Validated site map, with its file format derived from the legacy keys.
    pub site_map: SiteMap,
    /// Current-schema mapping (normalized keys plus `format`), defaults skipped.
    pub toc: Mapping,
}

/// Load a legacy ToC file and migrate it.
pub fn migrate_path(path: &Path) -> Result<Migrated, SchemaError> {
    migrate_jupyter_book(load_yaml(path)?)
}

/// Migrate a legacy ToC (a mapping, or a list of mappings) to the current schema.
///
/// # Errors
///
/// Returns [`SchemaError::Legacy`] naming the violated rule, or
/// [`SchemaError::MigratedOutput`] wrapping the parser's error if the
/// transformed mapping is still invalid.
pub fn migrate_jupyter_book(toc: Value) -> Result<Migrated, SchemaError> {
    let mut toc = flatten_top_level(toc)?;

    let Some(root) = toc.shift_remove(FILE_KEY) else {
        return Err(SchemaError::legacy("no top-level 'file' key found"));
    };
    toc.insert(Value::from(ROOT_KEY), root);

    let file_format = detect_format(&toc)?;
    normalize_keys(&mut toc)?;
    hoist_numbered(&mut toc);

    let mut site_map = parse_toc_data(&Value::Mapping(toc))
        .map_err(|e| SchemaError::MigratedOutput(Box::new(e)))?;
    site_map.file_format = file_format;

    let toc = write_toc_dict(&site_map, true, KeyNames::Normalized)?;
    tracing::debug!(
        format = %file_format,
        document_count = site_map.len(),
        "Migrated legacy ToC"
    );
    Ok(Migrated { site_map, toc })
}

/// Turn a top-level list into a single mapping.
///
/// The entries of the first item (`sections` or `chapters`) are joined with
/// the remaining list items; if those carry `part`/`chapter` captions they
/// become `parts`.
fn flatten_top_level(toc: Value) -> Result<Mapping, SchemaError> {
    let items = match toc {
        Value::Mapping(toc) => return Ok(toc),
        Value::Sequence(items) => items,
        _ => return Err(SchemaError::legacy("ToC is not a list or dict")),
    };

    let mut items = items.into_iter();
    let mut first = match items.next() {
        Some(Value::Mapping(first)) => first,
        Some(_) => return Err(SchemaError::legacy("First list item is not a dict")),
        None => return Err(SchemaError::legacy("ToC is an empty list")),
    };

    if first.contains_key("sections") && first.contains_key("chapters") {
        return Err(SchemaError::legacy(
            "First list item contains both 'chapters' and 'sections' keys",
        ));
    }

    let mut top_items_key = "sections";
    let mut popped = false;
    let mut first_items = Vec::new();
    for key in ["sections", "chapters"] {
        if let Some(value) = first.shift_remove(key) {
            let Value::Sequence(value) = value else {
                return Err(SchemaError::legacy(format!(
                    "First list item '{key}' is not a list"
                )));
            };
            top_items_key = key;
            popped = true;
            first_items.extend(value);
        }
    }
    first_items.extend(items);

    let contains_part = first_items
        .iter()
        .any(|item| item.get("part").is_some() || item.get("chapter").is_some());
    let contains_file = first_items.iter().any(|item| item.get(FILE_KEY).is_some());
    if contains_part && contains_file {
        return Err(SchemaError::legacy(
            "top-level contains mixed 'part' and 'file' keys",
        ));
    }

    if popped || !first_items.is_empty() {
        let key = if contains_part { "parts" } else { top_items_key };
        first.insert(Value::from(key), Value::Sequence(first_items));
    }
    Ok(first)
}

/// Derive the file format from the single top-level entries key.
fn detect_format(toc: &Mapping) -> Result<FileFormat, SchemaError> {
    let keys: Vec<&str> = ["parts", "chapters", "sections"]
        .into_iter()
        .filter(|key| toc.contains_key(*key))
        .collect();
    match keys.as_slice() {
        [] | ["parts" | "chapters"] => Ok(FileFormat::Book),
        ["sections"] => Ok(FileFormat::Article),
        keys => Err(SchemaError::legacy(format!(
            "There is more than one top-level key: {keys:?}"
        ))),
    }
}

/// Rename legacy keys in every nested mapping, breadth-first.
fn normalize_keys(toc: &mut Mapping) -> Result<(), SchemaError> {
    let mut pending = VecDeque::from([toc]);
    while let Some(mapping) = pending.pop_front() {
        if mapping.contains_key("chapters") && mapping.contains_key("sections") {
            let keys: Vec<&str> = mapping.keys().filter_map(Value::as_str).collect();
            return Err(SchemaError::legacy(format!(
                "both 'chapters' and 'sections' in same dict: {keys:?}"
            )));
        }

        for (old, new) in RENAMES {
            if let Some(value) = mapping.shift_remove(old) {
                mapping.insert(Value::from(new), value);
            }
        }

        for (_, value) in mapping {
            match value {
                Value::Mapping(child) => pending.push_back(child),
                Value::Sequence(items) => {
                    pending.extend(items.iter_mut().filter_map(Value::as_mapping_mut));
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// Move a top-level `numbered` flag onto the toctrees it applies to.
///
/// Only the direct subtrees receive the flag; deeper documents are untouched.
fn hoist_numbered(toc: &mut Mapping) {
    let Some(numbered) = toc.shift_remove(NUMBERED_KEY) else {
        return;
    };

    if toc.contains_key(ITEMS_KEY) {
        let mut options = Mapping::new();
        options.insert(Value::from(NUMBERED_KEY), numbered.clone());
        toc.insert(Value::from(OPTIONS_KEY), Value::Mapping(options));
    }

    if let Some(Value::Sequence(subtrees)) = toc.get_mut(SUBTREES_KEY) {
        for subtree in subtrees.iter_mut().filter_map(Value::as_mapping_mut) {
            if !subtree.contains_key(NUMBERED_KEY) {
                subtree.insert(Value::from(NUMBERED_KEY), numbered.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::document::Numbered;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    fn migrate(text: &str) -> Result<Migrated, SchemaError> {
        migrate_jupyter_book(yaml(text))
    }

    fn legacy_message(err: SchemaError) -> String {
        match err {
            SchemaError::Legacy(message) => message,
            other => panic!("expected Legacy, got {other:?}"),
        }
    }

    #[test]
    fn test_article_sections() {
        let migrated = migrate("file: intro\nsections:\n  - file: a\n  - file: b\n").unwrap();

        assert_eq!(migrated.site_map.file_format, FileFormat::Article);
        assert_eq!(migrated.site_map.root_docname(), "intro");
        assert_eq!(
            Value::Mapping(migrated.toc),
            yaml("format: jb-article\nroot: intro\nentries:\n  - file: a\n  - file: b\n")
        );
    }

    #[test]
    fn test_book_chapters_with_nested_sections() {
        let migrated = migrate(
            r"
file: intro
chapters:
  - file: ch1
    sections:
      - file: ch1/s1
  - file: ch2
",
        )
        .unwrap();

        assert_eq!(migrated.site_map.file_format, FileFormat::Book);
        assert_eq!(
            migrated.site_map.docnames().collect::<Vec<_>>(),
            ["intro", "ch1", "ch1/s1", "ch2"]
        );
    }

    #[test]
    fn test_root_only_is_book() {
        let migrated = migrate("file: intro").unwrap();
        assert_eq!(migrated.site_map.file_format, FileFormat::Book);
        assert_eq!(
            Value::Mapping(migrated.toc),
            yaml("format: jb-book\nroot: intro\n")
        );
    }

    #[test]
    fn test_parts_with_captions() {
        let migrated = migrate(
            r"
file: intro
parts:
  - part: Getting started
    chapters:
      - file: a
  - chapter: Reference
    chapters:
      - file: b
",
        )
        .unwrap();

        let root = migrated.site_map.root();
        assert_eq!(root.subtrees.len(), 2);
        assert_eq!(
            root.subtrees[0].options.caption.as_deref(),
            Some("Getting started")
        );
        assert_eq!(root.subtrees[1].options.caption.as_deref(), Some("Reference"));
    }

    #[test]
    fn test_list_form_is_flattened() {
        let migrated = migrate(
            r"
- file: intro
  sections:
    - file: a
- file: b
",
        )
        .unwrap();

        assert_eq!(migrated.site_map.file_format, FileFormat::Article);
        assert_eq!(
            migrated.site_map.root().child_files().collect::<Vec<_>>(),
            ["a", "b"]
        );
    }

    #[test]
    fn test_list_form_with_parts() {
        let migrated = migrate(
            r"
- file: intro
- part: P1
  chapters:
    - file: a
- part: P2
  chapters:
    - file: b
",
        )
        .unwrap();

        assert_eq!(migrated.site_map.file_format, FileFormat::Book);
        assert_eq!(
            Value::Mapping(migrated.toc),
            yaml(
                r"
format: jb-book
root: intro
subtrees:
  - caption: P1
    entries:
      - file: a
  - caption: P2
    entries:
      - file: b
"
            )
        );
    }

    #[test]
    fn test_numbered_on_entries() {
        let migrated = migrate("file: x\nnumbered: true\nsections:\n  - file: a\n").unwrap();
        let tree = &migrated.site_map.root().subtrees[0];
        assert_eq!(tree.options.numbered, Numbered::Flag(true));
        assert_eq!(
            migrated.toc.get("options"),
            Some(&yaml("numbered: true"))
        );
    }

    #[test]
    fn test_numbered_copied_to_subtrees() {
        let migrated = migrate(
            r"
file: x
numbered: true
parts:
  - caption: p1
    chapters:
      - file: a
        sections:
          - file: a/b
  - caption: p2
    numbered: 3
    chapters:
      - file: c
",
        )
        .unwrap();

        let site_map = &migrated.site_map;
        let root = site_map.root();
        assert_eq!(root.subtrees[0].options.numbered, Numbered::Flag(true));
        assert_eq!(root.subtrees[1].options.numbered, Numbered::Depth(3));
        // One level only
        let nested = &site_map.get("a").unwrap().subtrees[0];
        assert_eq!(nested.options.numbered, Numbered::Flag(false));
    }

    #[test]
    fn test_rejects_both_keys_in_nested_dict() {
        let err = migrate(
            r"
file: x
chapters:
  - file: a
    sections:
      - file: b
    chapters:
      - file: c
",
        )
        .unwrap_err();
        assert!(legacy_message(err).contains("both 'chapters' and 'sections' in same dict"));
    }

    #[test]
    fn test_rejects_both_keys_at_top_level() {
        let err = migrate("file: x\nsections: []\nchapters: []\n").unwrap_err();
        assert!(legacy_message(err).contains("more than one top-level key"));
    }

    #[test]
    fn test_rejects_parts_and_sections() {
        let err = migrate("file: x\nparts: []\nsections: []\n").unwrap_err();
        assert!(legacy_message(err).contains("There is more than one top-level key"));
    }

    #[test]
    fn test_structural_errors() {
        let cases = [
            ("just text", "ToC is not a list or dict"),
            ("[]", "ToC is an empty list"),
            ("- text\n- file: a", "First list item is not a dict"),
            (
                "- file: x\n  sections: []\n  chapters: []\n- file: a",
                "First list item contains both 'chapters' and 'sections' keys",
            ),
            ("- file: x\n  sections: a\n- file: b", "First list item 'sections' is not a list"),
            (
                "- file: x\n- part: P\n  chapters: [{file: a}]\n- file: b",
                "top-level contains mixed 'part' and 'file' keys",
            ),
            ("sections:\n  - file: a", "no top-level 'file' key found"),
        ];
        for (text, expected) in cases {
            let message = legacy_message(migrate(text).unwrap_err());
            assert!(
                message.contains(expected),
                "{text:?}: expected {expected:?} in {message:?}"
            );
        }
    }

    #[test]
    fn test_invalid_output_is_wrapped() {
        let err = migrate("file: x\nsections:\n  - file: a\n  - file: a\n").unwrap_err();
        let SchemaError::MigratedOutput(inner) = &err else {
            panic!("expected MigratedOutput, got {err:?}");
        };
        assert!(matches!(**inner, SchemaError::DuplicateDocname(_)));
        assert!(err.to_string().starts_with("Error parsing migrated output:"));
    }

    #[test]
    fn test_output_parses_again() {
        let migrated = migrate("file: intro\nchapters:\n  - file: a\n").unwrap();
        let reparsed = parse_toc_data(&Value::Mapping(migrated.toc)).unwrap();
        assert_eq!(reparsed.file_format, FileFormat::Book);
        assert_eq!(
            reparsed.docnames().collect::<Vec<_>>(),
            migrated.site_map.docnames().collect::<Vec<_>>()
        );
        assert!(reparsed.root().subtrees[0].options.titlesonly);
    }

    #[test]
    fn test_migrate_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_toc.yml");
        std::fs::write(&path, "file: intro\nsections:\n  - file: a\n").unwrap();
        let migrated = migrate_path(&path).unwrap();
        assert_eq!(migrated.site_map.len(), 2);
    }
}
