//! Snippet list persistence, import and export.
//!
//! The whole list lives under a single key as a JSON array. An absent key
//! means the store has never been written; it is seeded with the built-in
//! examples and the seed is written back straight away.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use super::kv::{KeyValueStore, StorageError};
use super::types::Snippet;
use crate::snippets::defaults::default_snippets;

/// Storage key holding the snippet array.
pub const SNIPPETS_KEY: &str = "vegaSnippets";

/// File name suggested for exports.
pub const EXPORT_FILE_NAME: &str = "astrolabe-snippets.json";

/// Error type for imports. Every variant renders with the user-facing
/// `Failed to import snippets:` prefix.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Failed to import snippets: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to import snippets: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Failed to import snippets: Invalid snippets format")]
    NotAnArray,

    #[error("Failed to import snippets: Duplicate snippet id '{0}'")]
    DuplicateId(String),
}

/// Load the snippet list, seeding the defaults when nothing is stored.
pub fn load_snippets(store: &dyn KeyValueStore) -> Result<Vec<Snippet>, StorageError> {
    match store.get(SNIPPETS_KEY)? {
        Some(contents) => Ok(serde_json::from_str(&contents)?),
        None => {
            let snippets = default_snippets();
            save_snippets(store, &snippets)?;
            log::info!("Seeded snippet store with {} examples", snippets.len());
            Ok(snippets)
        }
    }
}

/// Persist the snippet list.
pub fn save_snippets(store: &dyn KeyValueStore, snippets: &[Snippet]) -> Result<(), StorageError> {
    let json = serde_json::to_string(snippets)?;
    store.set(SNIPPETS_KEY, &json)
}

// ============================================================================
// Import / Export
// ============================================================================

/// Serialize the list as a pretty-printed export document.
pub fn export_snippets(snippets: &[Snippet]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(snippets)
}

/// Write an export document to `path`.
pub fn write_export(path: &Path, snippets: &[Snippet]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, export_snippets(snippets)?)?;
    Ok(())
}

/// Parse an import document. It must be a JSON array of snippet records
/// with distinct ids.
pub fn parse_import(text: &str) -> Result<Vec<Snippet>, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    if !value.is_array() {
        return Err(ImportError::NotAnArray);
    }
    let snippets: Vec<Snippet> = serde_json::from_value(value)?;

    let mut seen = HashSet::new();
    if let Some(dup) = snippets.iter().find(|s| !seen.insert(s.id.as_str())) {
        return Err(ImportError::DuplicateId(dup.id.clone()));
    }
    Ok(snippets)
}

/// Read and parse an import document from `path`.
pub fn read_import(path: &Path) -> Result<Vec<Snippet>, ImportError> {
    let text = fs::read_to_string(path)?;
    parse_import(&text)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::kv::{FileStore, MemoryStore};
    use serde_json::json;
    use tempfile::tempdir;

    fn make_snippet(id: &str, name: &str) -> Snippet {
        Snippet::new(id, name, json!({"mark": "bar"}), 1)
    }

    #[test]
    fn load_seeds_defaults_and_persists_them() {
        let store = MemoryStore::new();

        let loaded = load_snippets(&store).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].id, "simple-bar");
        assert!(store.get(SNIPPETS_KEY).unwrap().is_some());
    }

    #[test]
    fn load_keeps_an_empty_stored_list() {
        let store = MemoryStore::new();
        save_snippets(&store, &[]).unwrap();

        let loaded = load_snippets(&store).unwrap();

        assert!(loaded.is_empty());
    }

    #[test]
    fn save_and_load_on_disk() {
        let dir = tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut snippet = make_snippet("a", "X");
        snippet.draft = Some(json!({"mark": "line"}));

        save_snippets(&store, &[snippet.clone()]).unwrap();
        let loaded = load_snippets(&store).unwrap();

        assert_eq!(loaded, vec![snippet]);
    }

    #[test]
    fn load_corrupt_store_is_an_error() {
        let store = MemoryStore::new();
        store.set(SNIPPETS_KEY, "{not json").unwrap();

        assert!(matches!(load_snippets(&store), Err(StorageError::Json(_))));
    }

    #[test]
    fn parse_import_accepts_array() {
        let text = r#"[{"id": "a", "name": "X", "content": {"mark": "bar"}}]"#;
        let snippets = parse_import(text).unwrap();

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].name, "X");
    }

    #[test]
    fn parse_import_rejects_non_array() {
        let err = parse_import(r#""not an array""#).unwrap_err();

        assert!(matches!(err, ImportError::NotAnArray));
        assert_eq!(
            err.to_string(),
            "Failed to import snippets: Invalid snippets format"
        );
    }

    #[test]
    fn parse_import_rejects_non_json() {
        let err = parse_import("hello").unwrap_err();

        assert!(matches!(err, ImportError::InvalidJson(_)));
        assert!(err.to_string().starts_with("Failed to import snippets:"));
    }

    #[test]
    fn parse_import_rejects_duplicate_ids() {
        let text = r#"[
            {"id": "x", "name": "One", "content": {"mark": "bar"}},
            {"id": "x", "name": "Two", "content": {"mark": "line"}}
        ]"#;

        let err = parse_import(text).unwrap_err();

        assert!(matches!(err, ImportError::DuplicateId(ref id) if id == "x"));
        assert_eq!(
            err.to_string(),
            "Failed to import snippets: Duplicate snippet id 'x'"
        );
    }

    #[test]
    fn parse_import_rejects_malformed_records() {
        let err = parse_import(r#"[{"name": "no id"}]"#).unwrap_err();
        assert!(matches!(err, ImportError::InvalidJson(_)));
    }

    #[test]
    fn export_then_read_import_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join(EXPORT_FILE_NAME);
        let snippets = vec![make_snippet("a", "X"), make_snippet("b", "Y")];

        write_export(&path, &snippets).unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        let imported = read_import(&path).unwrap();

        assert!(contents.contains("\n  {"));
        assert_eq!(imported, snippets);
    }

    #[test]
    fn read_import_missing_file() {
        let dir = tempdir().unwrap();
        let err = read_import(&dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, ImportError::Read(_)));
    }
}
