//! Persistence data types.
//!
//! # Data Model Overview
//!
//! Astrolabe persists two entries in its key-value store:
//!
//! ```text
//! <data_dir>/
//! ├── vegaSnippets.json    # JSON array of snippet records
//! └── panelLayout.json     # Pane width fractions
//! ```
//!
//! Field names are camelCase on disk.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Snippet Types
// ============================================================================

/// A named, persisted visualization specification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snippet {
    /// Unique, stable identifier (`snippet-<millis>` for user-created ones).
    pub id: String,

    /// User-visible name.
    pub name: String,

    /// Last explicitly saved version of the specification.
    pub content: Value,

    /// Unsaved edited variant. Present only while it differs from `content`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<Value>,

    /// Free-text note attached to the snippet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,

    /// Creation time in milliseconds since the Unix epoch.
    #[serde(default)]
    pub created_at: i64,
}

impl Snippet {
    /// Create a clean snippet with no draft or comment.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        content: Value,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            content,
            draft: None,
            comment: None,
            created_at,
        }
    }

    /// Whether an unsaved draft is held alongside the saved content.
    pub fn has_draft(&self) -> bool {
        self.draft.is_some()
    }

    /// Whether a non-blank comment is attached.
    pub fn has_comment(&self) -> bool {
        self.comment
            .as_deref()
            .is_some_and(|c| !c.trim().is_empty())
    }
}

// ============================================================================
// Layout Types
// ============================================================================

/// Width fractions of the three panes (list / editor / preview).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelLayout {
    pub snippet_width: f64,
    pub editor_width: f64,
    pub preview_width: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            snippet_width: 0.2,
            editor_width: 0.4,
            preview_width: 0.4,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn snippet_serializes_camel_case_and_skips_empty_fields() {
        let snippet = Snippet::new("a", "X", json!({"mark": "bar"}), 42);
        let value = serde_json::to_value(&snippet).unwrap();

        assert_eq!(value["createdAt"], 42);
        assert!(value.get("draft").is_none());
        assert!(value.get("comment").is_none());
    }

    #[test]
    fn snippet_without_created_at_defaults_to_zero() {
        let json = r#"{"id": "simple-bar", "name": "Bar", "content": {"mark": "bar"}}"#;
        let snippet: Snippet = serde_json::from_str(json).unwrap();

        assert_eq!(snippet.created_at, 0);
        assert!(!snippet.has_draft());
    }

    #[test]
    fn snippet_keeps_draft_and_comment() {
        let json = r#"{
            "id": "a",
            "name": "X",
            "content": {"mark": "bar"},
            "draft": {"mark": "line"},
            "comment": "try lines",
            "createdAt": 1700000000000
        }"#;
        let snippet: Snippet = serde_json::from_str(json).unwrap();

        assert_eq!(snippet.draft, Some(json!({"mark": "line"})));
        assert!(snippet.has_comment());
    }

    #[test]
    fn blank_comment_does_not_count() {
        let mut snippet = Snippet::new("a", "X", json!({}), 0);
        snippet.comment = Some("   ".to_string());
        assert!(!snippet.has_comment());
    }

    #[test]
    fn default_layout_sums_to_one() {
        let layout = PanelLayout::default();
        let sum = layout.snippet_width + layout.editor_width + layout.preview_width;
        assert!((sum - 1.0).abs() < 1e-9);
    }
}
