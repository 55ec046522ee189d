//! Snippet list view model and search.
//!
//! The list is sorted newest first. A search query is tried as a
//! case-insensitive regular expression; if it does not compile it falls back
//! to a case-insensitive substring match. Either way it runs over the
//! snippet's serialized JSON, so names, content and comments are all
//! searchable.

use chrono::{Local, TimeZone};
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use crate::persistence::Snippet;
use crate::session::{EditorSession, VersionState};
use crate::snippets::SnippetStore;

// ============================================================================
// Search
// ============================================================================

#[derive(Debug, Clone)]
pub enum SnippetQuery {
    All,
    Pattern(Regex),
    Substring(String),
}

impl SnippetQuery {
    pub fn parse(query: &str) -> Self {
        if query.is_empty() {
            return SnippetQuery::All;
        }
        match RegexBuilder::new(query).case_insensitive(true).build() {
            Ok(regex) => SnippetQuery::Pattern(regex),
            Err(_) => SnippetQuery::Substring(query.to_lowercase()),
        }
    }

    pub fn matches(&self, snippet: &Snippet) -> bool {
        let text = || serde_json::to_string(snippet).unwrap_or_default();
        match self {
            SnippetQuery::All => true,
            SnippetQuery::Pattern(regex) => regex.is_match(&text()),
            SnippetQuery::Substring(needle) => text().to_lowercase().contains(needle),
        }
    }
}

// ============================================================================
// Rows
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DraftIndicator {
    Draft,
    Clean,
}

impl DraftIndicator {
    pub fn glyph(self) -> &'static str {
        match self {
            DraftIndicator::Draft => "🟡",
            DraftIndicator::Clean => "🟢",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RowAction {
    Comment,
    Rename,
    Duplicate,
    Delete,
}

impl RowAction {
    pub const ALL: [RowAction; 4] = [
        RowAction::Comment,
        RowAction::Rename,
        RowAction::Duplicate,
        RowAction::Delete,
    ];

    pub fn glyph(self) -> &'static str {
        match self {
            RowAction::Comment => "💬",
            RowAction::Rename => "✏️",
            RowAction::Duplicate => "📄",
            RowAction::Delete => "❌",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRow {
    pub id: String,
    pub name: String,
    pub indicator: DraftIndicator,
    pub active: bool,
    pub has_comment: bool,
    pub tooltip: String,
    pub actions: [RowAction; 4],
}

impl ListRow {
    fn from_snippet(snippet: &Snippet, current_id: Option<&str>) -> Self {
        Self {
            id: snippet.id.clone(),
            name: snippet.name.clone(),
            indicator: if snippet.has_draft() {
                DraftIndicator::Draft
            } else {
                DraftIndicator::Clean
            },
            active: current_id == Some(snippet.id.as_str()),
            has_comment: snippet.has_comment(),
            tooltip: created_tooltip(snippet.created_at),
            actions: RowAction::ALL,
        }
    }

    /// Indicator glyph followed by the name.
    pub fn label(&self) -> String {
        format!("{} {}", self.indicator.glyph(), self.name)
    }
}

/// `Created at: <local time>` for a millisecond timestamp.
pub fn created_tooltip(created_at_ms: i64) -> String {
    match Local.timestamp_millis_opt(created_at_ms).single() {
        Some(time) => format!("Created at: {}", time.format("%Y-%m-%d %H:%M:%S")),
        None => "Created at: unknown".to_string(),
    }
}

/// Rows matching `query`, newest first.
pub fn list_rows(store: &SnippetStore, current_id: Option<&str>, query: &str) -> Vec<ListRow> {
    let query = SnippetQuery::parse(query);
    store
        .sorted()
        .into_iter()
        .filter(|s| query.matches(s))
        .map(|s| ListRow::from_snippet(s, current_id))
        .collect()
}

// ============================================================================
// Whole view
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionSwitch {
    pub visible: bool,
    pub label: &'static str,
}

impl VersionSwitch {
    pub fn for_state(state: Option<VersionState>) -> Self {
        match state {
            Some(VersionState::DraftUnsaved) => Self {
                visible: true,
                label: "View Saved",
            },
            Some(VersionState::ViewingSavedWithDraft) => Self {
                visible: true,
                label: "View Draft",
            },
            Some(VersionState::Clean) | None => Self {
                visible: false,
                label: "View Draft",
            },
        }
    }
}

/// Everything a front-end needs to draw the workbench chrome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkbenchView {
    pub rows: Vec<ListRow>,
    pub current_id: Option<String>,
    pub save_enabled: bool,
    pub read_only: bool,
    pub version_switch: VersionSwitch,
}

pub fn build_view(store: &SnippetStore, session: &EditorSession, query: &str) -> WorkbenchView {
    WorkbenchView {
        rows: list_rows(store, session.current_id.as_deref(), query),
        current_id: session.current_id.clone(),
        save_enabled: session.has_unsaved_changes,
        read_only: session.read_only,
        version_switch: VersionSwitch::for_state(session.version_state(store)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_store() -> SnippetStore {
        let mut line = Snippet::new(
            "line",
            "Revenue Line",
            json!({"mark": "line", "description": "Quarterly revenue"}),
            300,
        );
        line.draft = Some(json!({"mark": "area"}));
        line.comment = Some("compare with 2023".to_string());

        SnippetStore::new(vec![
            Snippet::new("bar", "Simple Bar", json!({"mark": "bar"}), 100),
            line,
            Snippet::new("dots", "Scatter (Dots)", json!({"mark": "point"}), 200),
        ])
    }

    fn ids(rows: &[ListRow]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    mod search {
        use super::*;

        #[test]
        fn empty_query_lists_everything_newest_first() {
            let rows = list_rows(&make_store(), None, "");
            assert_eq!(ids(&rows), vec!["line", "dots", "bar"]);
        }

        #[test]
        fn regex_is_case_insensitive() {
            let rows = list_rows(&make_store(), None, "REVENUE");
            assert_eq!(ids(&rows), vec!["line"]);
        }

        #[test]
        fn regex_alternation() {
            let rows = list_rows(&make_store(), None, r#""mark":"(bar|point)""#);
            assert_eq!(ids(&rows), vec!["dots", "bar"]);
        }

        #[test]
        fn invalid_regex_falls_back_to_substring() {
            let query = SnippetQuery::parse("scatter (dots");
            assert!(matches!(query, SnippetQuery::Substring(_)));

            let rows = list_rows(&make_store(), None, "scatter (dots");
            assert_eq!(ids(&rows), vec!["dots"]);
        }

        #[test]
        fn search_covers_drafts_and_comments() {
            assert_eq!(ids(&list_rows(&make_store(), None, "area")), vec!["line"]);
            assert_eq!(ids(&list_rows(&make_store(), None, "2023")), vec!["line"]);
        }

        #[test]
        fn no_match_is_empty() {
            assert!(list_rows(&make_store(), None, "histogram").is_empty());
        }
    }

    mod rows {
        use super::*;

        #[test]
        fn row_reflects_snippet_state() {
            let rows = list_rows(&make_store(), Some("line"), "");
            let line = &rows[0];

            assert!(line.active);
            assert!(line.has_comment);
            assert_eq!(line.indicator, DraftIndicator::Draft);
            assert_eq!(line.label(), "🟡 Revenue Line");
            assert_eq!(line.actions, RowAction::ALL);
            assert!(line.tooltip.starts_with("Created at: "));

            assert!(!rows[1].active);
            assert_eq!(rows[1].indicator, DraftIndicator::Clean);
            assert_eq!(rows[1].label(), "🟢 Scatter (Dots)");
        }
    }

    mod view {
        use super::*;

        fn session(id: &str, is_draft_version: bool, read_only: bool) -> EditorSession {
            EditorSession {
                current_id: Some(id.to_string()),
                is_draft_version,
                has_unsaved_changes: false,
                read_only,
            }
        }

        #[test]
        fn switch_hidden_for_clean_snippet() {
            let view = build_view(&make_store(), &session("bar", false, false), "");
            assert!(!view.version_switch.visible);
            assert!(!view.save_enabled);
        }

        #[test]
        fn switch_offers_saved_while_viewing_draft() {
            let view = build_view(&make_store(), &session("line", true, false), "");
            assert_eq!(
                view.version_switch,
                VersionSwitch {
                    visible: true,
                    label: "View Saved"
                }
            );
        }

        #[test]
        fn switch_offers_draft_while_viewing_saved() {
            let view = build_view(&make_store(), &session("line", false, true), "");
            assert_eq!(view.version_switch.label, "View Draft");
            assert!(view.read_only);
        }

        #[test]
        fn save_enabled_tracks_unsaved_changes() {
            let mut s = session("bar", false, false);
            s.has_unsaved_changes = true;
            assert!(build_view(&make_store(), &s, "").save_enabled);
        }
    }
}
