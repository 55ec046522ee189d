//! Editor session state.

use serde::{Deserialize, Serialize};

use crate::snippets::SnippetStore;

/// What the editor is showing, derived from the selected snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VersionState {
    /// No draft exists; the editor is writable.
    Clean,
    /// A draft exists and is shown; the editor is writable.
    DraftUnsaved,
    /// A draft exists but the saved version is shown; the editor is locked.
    ViewingSavedWithDraft,
}

impl VersionState {
    pub fn from_flags(has_draft: bool, is_draft_version: bool) -> Self {
        match (has_draft, is_draft_version) {
            (false, _) => VersionState::Clean,
            (true, true) => VersionState::DraftUnsaved,
            (true, false) => VersionState::ViewingSavedWithDraft,
        }
    }

    pub fn is_read_only(self) -> bool {
        self == VersionState::ViewingSavedWithDraft
    }
}

/// The editor session. Not persisted; rebuilt from the store on load.
///
/// Every transition consumes the previous value and returns the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSession {
    /// Selected snippet, if any.
    pub current_id: Option<String>,

    /// Whether the draft (rather than the saved content) is the version in view.
    pub is_draft_version: bool,

    /// Whether the buffer holds edits that have not been committed.
    pub has_unsaved_changes: bool,

    /// Whether the editor is locked against edits.
    pub read_only: bool,
}

impl EditorSession {
    /// A session with nothing selected.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.current_id.as_deref() == Some(id)
    }

    /// Version state of the selected snippet, or `None` if nothing is selected.
    pub fn version_state(&self, store: &SnippetStore) -> Option<VersionState> {
        let id = self.current_id.as_deref()?;
        let snippet = store.find(id)?;
        Some(VersionState::from_flags(
            snippet.has_draft(),
            self.is_draft_version,
        ))
    }
}
