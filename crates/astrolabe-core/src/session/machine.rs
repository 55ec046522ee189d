//! Draft/version transitions.
//!
//! Each function takes the store and the current [`EditorSession`] and
//! returns a [`Step`]: the next session plus the effects the host must
//! apply (editor writes, persistence, preview). Nothing here touches the
//! editor, the disk or the renderer directly.

use serde_json::Value;
use thiserror::Error;

use super::state::EditorSession;
use crate::persistence::Snippet;
use crate::snippets::{DraftOutcome, SnippetStore, StoreError};

#[derive(Error, Debug)]
pub enum TransitionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid JSON in editor: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("The saved version is read-only while a draft exists; switch to the draft to save it")]
    ReadOnly,

    #[error("Selection changed to another snippet before saving; nothing was saved")]
    SelectionChanged,
}

/// A side effect requested by a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Replace the editor buffer. Never counts as a user edit.
    LoadBuffer(Value),
    /// Lock or unlock the editor.
    SetReadOnly(bool),
    /// Write the snippet list to storage.
    Persist,
    /// Re-render the preview with this specification.
    Render(Value),
    /// Empty the editor and the preview.
    Clear,
    /// Restart the auto-draft timer.
    ScheduleDraft,
    /// Drop any pending auto-draft.
    CancelDraft,
}

/// Next session plus the effects that bring the outside world in line.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub session: EditorSession,
    pub effects: Vec<Effect>,
}

impl Step {
    pub fn unchanged(session: EditorSession) -> Self {
        Self {
            session,
            effects: Vec::new(),
        }
    }

    fn then(mut self, other: Step) -> Self {
        self.effects.extend(other.effects);
        self.session = other.session;
        self
    }

    pub fn persists(&self) -> bool {
        self.effects.contains(&Effect::Persist)
    }
}

/// Reply to a user edit.
#[derive(Debug, Clone, PartialEq)]
pub enum EditResponse {
    Accepted(Step),
    /// The editor is read-only; the user must confirm discarding the draft.
    NeedsConfirmation,
}

fn parse_buffer(buffer: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(buffer)
}

fn require<'a>(store: &'a SnippetStore, id: &str) -> Result<&'a Snippet, StoreError> {
    store
        .find(id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))
}

// ============================================================================
// Selection
// ============================================================================

/// Load a snippet into a fresh session.
///
/// `force_draft_view` picks the version; by default the draft is shown when
/// one exists.
pub fn select(
    store: &SnippetStore,
    id: &str,
    force_draft_view: Option<bool>,
) -> Result<Step, TransitionError> {
    let snippet = require(store, id)?;
    let is_draft_version = force_draft_view.unwrap_or(snippet.has_draft());
    let displayed = match (&snippet.draft, is_draft_version) {
        (Some(draft), true) => draft.clone(),
        _ => snippet.content.clone(),
    };
    let read_only = snippet.has_draft() && !is_draft_version;

    Ok(Step {
        session: EditorSession {
            current_id: Some(snippet.id.clone()),
            is_draft_version,
            has_unsaved_changes: false,
            read_only,
        },
        effects: vec![
            Effect::CancelDraft,
            Effect::LoadBuffer(displayed.clone()),
            Effect::SetReadOnly(read_only),
            Effect::Render(displayed),
        ],
    })
}

/// Select the first snippet in display order, or clear everything.
pub fn select_first_or_clear(store: &SnippetStore) -> Result<Step, TransitionError> {
    match store.first_id() {
        Some(id) => select(store, id, None),
        None => Ok(Step {
            session: EditorSession::empty(),
            effects: vec![Effect::CancelDraft, Effect::SetReadOnly(false), Effect::Clear],
        }),
    }
}

/// Flip between the saved version and the draft.
pub fn toggle_version(
    store: &SnippetStore,
    session: EditorSession,
) -> Result<Step, TransitionError> {
    match session.current_id.as_deref() {
        Some(id) => select(store, id, Some(!session.is_draft_version)),
        None => Ok(Step::unchanged(session)),
    }
}

// ============================================================================
// Editing
// ============================================================================

/// A keystroke arrived from the user.
pub fn user_edit(session: EditorSession) -> EditResponse {
    if session.current_id.is_none() {
        return EditResponse::Accepted(Step::unchanged(session));
    }
    if session.read_only {
        return EditResponse::NeedsConfirmation;
    }
    EditResponse::Accepted(Step {
        session: EditorSession {
            has_unsaved_changes: true,
            ..session
        },
        effects: vec![Effect::ScheduleDraft],
    })
}

/// The user confirmed editing the saved version: drop the draft and unlock.
pub fn confirm_override(
    store: &mut SnippetStore,
    session: EditorSession,
) -> Result<Step, TransitionError> {
    let Some(id) = session.current_id.clone() else {
        return Ok(Step::unchanged(session));
    };
    let discarded = store.discard_draft(&id)?;

    let mut effects = Vec::new();
    if discarded {
        effects.push(Effect::Persist);
    }
    effects.push(Effect::SetReadOnly(false));
    effects.push(Effect::ScheduleDraft);

    Ok(Step {
        session: EditorSession {
            is_draft_version: true,
            has_unsaved_changes: true,
            read_only: false,
            ..session
        },
        effects,
    })
}

/// The user declined: put the saved content back in the buffer.
pub fn cancel_override(
    store: &SnippetStore,
    session: EditorSession,
) -> Result<Step, TransitionError> {
    let Some(id) = session.current_id.as_deref() else {
        return Ok(Step::unchanged(session));
    };
    let content = require(store, id)?.content.clone();
    Ok(Step {
        session,
        effects: vec![Effect::LoadBuffer(content)],
    })
}

/// Store the buffer as a draft when it differs from the saved content.
///
/// `buffer_id` is the snippet that was selected when the buffer was read.
/// A no-op when the selection has moved since, or while the saved version is
/// locked in view, so a stray timer can never write into the wrong draft.
pub fn save_draft(
    store: &mut SnippetStore,
    session: EditorSession,
    buffer_id: &str,
    buffer: &str,
) -> Result<Step, TransitionError> {
    let Some(id) = session.current_id.clone() else {
        return Ok(Step::unchanged(session));
    };
    if id != buffer_id {
        log::debug!("Dropping draft read for {}, {} is selected now", buffer_id, id);
        return Ok(Step::unchanged(session));
    }
    if session.read_only {
        return Ok(Step::unchanged(session));
    }

    let value = parse_buffer(buffer)?;
    let outcome = store.set_draft(&id, value.clone())?;

    let (session, mut effects) = match outcome {
        DraftOutcome::Stored => (
            EditorSession {
                is_draft_version: true,
                has_unsaved_changes: true,
                read_only: false,
                ..session
            },
            vec![Effect::Persist],
        ),
        DraftOutcome::Cleared => (
            EditorSession {
                has_unsaved_changes: false,
                ..session
            },
            vec![Effect::Persist],
        ),
        DraftOutcome::Unchanged => (
            EditorSession {
                has_unsaved_changes: false,
                ..session
            },
            Vec::new(),
        ),
    };
    effects.push(Effect::Render(value));

    Ok(Step { session, effects })
}

/// Make the buffer the saved content. `buffer_id` is the snippet that was
/// selected when the buffer was read.
pub fn commit(
    store: &mut SnippetStore,
    session: EditorSession,
    buffer_id: &str,
    buffer: &str,
) -> Result<Step, TransitionError> {
    let Some(id) = session.current_id.clone() else {
        return Ok(Step::unchanged(session));
    };
    if id != buffer_id {
        return Err(TransitionError::SelectionChanged);
    }
    if session.read_only {
        return Err(TransitionError::ReadOnly);
    }

    let value = parse_buffer(buffer)?;
    store.commit(&id, value.clone())?;

    Ok(Step {
        session: EditorSession {
            current_id: Some(id),
            is_draft_version: false,
            has_unsaved_changes: false,
            read_only: false,
        },
        effects: vec![
            Effect::CancelDraft,
            Effect::Persist,
            Effect::SetReadOnly(false),
            Effect::Render(value),
        ],
    })
}

// ============================================================================
// List operations
// ============================================================================

/// Create a snippet and select it.
pub fn create(store: &mut SnippetStore, now_ms: i64) -> Result<Step, TransitionError> {
    let id = store.create(now_ms);
    let persisted = Step {
        session: EditorSession::empty(),
        effects: vec![Effect::Persist],
    };
    Ok(persisted.then(select(store, &id, None)?))
}

/// Delete a snippet. Deleting the selected one moves the selection to the
/// first remaining snippet, or clears the editor when none remain.
pub fn delete(
    store: &mut SnippetStore,
    session: EditorSession,
    id: &str,
) -> Result<Step, TransitionError> {
    store.delete(id)?;
    let was_selected = session.is_selected(id);
    let persisted = Step {
        session,
        effects: vec![Effect::Persist],
    };

    if was_selected {
        Ok(persisted.then(select_first_or_clear(store)?))
    } else {
        Ok(persisted)
    }
}

pub fn rename(
    store: &mut SnippetStore,
    session: EditorSession,
    id: &str,
    new_name: &str,
) -> Result<Step, TransitionError> {
    if store.rename(id, new_name)? {
        Ok(Step {
            session,
            effects: vec![Effect::Persist],
        })
    } else {
        Ok(Step::unchanged(session))
    }
}

pub fn duplicate(
    store: &mut SnippetStore,
    session: EditorSession,
    id: &str,
    now_ms: i64,
) -> Result<(String, Step), TransitionError> {
    let new_id = store.duplicate(id, now_ms)?;
    Ok((
        new_id,
        Step {
            session,
            effects: vec![Effect::Persist],
        },
    ))
}

pub fn set_comment(
    store: &mut SnippetStore,
    session: EditorSession,
    id: &str,
    comment: &str,
) -> Result<Step, TransitionError> {
    store.set_comment(id, comment)?;
    Ok(Step {
        session,
        effects: vec![Effect::Persist],
    })
}

/// Replace the whole list and select its first snippet.
pub fn import(store: &mut SnippetStore, snippets: Vec<Snippet>) -> Result<Step, TransitionError> {
    store.replace_all(snippets);
    let persisted = Step {
        session: EditorSession::empty(),
        effects: vec![Effect::Persist],
    };
    Ok(persisted.then(select_first_or_clear(store)?))
}

// ============================================================================
// TESTS
// ============================================================================
