//! In-memory snippet list and its lifecycle operations.
//!
//! The store only mutates records. Persisting and re-rendering are the
//! caller's job (see [`crate::context::Workbench`]).

use serde_json::Value;
use thiserror::Error;

use super::defaults::new_snippet_content;
use crate::persistence::Snippet;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Snippet not found: {0}")]
    NotFound(String),
}

/// Result of writing a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftOutcome {
    /// The value differs from the saved content and is now the draft.
    Stored,
    /// The value equals the saved content; a stale draft was dropped.
    Cleared,
    /// The value equals the saved content and there was no draft.
    Unchanged,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnippetStore {
    snippets: Vec<Snippet>,
}

impl SnippetStore {
    pub fn new(snippets: Vec<Snippet>) -> Self {
        Self { snippets }
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.snippets
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Snippet> {
        self.snippets.iter().find(|s| s.id == id)
    }

    fn find_mut(&mut self, id: &str) -> Result<&mut Snippet, StoreError> {
        self.snippets
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    pub fn has_draft(&self, id: &str) -> bool {
        self.find(id).is_some_and(Snippet::has_draft)
    }

    /// Snippets ordered by creation time, newest first. Ties keep list order.
    pub fn sorted(&self) -> Vec<&Snippet> {
        let mut sorted: Vec<_> = self.snippets.iter().collect();
        sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        sorted
    }

    /// Id of the first snippet in display order.
    pub fn first_id(&self) -> Option<&str> {
        self.sorted().first().map(|s| s.id.as_str())
    }

    /// Replace the whole list (used by import).
    pub fn replace_all(&mut self, snippets: Vec<Snippet>) {
        self.snippets = snippets;
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Append a new snippet with default content and return its id.
    pub fn create(&mut self, now_ms: i64) -> String {
        let id = self.unique_id(now_ms);
        let name = self.next_display_name();
        self.snippets
            .push(Snippet::new(id.clone(), name, new_snippet_content(), now_ms));
        id
    }

    fn unique_id(&self, now_ms: i64) -> String {
        let mut stamp = now_ms;
        loop {
            let id = format!("snippet-{stamp}");
            if !self.contains(&id) {
                return id;
            }
            stamp += 1;
        }
    }

    fn next_display_name(&self) -> String {
        let mut n = self.snippets.len() + 1;
        loop {
            let name = format!("New Snippet {n}");
            if !self.snippets.iter().any(|s| s.name == name) {
                return name;
            }
            n += 1;
        }
    }

    /// Rename a snippet. Returns `false` (and changes nothing) when the
    /// trimmed name is blank.
    pub fn rename(&mut self, id: &str, new_name: &str) -> Result<bool, StoreError> {
        let trimmed = new_name.trim();
        let snippet = self.find_mut(id)?;
        if trimmed.is_empty() {
            return Ok(false);
        }
        snippet.name = trimmed.to_string();
        Ok(true)
    }

    pub fn delete(&mut self, id: &str) -> Result<Snippet, StoreError> {
        let index = self
            .snippets
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(self.snippets.remove(index))
    }

    /// Copy the saved content and comment of a snippet under a new id.
    /// The draft is never copied.
    pub fn duplicate(&mut self, id: &str, now_ms: i64) -> Result<String, StoreError> {
        let source = self
            .find(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let mut copy = Snippet::new(
            String::new(),
            format!("{} (copy)", source.name),
            source.content.clone(),
            now_ms,
        );
        copy.comment = source.comment.clone();
        copy.id = self.unique_id(now_ms);

        let new_id = copy.id.clone();
        self.snippets.push(copy);
        Ok(new_id)
    }

    /// Attach a comment. Blank text removes it.
    pub fn set_comment(&mut self, id: &str, comment: &str) -> Result<(), StoreError> {
        let snippet = self.find_mut(id)?;
        snippet.comment = if comment.trim().is_empty() {
            None
        } else {
            Some(comment.to_string())
        };
        Ok(())
    }

    /// Record `value` as the draft if it differs from the saved content.
    pub fn set_draft(&mut self, id: &str, value: Value) -> Result<DraftOutcome, StoreError> {
        let snippet = self.find_mut(id)?;
        if snippet.content == value {
            return Ok(match snippet.draft.take() {
                Some(_) => DraftOutcome::Cleared,
                None => DraftOutcome::Unchanged,
            });
        }
        snippet.draft = Some(value);
        Ok(DraftOutcome::Stored)
    }

    /// Drop the draft. Returns whether one existed.
    pub fn discard_draft(&mut self, id: &str) -> Result<bool, StoreError> {
        Ok(self.find_mut(id)?.draft.take().is_some())
    }

    /// Make `value` the saved content and drop the draft.
    pub fn commit(&mut self, id: &str, value: Value) -> Result<(), StoreError> {
        let snippet = self.find_mut(id)?;
        snippet.content = value;
        snippet.draft = None;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
