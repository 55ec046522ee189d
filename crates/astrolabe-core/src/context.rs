//! Workbench - the shared state behind every front-end.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌──────────────────────────────┐
//!                  │          Workbench           │
//!                  ├──────────────────────────────┤
//!                  │  Mutex<store, session,       │
//!                  │        layout>               │
//!                  │  KeyValueStore               │
//!                  │  EditorBridge                │
//!                  │  VisualizationBridge         │
//!                  │  EventBus                    │
//!                  │  Debouncer (auto-draft)      │
//!                  └──────────────┬───────────────┘
//!                                 │
//!              ┌──────────────────┼──────────────────┐
//!              ▼                  ▼                  ▼
//!        ┌───────────┐     ┌────────────┐     ┌────────────┐
//!        │    CLI    │     │  GUI shell │     │   tests    │
//!        └───────────┘     └────────────┘     └────────────┘
//! ```
//!
//! Every operation runs one transition from [`crate::session::machine`]
//! under the state lock, stores the resulting session, then releases the
//! lock and applies the effects (editor writes, persistence, rendering,
//! events). An editor that reports changes synchronously while its buffer
//! is being replaced can therefore call back in without deadlocking.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use chrono::Utc;
use thiserror::Error;

use crate::config::{ConfigError, WorkbenchConfig};
use crate::debounce::{Debouncer, DEFAULT_DEBOUNCE};
use crate::editor::{ChangeOrigin, EditorBridge, EditorError, EditorSurface};
use crate::event_bus::{
    EventBus, CONFIRM_OVERRIDE, LAYOUT_CHANGED, SESSION_CHANGED, SNIPPETS_CHANGED,
};
use crate::listing::{build_view, WorkbenchView};
use crate::logging::{log_line, open_log_file, LogHandle};
use crate::persistence::{
    export_snippets, load_layout, load_snippets, parse_import, read_import, save_layout,
    save_snippets, write_export, FileStore, ImportError, KeyValueStore, MemoryStore, PanelLayout,
    Snippet, StorageError,
};
use crate::session::machine::{self, EditResponse, Effect, Step, TransitionError};
use crate::session::EditorSession;
use crate::snippets::SnippetStore;
use crate::visualization::{
    ChartRenderer, MemoryPreview, PassthroughRenderer, PreviewPane, VisualizationBridge,
};

/// Millisecond wall clock used for ids and `createdAt`.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

const ACTIVITY_LOG_ID: &str = "activity";

#[derive(Error, Debug)]
pub enum WorkbenchError {
    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Transition(#[from] TransitionError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What happened to an editor change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The change was a programmatic buffer replacement.
    Ignored,
    /// A user edit; the auto-draft timer was restarted.
    Accepted,
    /// The saved version is locked; the user must confirm discarding the
    /// draft via [`Workbench::resolve_override`].
    NeedsConfirmation,
}

// ============================================================================
// Builder
// ============================================================================

pub struct WorkbenchBuilder {
    storage: Option<Arc<dyn KeyValueStore>>,
    renderer: Option<Arc<dyn ChartRenderer>>,
    preview: Option<Arc<dyn PreviewPane>>,
    event_bus: Option<Arc<EventBus>>,
    debounce: Duration,
    log_dir: Option<PathBuf>,
    clock: Option<Clock>,
}

impl Default for WorkbenchBuilder {
    fn default() -> Self {
        Self {
            storage: None,
            renderer: None,
            preview: None,
            event_bus: None,
            debounce: DEFAULT_DEBOUNCE,
            log_dir: None,
            clock: None,
        }
    }
}

impl WorkbenchBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// File-backed storage, debounce and activity log from a config.
    pub fn from_config(config: &WorkbenchConfig) -> Self {
        let mut builder = Self::new()
            .storage(Arc::new(FileStore::new(config.data_dir.clone())))
            .debounce(config.debounce);
        builder.log_dir = config.log_dir.clone();
        builder
    }

    /// Defaults to an in-memory store.
    pub fn storage(mut self, storage: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Defaults to [`PassthroughRenderer`].
    pub fn renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Defaults to a [`MemoryPreview`] nobody reads.
    pub fn preview(mut self, preview: Arc<dyn PreviewPane>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Load the snippets (seeding an empty store) and the layout.
    ///
    /// The editor is attached separately with [`Workbench::attach_editor`].
    pub fn build(self) -> Result<Arc<Workbench>, WorkbenchError> {
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let snippets = load_snippets(storage.as_ref())?;
        let layout = load_layout(storage.as_ref()).unwrap_or_else(|e| {
            log::warn!("Ignoring stored panel layout: {}", e);
            PanelLayout::default()
        });
        log::info!("Loaded {} snippets", snippets.len());

        let renderer = self
            .renderer
            .unwrap_or_else(|| Arc::new(PassthroughRenderer));
        let preview = self
            .preview
            .unwrap_or_else(|| Arc::new(MemoryPreview::new()));
        let event_bus = self.event_bus.unwrap_or_else(|| Arc::new(EventBus::new()));
        let clock = self
            .clock
            .unwrap_or_else(|| Arc::new(|| Utc::now().timestamp_millis()));
        let activity_log = open_log_file(self.log_dir.as_deref(), ACTIVITY_LOG_ID);

        Ok(Arc::new_cyclic(|me| Workbench {
            me: me.clone(),
            state: Mutex::new(WorkbenchState {
                store: SnippetStore::new(snippets),
                session: EditorSession::empty(),
                layout,
            }),
            storage,
            editor: EditorBridge::new(),
            visualization: VisualizationBridge::new(renderer, preview),
            event_bus,
            auto_draft: Debouncer::new(self.debounce),
            activity_log,
            clock,
        }))
    }
}

// ============================================================================
// Workbench
// ============================================================================

struct WorkbenchState {
    store: SnippetStore,
    session: EditorSession,
    layout: PanelLayout,
}

pub struct Workbench {
    me: Weak<Workbench>,
    state: Mutex<WorkbenchState>,
    storage: Arc<dyn KeyValueStore>,
    editor: EditorBridge,
    visualization: VisualizationBridge,
    /// Change notifications for front-ends.
    pub event_bus: Arc<EventBus>,
    auto_draft: Debouncer,
    activity_log: LogHandle,
    clock: Clock,
}

impl Workbench {
    pub fn builder() -> WorkbenchBuilder {
        WorkbenchBuilder::new()
    }

    fn lock_state(&self) -> MutexGuard<'_, WorkbenchState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    pub fn snippets(&self) -> Vec<Snippet> {
        self.lock_state().store.snippets().to_vec()
    }

    pub fn snippet(&self, id: &str) -> Option<Snippet> {
        self.lock_state().store.find(id).cloned()
    }

    pub fn session(&self) -> EditorSession {
        self.lock_state().session.clone()
    }

    /// List rows matching `query` plus the editor chrome state.
    pub fn view(&self, query: &str) -> WorkbenchView {
        let state = self.lock_state();
        build_view(&state.store, &state.session, query)
    }

    pub fn editor(&self) -> &EditorBridge {
        &self.editor
    }

    // ------------------------------------------------------------------------
    // Transition plumbing
    // ------------------------------------------------------------------------

    /// Run `f` under the lock, then apply its effects outside it.
    fn run<T, F>(&self, f: F) -> Result<(T, EditorSession), WorkbenchError>
    where
        F: FnOnce(&mut SnippetStore, EditorSession) -> Result<(T, Step), TransitionError>,
    {
        self.editor.ensure_attached()?;

        let (value, step, changed) = {
            let mut state = self.lock_state();
            let before = state.session.clone();
            let (value, step) = f(&mut state.store, before.clone())?;
            state.session = step.session.clone();
            let changed = step.session != before;
            (value, step, changed)
        };

        let session = self.apply(step)?;
        if changed {
            self.event_bus.emit(SESSION_CHANGED, &session);
        }
        Ok((value, session))
    }

    fn transition<F>(&self, f: F) -> Result<EditorSession, WorkbenchError>
    where
        F: FnOnce(&mut SnippetStore, EditorSession) -> Result<Step, TransitionError>,
    {
        self.run(|store, session| f(store, session).map(|step| ((), step)))
            .map(|(_, session)| session)
    }

    fn apply(&self, step: Step) -> Result<EditorSession, WorkbenchError> {
        let mut persisted = Ok(());
        for effect in step.effects {
            match effect {
                Effect::LoadBuffer(content) => self.editor.set_value(&content)?,
                Effect::SetReadOnly(read_only) => self.editor.set_read_only(read_only)?,
                Effect::Persist => {
                    if let Err(e) = self.persist() {
                        log::error!("Failed to persist snippets: {}", e);
                        self.event_bus.notify_error(&e.to_string());
                        persisted = Err(e);
                    }
                }
                Effect::Render(spec) => {
                    self.visualization.render(&spec);
                }
                Effect::Clear => {
                    self.editor.set_text("")?;
                    self.visualization.clear();
                }
                Effect::ScheduleDraft => self.schedule_auto_draft(),
                Effect::CancelDraft => self.auto_draft.cancel(),
            }
        }
        persisted?;
        Ok(step.session)
    }

    /// Write the current list. Re-reads the store so a late writer never
    /// persists an older snapshot.
    fn persist(&self) -> Result<(), StorageError> {
        let snippets = self.snippets();
        save_snippets(self.storage.as_ref(), &snippets)?;
        self.event_bus
            .emit(SNIPPETS_CHANGED, &serde_json::json!({ "count": snippets.len() }));
        Ok(())
    }

    fn schedule_auto_draft(&self) {
        let me = self.me.clone();
        self.auto_draft.schedule(async move {
            if let Some(workbench) = me.upgrade() {
                workbench.flush_auto_draft();
            }
        });
    }

    fn record(&self, action: &str, detail: &str) {
        log_line(&self.activity_log, action, detail);
    }

    /// Emit `notice:error` for a failed user-facing operation.
    fn notify<T>(&self, result: Result<T, WorkbenchError>) -> Result<T, WorkbenchError> {
        if let Err(e) = &result {
            self.event_bus.notify_error(&e.to_string());
        }
        result
    }

    // ------------------------------------------------------------------------
    // Editor lifecycle
    // ------------------------------------------------------------------------

    /// Attach the editor and select the first snippet (or clear when the
    /// store is empty).
    pub fn attach_editor(
        &self,
        surface: Arc<dyn EditorSurface>,
    ) -> Result<EditorSession, WorkbenchError> {
        self.editor.attach(surface);
        self.transition(|store, _| machine::select_first_or_clear(store))
    }

    /// Called by the host for every buffer change the editor reports.
    pub fn on_editor_changed(&self) -> Result<EditOutcome, WorkbenchError> {
        if self.editor.change_origin() == ChangeOrigin::Programmatic {
            return Ok(EditOutcome::Ignored);
        }

        let (outcome, session) = self.run(|_, session| {
            Ok(match machine::user_edit(session.clone()) {
                EditResponse::Accepted(step) => (EditOutcome::Accepted, step),
                EditResponse::NeedsConfirmation => {
                    (EditOutcome::NeedsConfirmation, Step::unchanged(session))
                }
            })
        })?;

        if outcome == EditOutcome::NeedsConfirmation {
            self.event_bus.emit(CONFIRM_OVERRIDE, &session);
        }
        Ok(outcome)
    }

    /// Answer a [`EditOutcome::NeedsConfirmation`]. Confirming discards the
    /// draft and unlocks the saved version for editing; declining restores
    /// the saved content in the editor.
    pub fn resolve_override(&self, confirmed: bool) -> Result<EditorSession, WorkbenchError> {
        if confirmed {
            let session = self.transition(machine::confirm_override)?;
            if let Some(id) = &session.current_id {
                self.record("discard-draft", id);
            }
            Ok(session)
        } else {
            self.transition(|store, session| machine::cancel_override(store, session))
        }
    }

    // ------------------------------------------------------------------------
    // Selection and saving
    // ------------------------------------------------------------------------

    pub fn select(
        &self,
        id: &str,
        force_draft_view: Option<bool>,
    ) -> Result<EditorSession, WorkbenchError> {
        self.transition(|store, _| machine::select(store, id, force_draft_view))
    }

    /// Flip between the saved version and the draft.
    pub fn toggle_version(&self) -> Result<EditorSession, WorkbenchError> {
        self.transition(|store, session| machine::toggle_version(store, session))
    }

    /// Store the editor buffer as a draft. Invalid JSON is logged and
    /// ignored; the session is returned unchanged.
    pub fn save_draft(&self) -> Result<EditorSession, WorkbenchError> {
        let read_for = self.session().current_id;
        let buffer = self.editor.get_value()?;
        let Some(id) = read_for else {
            return Ok(self.session());
        };

        let result = self.run(|store, session| {
            let step = machine::save_draft(store, session, &id, &buffer)?;
            let stored = step.persists() && store.has_draft(&id);
            Ok((stored, step))
        });
        match result {
            Ok((stored, session)) => {
                if stored {
                    self.record("draft", &id);
                }
                Ok(session)
            }
            Err(WorkbenchError::Transition(TransitionError::InvalidJson(e))) => {
                log::warn!("Draft not saved, invalid JSON in editor: {}", e);
                Ok(self.session())
            }
            Err(e) => Err(e),
        }
    }

    /// Entry point for the debounce timer.
    pub fn flush_auto_draft(&self) {
        if let Err(e) = self.save_draft() {
            log::warn!("Auto-draft failed: {}", e);
        }
    }

    /// Make the editor buffer the saved content.
    pub fn commit(&self) -> Result<EditorSession, WorkbenchError> {
        let read_for = self.session().current_id;
        let result = self
            .editor
            .get_value()
            .map_err(WorkbenchError::from)
            .and_then(|buffer| match read_for {
                Some(id) => self
                    .transition(|store, session| machine::commit(store, session, &id, &buffer)),
                None => Ok(self.session()),
            });
        let session = self.notify(result)?;
        if let Some(id) = &session.current_id {
            log::info!("Saved snippet {}", id);
            self.record("commit", id);
        }
        Ok(session)
    }

    // ------------------------------------------------------------------------
    // List operations
    // ------------------------------------------------------------------------

    /// Create a snippet with default content and select it.
    pub fn create(&self) -> Result<EditorSession, WorkbenchError> {
        let now = (self.clock)();
        let session = self.transition(|store, _| machine::create(store, now))?;
        if let Some(id) = &session.current_id {
            self.record("create", id);
        }
        Ok(session)
    }

    pub fn rename(&self, id: &str, new_name: &str) -> Result<EditorSession, WorkbenchError> {
        self.transition(|store, session| machine::rename(store, session, id, new_name))
    }

    pub fn delete(&self, id: &str) -> Result<EditorSession, WorkbenchError> {
        let session = self.transition(|store, session| machine::delete(store, session, id))?;
        self.record("delete", id);
        Ok(session)
    }

    /// Copy a snippet. Returns the new id; the selection is unchanged.
    pub fn duplicate(&self, id: &str) -> Result<String, WorkbenchError> {
        let now = (self.clock)();
        let (new_id, _) =
            self.run(|store, session| machine::duplicate(store, session, id, now))?;
        self.record("duplicate", &format!("{id} -> {new_id}"));
        Ok(new_id)
    }

    /// Set or (with blank text) remove a snippet's comment.
    pub fn set_comment(&self, id: &str, comment: &str) -> Result<EditorSession, WorkbenchError> {
        self.transition(|store, session| machine::set_comment(store, session, id, comment))
    }

    // ------------------------------------------------------------------------
    // Import / Export
    // ------------------------------------------------------------------------

    /// Pretty-printed JSON array of every snippet.
    pub fn export_json(&self) -> Result<String, WorkbenchError> {
        let snippets = self.snippets();
        export_snippets(&snippets).map_err(|e| WorkbenchError::Storage(e.into()))
    }

    pub fn export_to(&self, path: &Path) -> Result<(), WorkbenchError> {
        write_export(path, &self.snippets())?;
        log::info!("Exported snippets to {}", path.display());
        Ok(())
    }

    /// Replace every snippet with the parsed array and select the first.
    /// On failure nothing changes and `notice:error` is emitted.
    pub fn import_json(&self, text: &str) -> Result<EditorSession, WorkbenchError> {
        let result = parse_import(text)
            .map_err(WorkbenchError::from)
            .and_then(|snippets| self.import(snippets));
        self.notify(result)
    }

    pub fn import_from(&self, path: &Path) -> Result<EditorSession, WorkbenchError> {
        let result = read_import(path)
            .map_err(WorkbenchError::from)
            .and_then(|snippets| self.import(snippets));
        self.notify(result)
    }

    fn import(&self, snippets: Vec<Snippet>) -> Result<EditorSession, WorkbenchError> {
        let count = snippets.len();
        let session = self.transition(|store, _| machine::import(store, snippets))?;
        log::info!("Imported {} snippets", count);
        self.record("import", &format!("{count} snippets"));
        Ok(session)
    }

    // ------------------------------------------------------------------------
    // Layout
    // ------------------------------------------------------------------------

    pub fn layout(&self) -> PanelLayout {
        self.lock_state().layout
    }

    /// Drag a pane boundary. Only kept in memory until [`Self::save_layout`].
    pub fn resize_panels(&self, handle: usize, dx: f64) -> PanelLayout {
        let layout = {
            let mut state = self.lock_state();
            state.layout = state.layout.resize(handle, dx);
            state.layout
        };
        self.event_bus.emit(LAYOUT_CHANGED, &layout);
        layout
    }

    /// Persist the current layout (end of a drag).
    pub fn save_layout(&self) -> Result<(), WorkbenchError> {
        let layout = self.layout();
        save_layout(self.storage.as_ref(), &layout)?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
