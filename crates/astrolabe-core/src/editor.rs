//! Bridge to the external code editor.
//!
//! The editor itself (syntax highlighting, schema hints, key handling) lives
//! outside this crate behind [`EditorSurface`]. The bridge adds two things:
//!
//! - every call fails with [`EditorError::NotInitialized`] until a surface is
//!   attached, so sequencing bugs in the host show up immediately
//! - change notifications are classified, so a programmatic buffer
//!   replacement (selecting a snippet) is never mistaken for typing

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::Value;
use thiserror::Error;

/// The external editor component.
pub trait EditorSurface: Send + Sync {
    fn get_value(&self) -> String;

    /// Replace the whole buffer. Implementations may report the change
    /// synchronously; the bridge marks it as programmatic.
    fn set_value(&self, text: &str);

    fn set_read_only(&self, read_only: bool);
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("Editor not initialized")]
    NotInitialized,
}

/// Where a buffer change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    Programmatic,
    User,
}

#[derive(Default)]
pub struct EditorBridge {
    surface: RwLock<Option<Arc<dyn EditorSurface>>>,
    replacing: AtomicBool,
}

/// Clears the programmatic flag even if the surface panics mid-write.
struct ReplaceGuard<'a>(&'a AtomicBool);

impl Drop for ReplaceGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl EditorBridge {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, surface: Arc<dyn EditorSurface>) {
        *self.surface.write().unwrap_or_else(|e| e.into_inner()) = Some(surface);
    }

    pub fn is_attached(&self) -> bool {
        self.surface
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn ensure_attached(&self) -> Result<(), EditorError> {
        self.surface().map(|_| ())
    }

    fn surface(&self) -> Result<Arc<dyn EditorSurface>, EditorError> {
        self.surface
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
            .ok_or(EditorError::NotInitialized)
    }

    pub fn get_value(&self) -> Result<String, EditorError> {
        Ok(self.surface()?.get_value())
    }

    /// Show `content` as pretty-printed JSON.
    pub fn set_value(&self, content: &Value) -> Result<(), EditorError> {
        let text = serde_json::to_string_pretty(content).unwrap_or_else(|_| content.to_string());
        self.set_text(&text)
    }

    /// Replace the buffer with raw text. Counts as programmatic.
    pub fn set_text(&self, text: &str) -> Result<(), EditorError> {
        let surface = self.surface()?;
        self.replacing.store(true, Ordering::SeqCst);
        let _guard = ReplaceGuard(&self.replacing);
        surface.set_value(text);
        Ok(())
    }

    pub fn set_read_only(&self, read_only: bool) -> Result<(), EditorError> {
        self.surface()?.set_read_only(read_only);
        Ok(())
    }

    /// Classify a change notification coming from the surface.
    pub fn change_origin(&self) -> ChangeOrigin {
        if self.replacing.load(Ordering::SeqCst) {
            ChangeOrigin::Programmatic
        } else {
            ChangeOrigin::User
        }
    }
}

// ============================================================================
// Headless surface
// ============================================================================

/// In-memory editor used by the CLI and tests.
#[derive(Debug, Default)]
pub struct HeadlessEditor {
    buffer: Mutex<String>,
    read_only: AtomicBool,
}

impl HeadlessEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the user typing a whole new buffer. The host is expected to
    /// report it via [`crate::context::Workbench::on_editor_changed`].
    pub fn type_text(&self, text: &str) {
        *self.buffer.lock().unwrap_or_else(|e| e.into_inner()) = text.to_string();
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only.load(Ordering::SeqCst)
    }
}

impl EditorSurface for HeadlessEditor {
    fn get_value(&self) -> String {
        self.buffer.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn set_value(&self, text: &str) {
        *self.buffer.lock().unwrap_or_else(|e| e.into_inner()) = text.to_string();
    }

    fn set_read_only(&self, read_only: bool) {
        self.read_only.store(read_only, Ordering::SeqCst);
    }
}
