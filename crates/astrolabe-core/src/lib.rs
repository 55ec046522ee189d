//! Astrolabe Core - snippet workbench logic for visualization specifications.
//!
//! This crate keeps a list of named chart specifications, each with a saved
//! version and an optional unsaved draft, and drives an external code editor
//! and chart renderer from them. It has no UI of its own; front-ends hold a
//! [`Workbench`] and call into it.
//!
//! # Modules
//!
//! - [`persistence`] - Key-value storage, snippet list, layout, import/export
//! - [`snippets`] - The in-memory snippet store and built-in examples
//! - [`session`] - Editor session and the draft/version state machine
//! - [`editor`] - Bridge to the external code editor
//! - [`visualization`] - Bridge to the external chart renderer
//! - [`listing`] - Sorted, searchable list view model
//! - [`debounce`] - Cancellable auto-draft timer
//! - [`context`] - The [`Workbench`] tying everything together
//! - [`event_bus`] - Change notifications for front-ends
//! - [`config`], [`logging`], [`paths`] - Ambient plumbing

pub mod config;
pub mod context;
pub mod debounce;
pub mod editor;
pub mod event_bus;
pub mod listing;
pub mod logging;
pub mod paths;
pub mod persistence;
pub mod session;
pub mod snippets;
pub mod visualization;

pub use config::WorkbenchConfig;
pub use context::{EditOutcome, Workbench, WorkbenchBuilder, WorkbenchError};
pub use editor::{EditorSurface, HeadlessEditor};
pub use persistence::{PanelLayout, Snippet};
pub use session::{EditorSession, VersionState};
pub use visualization::{ChartRenderer, PreviewContent, PreviewPane, RenderError};
