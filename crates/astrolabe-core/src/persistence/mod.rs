//! Persistence layer for snippets and the pane layout.
//!
//! # Overview
//!
//! - **Key-value store** - [`KeyValueStore`] with a file-backed and an
//!   in-memory implementation
//! - **Snippets** - the whole list under one key, plus import/export files
//! - **Layout** - pane width fractions
//!
//! # File Locations
//!
//! With the default [`FileStore`], data lives under the data directory:
//!
//! ```text
//! ~/.config/astrolabe/            (or ASTROLABE_DATA_DIR)
//! ├── vegaSnippets.json           # Snippet list
//! └── panelLayout.json            # Pane widths
//! ```
//!
//! # Atomic Writes
//!
//! File writes go to `<key>.json.tmp` and are renamed into place, so a
//! crash never leaves a half-written list behind.

pub mod kv;
pub mod layout;
pub mod snippets;
pub mod types;

pub use kv::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use layout::{load_layout, save_layout, LAYOUT_KEY, MIN_PANE_FRACTION};
pub use snippets::{
    export_snippets, load_snippets, parse_import, read_import, save_snippets, write_export,
    ImportError, EXPORT_FILE_NAME, SNIPPETS_KEY,
};
pub use types::*;
