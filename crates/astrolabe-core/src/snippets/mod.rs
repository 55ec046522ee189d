//! Snippet records and the operations that change them.

pub mod defaults;
pub mod store;

pub use store::{DraftOutcome, SnippetStore, StoreError};
