//! The editor session and the draft/version state machine.

pub mod machine;
pub mod state;

pub use machine::{EditResponse, Effect, Step, TransitionError};
pub use state::{EditorSession, VersionState};
