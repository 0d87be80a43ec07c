mod edit;
pub mod keymap;
mod keymap_ext;
mod state;
mod types;

pub use types::{App, EditSession, FocusField, Severity, SubmitState, View};
