//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod combobox;
pub mod help_dialog;
pub mod layout;
pub mod native_select;
pub mod quit_dialog;
pub mod select;
pub mod text_input;
pub mod wizard;

pub use help_dialog::HelpDialog;
pub use layout::{centered_popup, rect_contains};
pub use quit_dialog::QuitDialog;
