//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick for polling requests and timers
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,

    // ─────────────────────────────────────────────────────────────────────────
    // Focus
    // ─────────────────────────────────────────────────────────────────────────
    FocusNext,
    FocusPrev,

    // ─────────────────────────────────────────────────────────────────────────
    // Wizard Steps
    // ─────────────────────────────────────────────────────────────────────────
    /// Validate the connection form and list databases
    Connect,
    BackToStep1,
    /// Validate the selection and move to the generate step
    NextToStep3,
    BackToStep2,
    /// Generate and save the archive locally
    GenerateDownload,
    /// Generate into the server's output directory
    GenerateOnServer,
    /// Back to step 1 with every field restored
    Reset,
    /// Copy the suggested package name into the package field
    ApplySuggestion,

    // ─────────────────────────────────────────────────────────────────────────
    // Select Changes
    // ─────────────────────────────────────────────────────────────────────────
    DatabaseChanged(String),
    TableChanged(String),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::FocusNext => write!(f, "FocusNext"),
            Action::FocusPrev => write!(f, "FocusPrev"),
            Action::Connect => write!(f, "Connect"),
            Action::BackToStep1 => write!(f, "BackToStep1"),
            Action::NextToStep3 => write!(f, "NextToStep3"),
            Action::BackToStep2 => write!(f, "BackToStep2"),
            Action::GenerateDownload => write!(f, "GenerateDownload"),
            Action::GenerateOnServer => write!(f, "GenerateOnServer"),
            Action::Reset => write!(f, "Reset"),
            Action::ApplySuggestion => write!(f, "ApplySuggestion"),
            Action::DatabaseChanged(name) => write!(f, "DatabaseChanged({})", name),
            Action::TableChanged(name) => write!(f, "TableChanged({})", name),
        }
    }
}
