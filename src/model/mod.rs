//! Model layer - state without terminal concerns
//!
//! - `WizardState` - Steps, validation and response handling
//! - `ComboboxState` - Filtering and navigation for one searchable select
//! - `ModalStack` - Modal overlay management

pub mod combobox;
pub mod modal;
pub mod wizard;
