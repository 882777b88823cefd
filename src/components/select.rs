//! Select widget abstraction
//!
//! The wizard talks to the database and table pickers only through
//! `SelectInput`. Which implementation backs it is decided once at startup
//! from the config.

use crate::action::Action;
use crate::components::combobox::Combobox;
use crate::components::native_select::NativeSelect;
use crate::config::SelectWidget;
use crate::model::combobox::SelectId;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};
use std::time::Instant;

pub const DATABASE_SELECT: SelectId = SelectId {
    input: "databaseName",
    dropdown: "databaseDropdown",
};

pub const TABLE_SELECT: SelectId = SelectId {
    input: "tableName",
    dropdown: "tableDropdown",
};

/// Placeholder shown while nothing is selected
pub const PLACEHOLDER: &str = "请选择";

/// Builds the action emitted when the confirmed value changes
pub type OnChange = fn(String) -> Action;

/// Where a mouse click landed relative to a select
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Neither the input nor the dropdown
    Outside,
    /// On the widget; carries the change action if a row was picked
    Inside(Option<Action>),
}

pub trait SelectInput {
    fn id(&self) -> SelectId;

    /// Replace the options; the confirmed value is kept
    fn set_items(&mut self, items: &[String]);

    /// Last confirmed value, `""` if none
    fn value(&self) -> &str;

    /// Set the confirmed value without emitting a change
    fn set_value(&mut self, value: &str);

    /// Handle a key while focused; returns the change action on selection
    fn handle_key(&mut self, key: KeyEvent) -> Option<Action>;

    fn handle_click(&mut self, column: u16, row: u16) -> ClickOutcome;

    fn focus(&mut self);

    fn blur(&mut self, now: Instant);

    /// Advance timers (blur grace period)
    fn tick(&mut self, now: Instant);

    fn is_open(&self) -> bool;

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool);

    /// Draw any overlay after the rest of the screen, clipped to `bounds`
    fn draw_dropdown(&mut self, frame: &mut Frame, bounds: Rect);
}

pub fn build_select(
    widget: SelectWidget,
    id: SelectId,
    label: &'static str,
    on_change: OnChange,
) -> Box<dyn SelectInput> {
    match widget {
        SelectWidget::Combobox => Box::new(Combobox::new(id, label, on_change)),
        SelectWidget::Native => Box::new(NativeSelect::new(id, label, on_change)),
    }
}
