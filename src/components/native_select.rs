//! Plain select: arrow keys step through the options, no filtering

use crate::action::Action;
use crate::components::layout::rect_contains;
use crate::components::select::{ClickOutcome, OnChange, SelectInput, PLACEHOLDER};
use crate::model::combobox::SelectId;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use std::time::Instant;

pub struct NativeSelect {
    id: SelectId,
    label: &'static str,
    on_change: OnChange,
    items: Vec<String>,
    value: String,
    area: Rect,
}

impl NativeSelect {
    pub fn new(id: SelectId, label: &'static str, on_change: OnChange) -> Self {
        Self {
            id,
            label,
            on_change,
            items: Vec::new(),
            value: String::new(),
            area: Rect::default(),
        }
    }

    fn position(&self) -> Option<usize> {
        self.items.iter().position(|item| *item == self.value)
    }

    /// Step one option without wrapping; emits only when the value changes
    fn step(&mut self, forward: bool) -> Option<Action> {
        if self.items.is_empty() {
            return None;
        }
        let next = match (self.position(), forward) {
            (None, true) => 0,
            (None, false) => self.items.len() - 1,
            (Some(i), true) => (i + 1).min(self.items.len() - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        if self.position() == Some(next) {
            return None;
        }
        self.value = self.items[next].clone();
        Some((self.on_change)(self.value.clone()))
    }
}

impl SelectInput for NativeSelect {
    fn id(&self) -> SelectId {
        self.id
    }

    fn set_items(&mut self, items: &[String]) {
        self.items = items.to_vec();
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Down | KeyCode::Right => self.step(true),
            KeyCode::Up | KeyCode::Left => self.step(false),
            _ => None,
        }
    }

    fn handle_click(&mut self, column: u16, row: u16) -> ClickOutcome {
        if rect_contains(self.area, column, row) {
            ClickOutcome::Inside(None)
        } else {
            ClickOutcome::Outside
        }
    }

    fn focus(&mut self) {}

    fn blur(&mut self, _now: Instant) {}

    fn tick(&mut self, _now: Instant) {}

    fn is_open(&self) -> bool {
        false
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        self.area = area;

        let value = if self.value.is_empty() {
            Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))
        } else {
            Span::styled(self.value.clone(), Style::default().fg(Color::White))
        };
        let counter = match self.position() {
            Some(i) => format!(" {}/{} ", i + 1, self.items.len()),
            None => format!(" -/{} ", self.items.len()),
        };

        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let paragraph = Paragraph::new(Line::from(vec![
            Span::styled("◂ ", Style::default().fg(Color::DarkGray)),
            value,
            Span::styled(" ▸", Style::default().fg(Color::DarkGray)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ", self.label))
                .title_style(Style::default().add_modifier(Modifier::BOLD))
                .title_bottom(Line::from(counter).right_aligned()),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_dropdown(&mut self, _frame: &mut Frame, _bounds: Rect) {}
}
