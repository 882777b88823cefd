//! Searchable combobox widget
//!
//! Terminal rendering and event routing for `ComboboxState`. The input box
//! is drawn in the form; the dropdown is drawn in a second pass on top of
//! everything else so it can overlap the fields below.

use crate::action::Action;
use crate::components::layout::rect_contains;
use crate::components::select::{ClickOutcome, OnChange, SelectInput, PLACEHOLDER};
use crate::model::combobox::{ComboboxState, NavKey, SelectId, NO_RESULTS};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};
use std::time::Instant;

/// Rows shown before the dropdown starts scrolling
const MAX_VISIBLE_ROWS: usize = 6;

pub struct Combobox {
    state: ComboboxState,
    label: &'static str,
    on_change: OnChange,
    /// Set on draw; used for hit testing
    input_area: Rect,
    dropdown_area: Option<Rect>,
}

impl Combobox {
    pub fn new(id: SelectId, label: &'static str, on_change: OnChange) -> Self {
        Self {
            state: ComboboxState::new(id),
            label,
            on_change,
            input_area: Rect::default(),
            dropdown_area: None,
        }
    }

    pub fn state(&self) -> &ComboboxState {
        &self.state
    }

    /// Dropdown placement: below the input, or above it if it does not fit
    fn dropdown_rect(&self, bounds: Rect) -> Rect {
        let rows = self.state.rows().len().clamp(1, MAX_VISIBLE_ROWS) as u16;
        let height = rows + 2;
        let below = self.input_area.y + self.input_area.height;
        let bounds_bottom = bounds.y + bounds.height;

        let y = if below + height <= bounds_bottom {
            below
        } else if self.input_area.y >= bounds.y + height {
            self.input_area.y - height
        } else {
            below
        };
        let height = height.min(bounds_bottom.saturating_sub(y));
        Rect::new(self.input_area.x, y, self.input_area.width, height)
    }

    fn row_item(&self, index: usize, value: &str) -> ListItem<'static> {
        let selected = self.state.is_row_selected(index);
        let highlighted = self.state.is_row_highlighted(index);

        let marker = if selected { "● " } else { "  " };
        let mut style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        if highlighted {
            style = style.bg(Color::Blue);
        }

        ListItem::new(Line::from(vec![
            Span::styled(marker, style),
            Span::styled(value.to_string(), style),
        ]))
        .style(style)
    }
}

impl SelectInput for Combobox {
    fn id(&self) -> SelectId {
        self.state.id()
    }

    fn set_items(&mut self, items: &[String]) {
        self.state.initialize(items);
    }

    fn value(&self) -> &str {
        self.state.value()
    }

    fn set_value(&mut self, value: &str) {
        self.state.set_value(value);
    }

    fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return None;
        }
        let picked = match key.code {
            KeyCode::Down => self.state.navigate(NavKey::Down),
            KeyCode::Up => self.state.navigate(NavKey::Up),
            KeyCode::Enter => self.state.navigate(NavKey::Enter),
            KeyCode::Esc => self.state.navigate(NavKey::Escape),
            KeyCode::Backspace => {
                self.state.backspace();
                None
            }
            KeyCode::Char(c) => {
                self.state.push_char(c);
                None
            }
            _ => None,
        };
        picked.map(self.on_change)
    }

    fn handle_click(&mut self, column: u16, row: u16) -> ClickOutcome {
        if rect_contains(self.input_area, column, row) {
            self.state.toggle();
            return ClickOutcome::Inside(None);
        }

        if let Some(dropdown) = self.dropdown_area.filter(|_| self.state.is_open()) {
            if rect_contains(dropdown, column, row) {
                // Border rows and the placeholder row are inert
                let first_row = dropdown.y + 1;
                let last_row = dropdown.y + dropdown.height.saturating_sub(1);
                if row < first_row || row >= last_row {
                    return ClickOutcome::Inside(None);
                }
                let index = self.state.scroll_offset() + (row - first_row) as usize;
                let picked = self.state.click_row(index);
                return ClickOutcome::Inside(picked.map(self.on_change));
            }
        }

        self.state.click_outside();
        ClickOutcome::Outside
    }

    fn focus(&mut self) {
        self.state.focus();
    }

    fn blur(&mut self, now: Instant) {
        self.state.blur(now);
    }

    fn tick(&mut self, now: Instant) {
        if self.state.tick(now) {
            log::debug!("{} closed on blur", self.state.id().input);
        }
    }

    fn is_open(&self) -> bool {
        self.state.is_open()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool) {
        self.input_area = area;

        let text = self.state.text();
        let mut spans = if text.is_empty() && !focused {
            vec![Span::styled(PLACEHOLDER, Style::default().fg(Color::DarkGray))]
        } else {
            vec![Span::styled(text.to_string(), Style::default().fg(Color::White))]
        };
        if focused {
            spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
        }

        let arrow = if self.state.is_open() { " ▴ " } else { " ▾ " };
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let paragraph = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(format!(" {} ", self.label))
                .title_style(if focused {
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Gray)
                })
                .title_bottom(Line::from(arrow).right_aligned()),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_dropdown(&mut self, frame: &mut Frame, bounds: Rect) {
        if !self.state.is_open() || self.input_area.height == 0 {
            self.dropdown_area = None;
            return;
        }

        let area = self.dropdown_rect(bounds);
        self.dropdown_area = Some(area);
        self.state
            .set_viewport_rows(area.height.saturating_sub(2).max(1) as usize);

        let items: Vec<ListItem> = if self.state.shows_no_results() {
            vec![ListItem::new(Span::styled(
                format!("  {}", NO_RESULTS),
                Style::default().fg(Color::DarkGray),
            ))]
        } else {
            let offset = self.state.scroll_offset();
            let visible = area.height.saturating_sub(2) as usize;
            self.state
                .rows()
                .iter()
                .enumerate()
                .skip(offset)
                .take(visible)
                .map(|(index, value)| self.row_item(index, value))
                .collect()
        };

        let title = format!(" {} ", self.state.id().dropdown);
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(Span::styled(title, Style::default().fg(Color::DarkGray))),
        );

        frame.render_widget(Clear, area);
        frame.render_widget(list, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    const ID: SelectId = SelectId {
        input: "tableName",
        dropdown: "tableDropdown",
    };

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn combobox(names: &[&str]) -> Combobox {
        let mut combobox = Combobox::new(ID, "数据表", Action::TableChanged);
        let items: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        combobox.set_items(&items);
        combobox
    }

    fn render(combobox: &mut Combobox) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(40, 16)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                combobox.draw(frame, Rect::new(0, 0, 30, 3), true);
                combobox.draw_dropdown(frame, area);
            })
            .unwrap();
        terminal
    }

    #[test]
    fn test_enter_emits_change_action() {
        let mut combobox = combobox(&["sys_user", "sys_role"]);
        assert_eq!(combobox.handle_key(key(KeyCode::Enter)), None);
        assert!(combobox.is_open());

        combobox.handle_key(key(KeyCode::Down));
        combobox.handle_key(key(KeyCode::Down));
        assert_eq!(
            combobox.handle_key(key(KeyCode::Enter)),
            Some(Action::TableChanged("sys_role".to_string()))
        );
        assert_eq!(combobox.value(), "sys_role");
    }

    #[test]
    fn test_typing_filters_rows() {
        let mut combobox = combobox(&["sys_user", "orders"]);
        combobox.handle_key(key(KeyCode::Char('o')));
        combobox.handle_key(key(KeyCode::Char('r')));
        assert_eq!(combobox.state().rows(), &["orders".to_string()][..]);
        assert!(combobox.is_open());
    }

    #[test]
    fn test_click_on_row_selects_it() {
        let mut combobox = combobox(&["a", "b", "c"]);
        render(&mut combobox);
        assert_eq!(combobox.handle_click(5, 1), ClickOutcome::Inside(None));
        assert!(combobox.is_open());
        render(&mut combobox);

        // Dropdown starts at y=3; its first row is y=4
        assert_eq!(
            combobox.handle_click(5, 5),
            ClickOutcome::Inside(Some(Action::TableChanged("b".to_string())))
        );
        assert!(!combobox.is_open());
    }

    #[test]
    fn test_click_on_dropdown_border_is_inert() {
        let mut combobox = combobox(&["a", "b"]);
        render(&mut combobox);
        combobox.handle_click(1, 1);
        render(&mut combobox);
        assert_eq!(combobox.handle_click(5, 3), ClickOutcome::Inside(None));
        assert!(combobox.is_open());
        assert_eq!(combobox.value(), "");
    }

    #[test]
    fn test_click_outside_closes() {
        let mut combobox = combobox(&["a", "b"]);
        render(&mut combobox);
        combobox.handle_click(1, 1);
        render(&mut combobox);
        assert_eq!(combobox.handle_click(39, 15), ClickOutcome::Outside);
        assert!(!combobox.is_open());
    }

    #[test]
    fn test_dropdown_renders_no_results_placeholder() {
        let mut combobox = combobox(&["a"]);
        combobox.handle_key(key(KeyCode::Char('z')));
        let terminal = render(&mut combobox);

        let buffer = terminal.backend().buffer();
        let row: String = (0..30)
            .map(|x| buffer[(x, 4)].symbol().to_string())
            .collect();
        // Wide glyphs are followed by blank filler cells
        assert!(row.replace(' ', "").contains(NO_RESULTS));
    }

    #[test]
    fn test_dropdown_height_is_capped() {
        let names: Vec<String> = (0..20).map(|i| format!("t{i}")).collect();
        let mut combobox = Combobox::new(ID, "数据表", Action::TableChanged);
        combobox.set_items(&names);
        render(&mut combobox);
        combobox.handle_click(1, 1);
        render(&mut combobox);

        let dropdown = combobox.dropdown_area.unwrap();
        assert_eq!(dropdown.height as usize, MAX_VISIBLE_ROWS + 2);
    }
}
