//! Searchable select state
//!
//! Filtering, open/close and keyboard navigation for one combobox instance.
//! Holds no terminal state; `components::combobox` renders it and feeds it
//! events. Time is passed in explicitly so the blur grace period is testable.

use std::time::{Duration, Instant};

/// Delay between losing focus and closing, so a row click still lands first
pub const BLUR_GRACE: Duration = Duration::from_millis(150);

/// Text of the non-selectable row shown when nothing matches
pub const NO_RESULTS: &str = "未找到匹配结果";

const DEFAULT_VIEWPORT_ROWS: usize = 6;

/// Identifies a combobox by its input surface and dropdown list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectId {
    pub input: &'static str,
    pub dropdown: &'static str,
}

/// Keys the dropdown reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Down,
    Up,
    Enter,
    Escape,
}

/// Items containing `term` case-insensitively, in source order
///
/// A blank term matches everything.
pub fn filter_items(items: &[String], term: &str) -> Vec<String> {
    let term = term.trim();
    if term.is_empty() {
        return items.to_vec();
    }

    let needle = term.to_lowercase();
    items
        .iter()
        .filter(|item| item.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

#[derive(Debug, Clone)]
pub struct ComboboxState {
    id: SelectId,
    /// Full unfiltered list
    source_items: Vec<String>,
    /// Last confirmed selection, empty if none
    selected: String,
    /// What the input currently shows (typed filter or confirmed value)
    text: String,
    /// Rendered rows; empty means the "no results" placeholder is shown
    rows: Vec<String>,
    /// Always `None` or `< rows.len()`
    highlight: Option<usize>,
    open: bool,
    scroll_offset: usize,
    viewport_rows: usize,
    blur_deadline: Option<Instant>,
}

impl ComboboxState {
    pub fn new(id: SelectId) -> Self {
        Self {
            id,
            source_items: Vec::new(),
            selected: String::new(),
            text: String::new(),
            rows: Vec::new(),
            highlight: None,
            open: false,
            scroll_offset: 0,
            viewport_rows: DEFAULT_VIEWPORT_ROWS,
            blur_deadline: None,
        }
    }

    pub fn id(&self) -> SelectId {
        self.id
    }

    /// Bind to a copy of `items` and re-render the rows against the current text
    ///
    /// The confirmed value survives; callers decide whether it is still valid.
    pub fn initialize(&mut self, items: &[String]) {
        self.source_items = items.to_vec();
        self.rows = filter_items(&self.source_items, &self.text);
        self.highlight = None;
        self.scroll_offset = 0;
        log::debug!(
            "{} bound to {} items ({})",
            self.id.input,
            self.source_items.len(),
            self.id.dropdown
        );
    }

    pub fn value(&self) -> &str {
        &self.selected
    }

    /// Force the confirmed value and mirror it into the text, without opening
    pub fn set_value(&mut self, value: &str) {
        self.selected = value.to_string();
        self.text = value.to_string();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_items(&self) -> &[String] {
        &self.source_items
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    /// True when the dropdown shows only the placeholder row
    pub fn shows_no_results(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_row_selected(&self, index: usize) -> bool {
        !self.selected.is_empty() && self.rows.get(index) == Some(&self.selected)
    }

    pub fn is_row_highlighted(&self, index: usize) -> bool {
        self.highlight == Some(index)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text editing
    // ─────────────────────────────────────────────────────────────────────────

    pub fn push_char(&mut self, c: char) {
        self.text.push(c);
        self.on_input();
    }

    pub fn backspace(&mut self) {
        self.text.pop();
        self.on_input();
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.on_input();
    }

    fn on_input(&mut self) {
        self.refilter();
        self.open = true;
    }

    fn refilter(&mut self) {
        self.rows = filter_items(&self.source_items, &self.text);
        self.highlight = None;
        self.scroll_offset = 0;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Open / close
    // ─────────────────────────────────────────────────────────────────────────

    /// Click on the input
    pub fn toggle(&mut self) {
        if self.open {
            self.close();
        } else {
            self.refilter();
            self.open = true;
        }
    }

    pub fn close(&mut self) {
        self.open = false;
        self.highlight = None;
    }

    /// Click somewhere that is neither the input nor its dropdown
    pub fn click_outside(&mut self) {
        self.close();
    }

    pub fn focus(&mut self) {
        self.blur_deadline = None;
        self.refilter();
    }

    pub fn blur(&mut self, now: Instant) {
        self.blur_deadline = Some(now + BLUR_GRACE);
    }

    /// Apply a pending blur once its grace period has elapsed
    ///
    /// Returns true if the blur fired on this call.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.blur_deadline {
            Some(deadline) if now >= deadline => {
                self.blur_deadline = None;
                self.close();
                if !self.source_items.contains(&self.text) {
                    self.text = self.selected.clone();
                }
                true
            }
            _ => false,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Selection & navigation
    // ─────────────────────────────────────────────────────────────────────────

    /// Confirm `value`, close, and hand it back for the change callback
    pub fn select(&mut self, value: &str) -> String {
        self.text = value.to_string();
        self.selected = value.to_string();
        self.close();
        log::debug!("{} selected {:?}", self.id.input, value);
        self.selected.clone()
    }

    /// Click on rendered row `index`; the placeholder row is not selectable
    pub fn click_row(&mut self, index: usize) -> Option<String> {
        let value = self.rows.get(index)?.clone();
        Some(self.select(&value))
    }

    /// Returns the confirmed value when the key completed a selection
    pub fn navigate(&mut self, key: NavKey) -> Option<String> {
        if !self.open || self.rows.is_empty() {
            if key == NavKey::Enter {
                self.toggle();
            }
            return None;
        }

        let count = self.rows.len();
        match key {
            NavKey::Down => {
                self.highlight = Some(match self.highlight {
                    None => 0,
                    Some(i) => (i + 1) % count,
                });
                self.ensure_visible();
            }
            NavKey::Up => {
                self.highlight = Some(match self.highlight {
                    None | Some(0) => count - 1,
                    Some(i) => i - 1,
                });
                self.ensure_visible();
            }
            NavKey::Enter => {
                let index = self.highlight.unwrap_or(0);
                let value = self.rows[index].clone();
                return Some(self.select(&value));
            }
            NavKey::Escape => self.close(),
        }
        None
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────────────────

    /// Called by the renderer with the number of rows that fit
    pub fn set_viewport_rows(&mut self, rows: usize) {
        self.viewport_rows = rows.max(1);
        self.ensure_visible();
    }

    fn ensure_visible(&mut self) {
        let Some(index) = self.highlight else {
            return;
        };
        if index < self.scroll_offset {
            self.scroll_offset = index;
        } else if index >= self.scroll_offset + self.viewport_rows {
            self.scroll_offset = index + 1 - self.viewport_rows;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: SelectId = SelectId {
        input: "databaseName",
        dropdown: "databaseDropdown",
    };

    fn items(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    fn combobox(names: &[&str]) -> ComboboxState {
        let mut state = ComboboxState::new(ID);
        state.initialize(&items(names));
        state
    }

    #[test]
    fn test_filter_matches_case_insensitive_substring() {
        let source = items(&["sys_user", "SYS_ROLE", "order_item", "UserLog"]);

        assert_eq!(filter_items(&source, "user"), items(&["sys_user", "UserLog"]));
        assert_eq!(filter_items(&source, "SYS"), items(&["sys_user", "SYS_ROLE"]));
        assert_eq!(filter_items(&source, ""), source);
        assert_eq!(filter_items(&source, "   "), source);
        assert!(filter_items(&source, "missing").is_empty());
    }

    #[test]
    fn test_filter_equals_exact_membership_for_every_term() {
        let source = items(&["alpha", "Beta", "gamma_beta", "delta", "ALPHABET"]);
        for term in ["a", "ph", "BET", "ta", "x", "alpha", "_"] {
            let expected: Vec<String> = source
                .iter()
                .filter(|s| s.to_lowercase().contains(&term.to_lowercase()))
                .cloned()
                .collect();
            assert_eq!(filter_items(&source, term), expected, "term {term:?}");
        }
    }

    #[test]
    fn test_filter_is_idempotent() {
        let source = items(&["crm", "CRM_archive", "erp", "ecrm"]);
        let once = filter_items(&source, "crm");
        let twice = filter_items(&once, "crm");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_initialize_copies_items() {
        let mut source = items(&["a", "b"]);
        let mut state = ComboboxState::new(ID);
        state.initialize(&source);
        source.push("c".to_string());

        assert_eq!(state.source_items(), &items(&["a", "b"])[..]);
        assert_eq!(state.rows().len(), 2);
        assert!(!state.is_open());
    }

    #[test]
    fn test_typing_filters_and_opens() {
        let mut state = combobox(&["sys_user", "sys_role", "orders"]);
        state.push_char('S');
        state.push_char('y');

        assert!(state.is_open());
        assert_eq!(state.rows(), &items(&["sys_user", "sys_role"])[..]);
        assert_eq!(state.highlight(), None);

        state.backspace();
        state.backspace();
        assert_eq!(state.rows().len(), 3);
    }

    #[test]
    fn test_no_match_shows_placeholder_and_enter_closes() {
        let mut state = combobox(&["a", "b"]);
        state.set_text("zzz");
        assert!(state.shows_no_results());
        assert!(state.is_open());

        assert_eq!(state.navigate(NavKey::Down), None);
        assert_eq!(state.highlight(), None);

        // Only the placeholder is shown, so Enter just toggles
        assert_eq!(state.navigate(NavKey::Enter), None);
        assert!(!state.is_open());
        assert_eq!(state.click_row(0), None);
    }

    #[test]
    fn test_enter_opens_closed_dropdown() {
        let mut state = combobox(&["a", "b"]);
        assert_eq!(state.navigate(NavKey::Enter), None);
        assert!(state.is_open());
        assert_eq!(state.value(), "");
    }

    #[test]
    fn test_arrows_ignored_while_closed() {
        let mut state = combobox(&["a", "b"]);
        state.navigate(NavKey::Down);
        assert_eq!(state.highlight(), None);
        assert!(!state.is_open());
    }

    #[test]
    fn test_down_cycles_with_period_n() {
        let mut state = combobox(&["a", "b", "c", "d"]);
        state.toggle();

        for _ in 0..5 {
            state.navigate(NavKey::Down);
        }
        assert_eq!(state.highlight(), Some(0));

        for _ in 0..4 {
            state.navigate(NavKey::Down);
        }
        assert_eq!(state.highlight(), Some(0));
    }

    #[test]
    fn test_up_cycles_with_period_n() {
        let mut state = combobox(&["a", "b", "c"]);
        state.toggle();

        state.navigate(NavKey::Up);
        assert_eq!(state.highlight(), Some(2));

        for _ in 0..3 {
            state.navigate(NavKey::Up);
        }
        assert_eq!(state.highlight(), Some(2));

        state.navigate(NavKey::Up);
        state.navigate(NavKey::Up);
        assert_eq!(state.highlight(), Some(0));
        state.navigate(NavKey::Up);
        assert_eq!(state.highlight(), Some(2));
    }

    #[test]
    fn test_enter_confirms_highlighted_row() {
        let mut state = combobox(&["a", "b", "c"]);
        state.toggle();
        state.navigate(NavKey::Down);
        state.navigate(NavKey::Down);

        assert_eq!(state.navigate(NavKey::Enter), Some("b".to_string()));
        assert_eq!(state.value(), "b");
        assert_eq!(state.text(), "b");
        assert!(!state.is_open());
        assert_eq!(state.highlight(), None);
    }

    #[test]
    fn test_enter_without_highlight_confirms_first_filtered_row() {
        let mut state = combobox(&["orders", "sys_user", "sys_role"]);
        state.set_text("sys");
        assert_eq!(state.navigate(NavKey::Enter), Some("sys_user".to_string()));
    }

    #[test]
    fn test_escape_closes_without_changing_selection() {
        let mut state = combobox(&["a", "b"]);
        state.set_value("a");
        state.toggle();
        state.navigate(NavKey::Down);
        state.navigate(NavKey::Down);

        assert_eq!(state.navigate(NavKey::Escape), None);
        assert!(!state.is_open());
        assert_eq!(state.highlight(), None);
        assert_eq!(state.value(), "a");
    }

    #[test]
    fn test_click_and_enter_confirm_identically() {
        let mut by_click = combobox(&["x", "y", "z"]);
        by_click.toggle();
        by_click.navigate(NavKey::Down);
        let clicked = by_click.click_row(1);

        let mut by_enter = combobox(&["x", "y", "z"]);
        by_enter.toggle();
        by_enter.navigate(NavKey::Down);
        by_enter.navigate(NavKey::Down);
        let entered = by_enter.navigate(NavKey::Enter);

        assert_eq!(clicked, entered);
        assert_eq!(by_click.value(), by_enter.value());
        assert_eq!(by_click.text(), by_enter.text());
        assert_eq!(by_click.is_open(), by_enter.is_open());
        assert_eq!(by_click.highlight(), by_enter.highlight());
    }

    #[test]
    fn test_set_value_round_trips_regardless_of_open_state() {
        let mut state = combobox(&["a", "b"]);
        state.set_value("b");
        assert_eq!(state.value(), "b");
        assert!(!state.is_open());

        state.toggle();
        state.set_value("a");
        assert_eq!(state.value(), "a");
        assert_eq!(state.text(), "a");
        assert!(state.is_open());
    }

    #[test]
    fn test_blur_waits_for_grace_then_reverts_free_text() {
        let mut state = combobox(&["sys_user", "orders"]);
        state.set_value("orders");
        state.set_text("sys");

        let t0 = Instant::now();
        state.blur(t0);
        assert!(!state.tick(t0 + Duration::from_millis(50)));
        assert!(state.is_open());
        assert_eq!(state.text(), "sys");

        assert!(state.tick(t0 + BLUR_GRACE));
        assert!(!state.is_open());
        assert_eq!(state.text(), "orders");
        assert_eq!(state.value(), "orders");
    }

    #[test]
    fn test_blur_clears_free_text_when_nothing_confirmed() {
        let mut state = combobox(&["sys_user"]);
        state.set_text("nope");
        let t0 = Instant::now();
        state.blur(t0);
        state.tick(t0 + BLUR_GRACE);
        assert_eq!(state.text(), "");
    }

    #[test]
    fn test_blur_keeps_exact_item_text() {
        let mut state = combobox(&["sys_user", "orders"]);
        state.set_text("orders");
        let t0 = Instant::now();
        state.blur(t0);
        state.tick(t0 + BLUR_GRACE);
        assert_eq!(state.text(), "orders");
        assert_eq!(state.value(), "");
    }

    #[test]
    fn test_click_during_grace_period_still_selects() {
        let mut state = combobox(&["a", "b"]);
        state.toggle();
        let t0 = Instant::now();
        state.blur(t0);

        assert_eq!(state.click_row(1), Some("b".to_string()));
        state.tick(t0 + BLUR_GRACE);
        assert_eq!(state.text(), "b");
        assert_eq!(state.value(), "b");
    }

    #[test]
    fn test_focus_cancels_pending_blur() {
        let mut state = combobox(&["a"]);
        state.toggle();
        let t0 = Instant::now();
        state.blur(t0);
        state.focus();
        assert!(!state.tick(t0 + BLUR_GRACE * 2));
    }

    #[test]
    fn test_highlight_scrolls_into_view() {
        let names: Vec<String> = (0..20).map(|i| format!("table_{i:02}")).collect();
        let mut state = ComboboxState::new(ID);
        state.initialize(&names);
        state.set_viewport_rows(5);
        state.toggle();

        for _ in 0..7 {
            state.navigate(NavKey::Down);
        }
        assert_eq!(state.highlight(), Some(6));
        assert_eq!(state.scroll_offset(), 2);

        state.navigate(NavKey::Up);
        state.navigate(NavKey::Up);
        state.navigate(NavKey::Up);
        state.navigate(NavKey::Up);
        state.navigate(NavKey::Up);
        assert_eq!(state.highlight(), Some(1));
        assert_eq!(state.scroll_offset(), 1);

        // Wrap to the bottom
        state.navigate(NavKey::Up);
        state.navigate(NavKey::Up);
        assert_eq!(state.highlight(), Some(19));
        assert_eq!(state.scroll_offset(), 15);
    }

    #[test]
    fn test_selected_and_highlighted_marks_are_independent() {
        let mut state = combobox(&["a", "b", "c"]);
        state.set_value("b");
        // Clearing the text shows every row while keeping the confirmed value
        state.set_text("");
        state.navigate(NavKey::Down);

        assert!(state.is_row_highlighted(0));
        assert!(!state.is_row_selected(0));
        assert!(state.is_row_selected(1));
        assert!(!state.is_row_highlighted(1));

        state.navigate(NavKey::Down);
        assert!(state.is_row_selected(1) && state.is_row_highlighted(1));
    }

    #[test]
    fn test_highlight_stays_valid_after_refilter() {
        let mut state = combobox(&["a1", "a2", "b1"]);
        state.toggle();
        state.navigate(NavKey::Up);
        assert_eq!(state.highlight(), Some(2));

        state.set_text("a");
        assert_eq!(state.highlight(), None);

        state.initialize(&items(&["only"]));
        assert_eq!(state.highlight(), None);
    }

    #[test]
    fn test_initialize_keeps_typed_filter() {
        let mut state = ComboboxState::new(ID);
        state.set_text("sys");
        state.initialize(&items(&["orders", "sys_user"]));

        assert_eq!(state.text(), "sys");
        assert_eq!(state.rows(), &items(&["sys_user"])[..]);
        assert_eq!(state.navigate(NavKey::Enter), Some("sys_user".to_string()));
    }
}
