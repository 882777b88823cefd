//! Single-line text field used by the connection and generate forms

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Apply an editing key to `value`; returns true if the key was consumed
pub fn edit(value: &mut String, key: KeyEvent) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT) {
        return false;
    }
    match key.code {
        KeyCode::Char(c) => {
            value.push(c);
            true
        }
        KeyCode::Backspace => {
            value.pop();
            true
        }
        _ => false,
    }
}

/// The longest suffix of `text` that fits in `width` terminal columns
pub fn visible_tail(text: &str, width: usize) -> &str {
    if text.width() <= width {
        return text;
    }
    let mut used = 0;
    let mut start = text.len();
    for (index, c) in text.char_indices().rev() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = index;
    }
    &text[start..]
}

pub struct TextInputView<'a> {
    pub label: &'a str,
    pub value: &'a str,
    pub masked: bool,
    pub focused: bool,
}

pub fn draw_text_input(frame: &mut Frame, area: Rect, view: &TextInputView) {
    let shown = if view.masked {
        "•".repeat(view.value.chars().count())
    } else {
        view.value.to_string()
    };

    // Leave room for the cursor cell
    let inner_width = area.width.saturating_sub(3) as usize;
    let mut spans = vec![Span::styled(
        visible_tail(&shown, inner_width).to_string(),
        Style::default().fg(Color::White),
    )];
    if view.focused {
        spans.push(Span::styled("_", Style::default().fg(Color::Cyan)));
    }

    let border_style = if view.focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let title_style = if view.focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", view.label))
            .title_style(title_style),
    );
    frame.render_widget(paragraph, area);
}
