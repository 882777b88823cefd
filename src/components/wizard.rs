//! Wizard screen rendering
//!
//! Draws the step badges, the active step's form, the result notice and the
//! help bar. Returns the screen area of every focusable element so the App
//! can route mouse clicks.

use crate::components::layout::calculate_wizard_layout;
use crate::components::select::SelectInput;
use crate::components::text_input::{draw_text_input, TextInputView};
use crate::model::wizard::{Field, RequestKind, Step, WizardState};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const FORM_MAX_WIDTH: u16 = 72;
const FIELD_HEIGHT: u16 = 3;

/// Clickable areas from the last draw
pub type HitAreas = Vec<(Field, Rect)>;

/// Context needed for rendering the wizard screen
pub struct WizardRenderContext<'a> {
    pub wizard: &'a WizardState,
    pub focused: Option<Field>,
    /// Advances once per tick while a request is in flight
    pub spinner_frame: usize,
}

/// Label and enabled state for a button, accounting for in-flight requests
pub fn button_label(field: Field, wizard: &WizardState) -> (&'static str, bool) {
    match field {
        Field::Connect if wizard.is_busy(RequestKind::Databases) => ("连接中...", false),
        Field::Download | Field::GenerateOnServer if wizard.is_busy(RequestKind::Generate) => {
            ("生成中...", false)
        }
        Field::Connect => ("连接数据库", true),
        Field::NextToStep3 => ("下一步", true),
        Field::BackToStep1 | Field::BackToStep2 => ("上一步", true),
        Field::Download => ("开始生成代码", true),
        Field::GenerateOnServer => ("生成到服务器", true),
        Field::Reset => ("重置", true),
        _ => ("", false),
    }
}

/// Draw the wizard screen
pub fn draw_wizard(
    frame: &mut Frame,
    area: Rect,
    ctx: &WizardRenderContext,
    database_select: &mut dyn SelectInput,
    table_select: &mut dyn SelectInput,
) -> HitAreas {
    let layout = calculate_wizard_layout(area);
    let mut hits = HitAreas::new();

    render_header(frame, layout.header, ctx.wizard.step);

    let step = ctx.wizard.step;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(format!(" 步骤 {}: {} ", step.number(), step.title()))
        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));
    let inner = block.inner(layout.body);
    frame.render_widget(block, layout.body);
    let form = centered_column(inner, FORM_MAX_WIDTH);

    match step {
        Step::Connect => render_connect(frame, form, ctx, &mut hits),
        Step::PickTable => {
            render_pick_table(frame, form, ctx, database_select, table_select, &mut hits)
        }
        Step::Generate => render_generate(frame, form, ctx, &mut hits),
    }

    render_notice(frame, layout.notice, ctx);
    render_help_bar(frame, layout.help, step);

    // Dropdowns last so they overlap the buttons below
    if step == Step::PickTable {
        database_select.draw_dropdown(frame, area);
        table_select.draw_dropdown(frame, area);
    }

    hits
}

fn centered_column(area: Rect, max_width: u16) -> Rect {
    let width = area.width.min(max_width);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + 1u16.min(area.height),
        width,
        area.height.saturating_sub(1),
    )
}

fn form_rows(area: Rect, heights: &[u16]) -> Vec<Rect> {
    let mut constraints: Vec<Constraint> = heights.iter().map(|h| Constraint::Length(*h)).collect();
    constraints.push(Constraint::Min(0));
    Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area)
        .to_vec()
}

fn render_header(frame: &mut Frame, area: Rect, current: Step) {
    let mut spans = vec![Span::raw(" ")];
    for (i, step) in Step::all().iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" ─── ", Style::default().fg(Color::DarkGray)));
        }
        let style = if *step == current {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else if step.number() < current.number() {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(
            format!(" {} {} ", step.number(), step.title()),
            style,
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" CRUD 代码生成器 ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(paragraph, area);
}

fn render_text_field(
    frame: &mut Frame,
    area: Rect,
    field: Field,
    value: &str,
    ctx: &WizardRenderContext,
    hits: &mut HitAreas,
) {
    let view = TextInputView {
        label: field.label(),
        value,
        masked: field == Field::DbPassword,
        focused: ctx.focused == Some(field),
    };
    draw_text_input(frame, area, &view);
    hits.push((field, area));
}

fn render_buttons(
    frame: &mut Frame,
    area: Rect,
    buttons: &[Field],
    ctx: &WizardRenderContext,
    hits: &mut HitAreas,
) {
    let constraints: Vec<Constraint> = buttons
        .iter()
        .map(|_| Constraint::Ratio(1, buttons.len() as u32))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (field, cell) in buttons.iter().zip(cells.iter()) {
        let (label, enabled) = button_label(*field, ctx.wizard);
        let focused = ctx.focused == Some(*field);
        let style = if !enabled {
            Style::default().fg(Color::DarkGray)
        } else if focused {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let button = Paragraph::new(Line::from(Span::styled(format!(" {} ", label), style)))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).border_style(border_style));
        frame.render_widget(button, *cell);
        hits.push((*field, *cell));
    }
}

fn render_connect(frame: &mut Frame, area: Rect, ctx: &WizardRenderContext, hits: &mut HitAreas) {
    let rows = form_rows(area, &[FIELD_HEIGHT, FIELD_HEIGHT, FIELD_HEIGHT, 1, FIELD_HEIGHT]);
    let connection = &ctx.wizard.connection;

    render_text_field(frame, rows[0], Field::DbUrl, &connection.db_url, ctx, hits);
    render_text_field(frame, rows[1], Field::DbUsername, &connection.db_username, ctx, hits);
    render_text_field(frame, rows[2], Field::DbPassword, &connection.db_password, ctx, hits);
    render_buttons(frame, rows[4], &[Field::Connect], ctx, hits);
}

fn render_pick_table(
    frame: &mut Frame,
    area: Rect,
    ctx: &WizardRenderContext,
    database_select: &mut dyn SelectInput,
    table_select: &mut dyn SelectInput,
    hits: &mut HitAreas,
) {
    let rows = form_rows(area, &[FIELD_HEIGHT, FIELD_HEIGHT, 1, FIELD_HEIGHT]);

    database_select.draw(frame, rows[0], ctx.focused == Some(Field::Database));
    hits.push((Field::Database, rows[0]));
    table_select.draw(frame, rows[1], ctx.focused == Some(Field::Table));
    hits.push((Field::Table, rows[1]));

    if ctx.wizard.is_busy(RequestKind::Tables) {
        let loading = Paragraph::new(Span::styled(
            " 正在加载表列表...",
            Style::default().fg(Color::Yellow),
        ));
        frame.render_widget(loading, rows[2]);
    }

    render_buttons(frame, rows[3], &[Field::BackToStep1, Field::NextToStep3], ctx, hits);
}

fn render_generate(frame: &mut Frame, area: Rect, ctx: &WizardRenderContext, hits: &mut HitAreas) {
    let rows = form_rows(area, &[FIELD_HEIGHT, 1, FIELD_HEIGHT, 1, FIELD_HEIGHT]);
    let wizard = ctx.wizard;

    render_text_field(frame, rows[0], Field::PackageName, &wizard.package_name, ctx, hits);
    let hint = Paragraph::new(Line::from(vec![
        Span::styled(
            format!(" {}", wizard.package_hint),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled("  (Ctrl+P 采用)", Style::default().fg(Color::DarkGray)),
    ]));
    frame.render_widget(hint, rows[1]);

    render_text_field(frame, rows[2], Field::OutputDir, &wizard.output_dir, ctx, hits);
    render_buttons(
        frame,
        rows[4],
        &[
            Field::BackToStep2,
            Field::Download,
            Field::GenerateOnServer,
            Field::Reset,
        ],
        ctx,
        hits,
    );
}

fn render_notice(frame: &mut Frame, area: Rect, ctx: &WizardRenderContext) {
    let line = if ctx.wizard.any_busy() {
        let spinner = SPINNER_FRAMES[ctx.spinner_frame % SPINNER_FRAMES.len()];
        Line::from(Span::styled(
            format!(" {} 请稍候...", spinner),
            Style::default().fg(Color::Yellow),
        ))
    } else {
        match &ctx.wizard.notice {
            Some(notice) if notice.success => Line::from(Span::styled(
                format!(" ✓ {}", notice.message),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Some(notice) => Line::from(Span::styled(
                format!(" ✗ {}", notice.message),
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            None => Line::from(""),
        }
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

fn render_help_bar(frame: &mut Frame, area: Rect, step: Step) {
    let key_style = |color: Color| Style::default().fg(color).add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(" Tab ", key_style(Color::Cyan)),
        Span::raw("切换 "),
        Span::styled(" Enter ", key_style(Color::Green)),
        Span::raw("确认 "),
    ];
    match step {
        Step::PickTable => {
            spans.push(Span::styled(" ↑↓ ", key_style(Color::Cyan)));
            spans.push(Span::raw("选择 "));
            spans.push(Span::styled(" Esc ", key_style(Color::Yellow)));
            spans.push(Span::raw("收起 "));
        }
        Step::Generate => {
            spans.push(Span::styled(" Ctrl+P ", key_style(Color::Cyan)));
            spans.push(Span::raw("采用建议包名 "));
        }
        Step::Connect => {}
    }
    spans.extend([
        Span::styled(" Ctrl+R ", key_style(Color::Magenta)),
        Span::raw("重置 "),
        Span::styled(" F1 ", key_style(Color::White)),
        Span::raw("帮助 "),
        Span::styled(" Ctrl+Q ", key_style(Color::Yellow)),
        Span::raw("退出"),
    ]);

    let paragraph = Paragraph::new(Line::from(spans)).alignment(Alignment::Left);
    frame.render_widget(paragraph, area);
}
