//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that owns the wizard state, the two select widgets and the request runner.
//! Validation and response handling live in `WizardState`; the App routes
//! events, issues requests and keeps the selects in sync.

use crate::action::Action;
use crate::component::Component;
use crate::components::select::{
    build_select, ClickOutcome, SelectInput, DATABASE_SELECT, TABLE_SELECT,
};
use crate::components::text_input;
use crate::components::wizard::{button_label, draw_wizard, HitAreas, WizardRenderContext};
use crate::components::{rect_contains, HelpDialog, QuitDialog};
use crate::config::Config;
use crate::model::modal::{Modal, ModalStack};
use crate::model::wizard::{Field, RequestKind, Step, TablesOutcome, WizardState};
use crate::services::api::GeneratorApi;
use crate::services::request_runner::{ApiEvent, RequestRunner};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{layout::Rect, Frame};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    pub wizard: WizardState,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    /// Index into the current step's focus order
    focus: usize,

    database_select: Box<dyn SelectInput>,
    table_select: Box<dyn SelectInput>,

    /// Background request runner
    runner: RequestRunner,

    spinner_frame: usize,

    /// Clickable areas from the last frame
    hit_areas: HitAreas,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    pub fn new(config: &Config, api: Arc<dyn GeneratorApi>) -> App {
        log::info!(
            "Using generator backend at {} ({:?} selects)",
            config.server_url,
            config.select_widget
        );

        App {
            wizard: WizardState::new(config.defaults.clone()),
            modals: ModalStack::new(),
            should_quit: false,
            focus: 0,
            database_select: build_select(
                config.select_widget,
                DATABASE_SELECT,
                "数据库",
                Action::DatabaseChanged,
            ),
            table_select: build_select(
                config.select_widget,
                TABLE_SELECT,
                "数据表",
                Action::TableChanged,
            ),
            runner: RequestRunner::new(api, PathBuf::from(&config.download_dir)),
            spinner_frame: 0,
            hit_areas: HitAreas::new(),
            quit_dialog: QuitDialog::default(),
            help_dialog: HelpDialog::default(),
        }
    }

    pub fn focused_field(&self) -> Field {
        let fields = self.wizard.step.fields();
        fields[self.focus.min(fields.len() - 1)]
    }

    pub fn database_value(&self) -> &str {
        self.database_select.value()
    }

    pub fn table_value(&self) -> &str {
        self.table_select.value()
    }

    fn select_mut(&mut self, field: Field) -> Option<&mut Box<dyn SelectInput>> {
        match field {
            Field::Database => Some(&mut self.database_select),
            Field::Table => Some(&mut self.table_select),
            _ => None,
        }
    }

    fn text_mut(&mut self, field: Field) -> Option<&mut String> {
        match field {
            Field::DbUrl => Some(&mut self.wizard.connection.db_url),
            Field::DbUsername => Some(&mut self.wizard.connection.db_username),
            Field::DbPassword => Some(&mut self.wizard.connection.db_password),
            Field::PackageName => Some(&mut self.wizard.package_name),
            Field::OutputDir => Some(&mut self.wizard.output_dir),
            _ => None,
        }
    }

    /// Move focus, giving selects their focus/blur notifications
    fn set_focus(&mut self, index: usize) {
        let previous = self.focused_field();
        self.focus = index.min(self.wizard.step.fields().len() - 1);
        let current = self.focused_field();
        if previous == current {
            return;
        }

        let now = Instant::now();
        if let Some(select) = self.select_mut(previous) {
            select.blur(now);
        }
        if let Some(select) = self.select_mut(current) {
            select.focus();
        }
    }

    fn enter_step(&mut self, step: Step) {
        let previous = self.focused_field();
        if let Some(select) = self.select_mut(previous) {
            select.blur(Instant::now());
        }

        let table = self.table_select.value().to_string();
        self.wizard.go_to_step(step, &table);
        self.focus = 0;

        let current = self.focused_field();
        if let Some(select) = self.select_mut(current) {
            select.focus();
        }
    }

    /// The action a button triggers, if it is currently enabled
    fn button_action(&self, field: Field) -> Option<Action> {
        let (_, enabled) = button_label(field, &self.wizard);
        if !enabled {
            return None;
        }
        match field {
            Field::Connect => Some(Action::Connect),
            Field::BackToStep1 => Some(Action::BackToStep1),
            Field::NextToStep3 => Some(Action::NextToStep3),
            Field::BackToStep2 => Some(Action::BackToStep2),
            Field::Download => Some(Action::GenerateDownload),
            Field::GenerateOnServer => Some(Action::GenerateOnServer),
            Field::Reset => Some(Action::Reset),
            _ => None,
        }
    }

    /// Enter inside a text field submits the step
    fn submit_action(&self) -> Option<Action> {
        match self.wizard.step {
            Step::Connect => self.button_action(Field::Connect),
            Step::PickTable => Some(Action::NextToStep3),
            Step::Generate => self.button_action(Field::Download),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Requests
    // ─────────────────────────────────────────────────────────────────────────

    fn connect(&mut self) {
        if self.wizard.is_busy(RequestKind::Databases) {
            return;
        }
        match self.wizard.validate_connection() {
            Ok(connection) => {
                self.wizard.begin_databases();
                self.runner.list_databases(connection);
            }
            Err(e) => self.wizard.fail(e.to_string()),
        }
    }

    fn load_tables(&mut self, database: &str) {
        if database.is_empty() {
            self.wizard.abandon_tables();
            self.table_select.set_value("");
            return;
        }
        let request = self.wizard.begin_tables(database);
        self.runner
            .list_tables(self.wizard.tables_generation(), request);
    }

    fn generate(&mut self, download: bool) {
        if self.wizard.is_busy(RequestKind::Generate) {
            return;
        }
        let request = match self
            .wizard
            .build_generate_request(self.database_select.value(), self.table_select.value())
        {
            Ok(request) => request,
            Err(e) => {
                self.wizard.fail(e.to_string());
                return;
            }
        };

        self.wizard.begin_generate();
        if download {
            self.runner.generate_download(request);
        } else {
            self.runner.generate(request);
        }
    }

    fn reset(&mut self) {
        log::info!("Resetting wizard");
        self.wizard.reset();
        for select in [&mut self.database_select, &mut self.table_select] {
            select.set_items(&[]);
            select.set_value("");
        }
        self.focus = 0;
    }

    /// Drop the confirmed value if it is not among the new options
    fn sync_select(select: &mut dyn SelectInput, items: &[String]) {
        select.set_items(items);
        if !items.iter().any(|item| item == select.value()) {
            select.set_value("");
        }
    }

    fn apply_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Databases(result) => {
                if self.wizard.apply_databases(result) {
                    Self::sync_select(self.database_select.as_mut(), &self.wizard.database_list);
                    self.enter_step(Step::PickTable);
                }
            }
            ApiEvent::Tables {
                generation,
                database,
                result,
            } => match self.wizard.apply_tables(generation, &database, result) {
                TablesOutcome::Stale => {}
                TablesOutcome::Loaded => {
                    Self::sync_select(self.table_select.as_mut(), &self.wizard.table_list);
                }
                TablesOutcome::Cleared => self.table_select.set_value(""),
            },
            ApiEvent::Downloaded(result) => self.wizard.apply_download(result),
            ApiEvent::Generated(result) => self.wizard.apply_generate(result),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Event Routing
    // ─────────────────────────────────────────────────────────────────────────

    fn handle_global_key(&self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::ForceQuit),
                KeyCode::Char('q') => Some(Action::OpenQuitDialog),
                KeyCode::Char('r') => Some(Action::Reset),
                KeyCode::Char('p') => Some(Action::ApplySuggestion),
                _ => None,
            };
        }
        match key.code {
            KeyCode::F(1) => Some(Action::OpenHelp),
            KeyCode::Tab => Some(Action::FocusNext),
            KeyCode::BackTab => Some(Action::FocusPrev),
            _ => None,
        }
    }

    fn handle_field_key(&mut self, key: KeyEvent) -> Option<Action> {
        let field = self.focused_field();

        if let Some(select) = self.select_mut(field) {
            return select.handle_key(key);
        }

        if field.is_button() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.button_action(field),
                _ => None,
            };
        }

        if key.code == KeyCode::Enter {
            return self.submit_action();
        }
        if let Some(text) = self.text_mut(field) {
            text_input::edit(text, key);
        }
        None
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area),
            Modal::Help => self.help_dialog.draw(frame, area),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(modal) = self.modals.top().cloned() {
            // Ctrl+C always works
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Ok(Some(Action::ForceQuit));
            }
            return self.handle_modal_key_event(&modal, key);
        }

        if let Some(action) = self.handle_global_key(key) {
            return Ok(Some(action));
        }
        Ok(self.handle_field_key(key))
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if !self.modals.is_empty() || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return Ok(None);
        }
        let (column, row) = (mouse.column, mouse.row);

        if self.wizard.step == Step::PickTable {
            for field in [Field::Database, Field::Table] {
                let outcome = match self.select_mut(field) {
                    Some(select) => select.handle_click(column, row),
                    None => continue,
                };
                if let ClickOutcome::Inside(action) = outcome {
                    if let Some(index) = self.wizard.step.fields().iter().position(|f| *f == field) {
                        self.set_focus(index);
                    }
                    return Ok(action);
                }
            }
        }

        let hit = self
            .hit_areas
            .iter()
            .find(|(field, area)| !field.is_select() && rect_contains(*area, column, row))
            .map(|(field, _)| *field);

        let Some(field) = hit else {
            return Ok(None);
        };
        if let Some(index) = self.wizard.step.fields().iter().position(|f| *f == field) {
            self.set_focus(index);
        }
        if field.is_button() {
            return Ok(self.button_action(field));
        }
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        if action != Action::Tick {
            log::debug!("Action: {}", action);
        }
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                let now = Instant::now();
                self.database_select.tick(now);
                self.table_select.tick(now);

                for event in self.runner.poll() {
                    self.apply_event(event);
                }
                if self.wizard.any_busy() {
                    self.spinner_frame = self.spinner_frame.wrapping_add(1);
                }
            }
            Action::Resize(_, _) => {}
            Action::ForceQuit => {
                self.should_quit = true;
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.requests_pending = self.wizard.any_busy();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::CloseModal => {
                self.modals.pop();
            }

            // ─────────────────────────────────────────────────────────────────
            // Focus
            // ─────────────────────────────────────────────────────────────────
            Action::FocusNext => {
                let count = self.wizard.step.fields().len();
                self.set_focus((self.focus + 1) % count);
            }
            Action::FocusPrev => {
                let count = self.wizard.step.fields().len();
                self.set_focus((self.focus + count - 1) % count);
            }

            // ─────────────────────────────────────────────────────────────────
            // Wizard Steps
            // ─────────────────────────────────────────────────────────────────
            Action::Connect => self.connect(),
            Action::BackToStep1 => self.enter_step(Step::Connect),
            Action::NextToStep3 => {
                match self
                    .wizard
                    .validate_selection(self.database_select.value(), self.table_select.value())
                {
                    Ok(()) => self.enter_step(Step::Generate),
                    Err(e) => self.wizard.fail(e.to_string()),
                }
            }
            Action::BackToStep2 => self.enter_step(Step::PickTable),
            Action::GenerateDownload => self.generate(true),
            Action::GenerateOnServer => self.generate(false),
            Action::Reset => self.reset(),
            Action::ApplySuggestion => {
                if self.wizard.step == Step::Generate {
                    let table = self.table_select.value().to_string();
                    self.wizard.apply_suggestion(&table);
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Select Changes
            // ─────────────────────────────────────────────────────────────────
            Action::DatabaseChanged(database) => self.load_tables(&database),
            Action::TableChanged(table) => {
                log::debug!("Table selected: {}", table);
            }
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let ctx = WizardRenderContext {
            wizard: &self.wizard,
            focused: self.modals.is_empty().then(|| self.focused_field()),
            spinner_frame: self.spinner_frame,
        };
        self.hit_areas = draw_wizard(
            frame,
            area,
            &ctx,
            self.database_select.as_mut(),
            self.table_select.as_mut(),
        );

        // Draw modal overlay if active
        if let Some(modal) = self.modals.top().cloned() {
            self.draw_modal(frame, area, &modal)?;
        }
        Ok(())
    }
}
