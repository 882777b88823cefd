//! crud-gen-tui - A terminal wizard for the CRUD code generator
//!
//! Connects to a database through the generator backend, picks a table and
//! generates code, either downloaded as an archive or written on the server.
//! It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod error;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::config::Config;
use crate::services::api::HttpGeneratorApi;
use crate::tui::{Ticker, Tui};
use anyhow::{Context, Result};
use crossterm::event::Event;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn main() -> Result<()> {
    if let Some(log_dir) = Config::config_dir().map(|dir| dir.join("logs")) {
        if let Err(e) = logging::initialize(&log_dir) {
            eprintln!("Warning: logging disabled: {}", e);
        }
    }

    let config = Config::load_or_init();
    let api = HttpGeneratorApi::new(&config.server_url, config.request_timeout())
        .context("Failed to build HTTP client")?;

    // Create app state
    let mut app = App::new(&config, Arc::new(api));
    app.init()?;

    // Setup terminal
    let mut tui = Tui::new()?.with_tick_rate(Duration::from_millis(100));
    tui.enter()?;

    // Main event loop
    let result = run_app(&mut tui, &mut app);

    // Cleanup terminal
    tui.exit()?;

    // Handle any errors
    if let Err(err) = result {
        log::error!("Exiting with error: {:?}", err);
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }

    log::info!("Exiting");
    Ok(())
}

/// Run the main application loop
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    let mut ticker = Ticker::new(tui.tick_rate, Instant::now());

    while !app.should_quit {
        // Draw the UI
        tui.draw(|frame| {
            let area = frame.area();
            if let Err(e) = app.draw(frame, area) {
                log::error!("Draw error: {}", e);
            }
        })?;

        // Poll for events
        if let Some(event) = tui.next_event()? {
            // Convert event to action
            let action = match event {
                Event::Key(key) => app.handle_key_event(key)?,
                Event::Mouse(mouse) => app.handle_mouse_event(mouse)?,
                Event::Resize(w, h) => Some(Action::Resize(w, h)),
                _ => None,
            };

            // Action might produce a follow-up action
            let mut current_action = action;
            while let Some(a) = current_action {
                current_action = app.update(a)?;
            }
        }

        // Tick on schedule even while events keep arriving (mouse motion)
        if ticker.due(Instant::now()) {
            app.update(Action::Tick)?;
        }
    }

    Ok(())
}
