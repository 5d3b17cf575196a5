mod console;
mod crawler;
mod input;
mod time;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use crawler::config::CrawlerConfig;
use crawler::dialogue::{Narrator, PageLines};
use crawler::state::CrawlerState;
use crawler::CrawlerGame;
use input::{key_to_char, ClickState, InputEvent};
use ratzilla::event::{MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};
use time::PerformanceClock;

/// Resolve a pointer position to the action under it, using the grid
/// container's bounding rect.
fn tap_action(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<u16> {
    let document = web_sys::window()?.document()?;
    // DomBackend creates a <div> as the grid container inside <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();
    cs.action_at(
        mouse_x as f64 - rect.left(),
        mouse_y as f64 - rect.top(),
        rect.width(),
        rect.height(),
    )
}

/// Text of a `<script type="application/json">` element on the page.
fn page_json(id: &str) -> Option<String> {
    web_sys::window()?.document()?.get_element_by_id(id)?.text_content()
}

/// Page configuration from `#crawler-config`.
/// Missing element → defaults; invalid JSON or values → warning + defaults.
fn load_config() -> CrawlerConfig {
    let Some(text) = page_json("crawler-config") else {
        return CrawlerConfig::default();
    };
    match CrawlerConfig::from_json(&text) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(%err, "ignoring page config");
            CrawlerConfig::default()
        }
    }
}

/// Optional narration lines from `#crawler-dialogue`.
fn load_page_lines() -> Option<PageLines> {
    let text = page_json("crawler-dialogue")?;
    match PageLines::from_json(&text) {
        Ok(lines) => Some(lines),
        Err(err) => {
            tracing::warn!(%err, "ignoring page dialogue");
            None
        }
    }
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    console::init_logging();

    let config = load_config();
    let seed = js_sys::Date::now() as u64;
    tracing::info!(?config, seed, "starting maze crawler");

    let mut narrator = Narrator::new(Box::new(PerformanceClock), &config);
    if let Some(lines) = load_page_lines() {
        narrator = narrator.with_source(Box::new(lines));
    }
    let game = Rc::new(RefCell::new(CrawlerGame::new(CrawlerState::new(config, narrator, seed))));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    // Mouse/touch click handler
    terminal.on_mouse_event({
        let game = game.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }

            let action = tap_action(mouse_event.x, mouse_event.y, &click_state.borrow());
            if let Some(id) = action {
                game.borrow_mut().handle_input(&InputEvent::Click(id));
            }
        }
    });

    // Keyboard handler
    terminal.on_key_event({
        let game = game.clone();
        move |key_event| {
            if let Some(ch) = key_to_char(&key_event.code) {
                game.borrow_mut().handle_input(&InputEvent::Key(ch));
            }
        }
    });

    terminal.draw_web({
        let click_state = click_state.clone();
        move |f| {
            let size = f.area();

            click_state.borrow_mut().begin_frame(size.width, size.height);
            game.borrow().render(f, size, &click_state);
        }
    });

    Ok(())
}
