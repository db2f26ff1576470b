use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::app_state::{AppState, InputMode};
use crate::error::SubmitRejected;
use crate::ui_components::ScrollDirection;

const WHEEL_SCROLL_LINES: usize = 3;

/// Handles one key press. Returns `true` when the app should quit.
pub async fn handle_key_event(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    if key.kind != KeyEventKind::Press {
        return Ok(false);
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(true);
    }

    // Handle help screen
    if app.show_help {
        match key.code {
            KeyCode::F(1) | KeyCode::Esc => app.show_help = false,
            KeyCode::PageUp | KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
            KeyCode::PageDown | KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
            _ => {}
        }
        return Ok(false);
    }

    match app.mode {
        InputMode::AttachPath => handle_attach_key(app, key).await,
        InputMode::Compose => handle_compose_key(app, key),
    }
}

async fn handle_attach_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => app.leave_attach_mode(),
        KeyCode::Enter => app.attach_from_input().await,
        _ => {
            app.path_input.input(key);
        }
    }
    Ok(false)
}

fn handle_compose_key(app: &mut AppState, key: KeyEvent) -> Result<bool> {
    match (key.code, key.modifiers) {
        (KeyCode::Esc, _) => {
            app.should_quit = true;
            return Ok(true);
        }
        (KeyCode::F(1), _) => {
            app.show_help = true;
            app.help_scroll = 0;
        }

        // Scrolling
        (KeyCode::PageUp, _) => app.messages_view.scroll_up(5),
        (KeyCode::PageDown, _) => app.messages_view.scroll_down(5),
        (KeyCode::Up, KeyModifiers::CONTROL) => app.messages_view.scroll_up(1),
        (KeyCode::Down, KeyModifiers::CONTROL) => app.messages_view.scroll_down(1),
        (KeyCode::Home, KeyModifiers::CONTROL) => app.messages_view.scroll_to_top(),
        (KeyCode::End, KeyModifiers::CONTROL) => app.messages_view.scroll_to_bottom(),

        // Attachment control
        (KeyCode::Char('o'), KeyModifiers::CONTROL) => app.enter_attach_mode(),
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => app.remove_attachment(),

        // Alt+Enter or Shift+Enter adds a new line
        (KeyCode::Enter, m) if m.intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) => {
            if !app.is_busy() {
                app.textarea.insert_newline();
            }
        }
        (KeyCode::Enter, _) => match app.send_message() {
            Ok(()) | Err(SubmitRejected::Empty) => {}
            Err(SubmitRejected::Busy) => debug!("Enter ignored while a reply is pending"),
        },

        _ => {
            // Input is locked while a reply is pending
            if !app.is_busy() {
                app.textarea.input(key);
            }
        }
    }
    Ok(false)
}

/// Scrolls the help screen or the transcript with the mouse wheel.
pub fn handle_mouse_event(app: &mut AppState, mouse: MouseEvent) {
    let direction = match mouse.kind {
        MouseEventKind::ScrollUp => ScrollDirection::Up,
        MouseEventKind::ScrollDown => ScrollDirection::Down,
        _ => return,
    };

    if app.show_help {
        app.help_scroll = match direction {
            ScrollDirection::Up => app.help_scroll.saturating_sub(1),
            ScrollDirection::Down => app.help_scroll.saturating_add(1),
        };
    } else {
        app.messages_view
            .handle_scroll_event(direction, WHEEL_SCROLL_LINES);
    }
}

/// Inserts pasted text into whichever input is active.
pub fn handle_paste(app: &mut AppState, data: &str) {
    match app.mode {
        InputMode::AttachPath => {
            // Paths are single-line; terminals often append a newline on drag-and-drop.
            app.path_input.insert_str(data.trim());
        }
        InputMode::Compose if !app.is_busy() => {
            debug!("Paste event detected with {} characters", data.len());
            app.textarea.insert_str(data);
        }
        InputMode::Compose => {}
    }
}
