//! Event handling for the Scan & Tell TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, Focus};

/// Result of handling an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle a key event
fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    // Global shortcuts (always work)
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => return EventResult::Quit,
            _ if app.has_overlay() => {}
            KeyCode::Char('s') => app.save(),
            KeyCode::Char('e') if app.assistant_ready() => app.complete_story(),
            KeyCode::Char('n') if app.assistant_ready() => app.new_session(),
            _ => return EventResult::Continue,
        }
        return EventResult::NeedsRedraw;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    match key.code {
        KeyCode::F(1) => app.toggle_help(),
        KeyCode::F(2) => app.toggle_settings(),
        KeyCode::F(3) => app.toggle_assistant(),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Esc => {
            if app.game.settings_visible() {
                app.toggle_settings();
            }
            app.focus = Focus::Object;
        }
        KeyCode::Enter => match app.focus {
            Focus::Object => app.scan(),
            Focus::Key => app.focus = Focus::Object,
            Focus::Message => app.send_message(),
        },
        KeyCode::Up => app.scroll_up(1),
        KeyCode::Down => app.scroll_down(1),
        KeyCode::PageUp => app.scroll_up(10),
        KeyCode::PageDown => app.scroll_down(10),
        KeyCode::Backspace => app.backspace(),
        KeyCode::Delete => app.delete(),
        KeyCode::Left => app.cursor_left(),
        KeyCode::Right => app.cursor_right(),
        KeyCode::Home => app.cursor_home(),
        KeyCode::End => app.cursor_end(),
        KeyCode::Char(c) => app.type_char(c),
        _ => return EventResult::Continue,
    }
    EventResult::NeedsRedraw
}

fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tell_core::{KeyStore, SessionConfig};

    fn press(app: &mut App, code: KeyCode) -> EventResult {
        handle_event(app, Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn ctrl(app: &mut App, c: char) -> EventResult {
        handle_event(
            app,
            Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)),
        )
    }

    fn app() -> App {
        App::new(SessionConfig::default(), KeyStore::new())
    }

    #[test]
    fn test_type_scan_save() {
        let mut app = app();
        for c in "kettle".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);
        assert_eq!(
            app.game.current_story().map(|s| s.title.as_str()),
            Some("The Tale of the kettle")
        );

        ctrl(&mut app, 's');
        assert_eq!(app.game.storybook().len(), 1);
        assert_eq!(app.game.input(), "");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        assert_eq!(ctrl(&mut app, 'c'), EventResult::Quit);
        assert_eq!(ctrl(&mut app, 'q'), EventResult::Quit);
        // Plain 'q' is text.
        assert_eq!(press(&mut app, KeyCode::Char('q')), EventResult::NeedsRedraw);
        assert_eq!(app.buffer(Focus::Object).text(), "q");
    }

    #[test]
    fn test_function_keys_toggle_panels() {
        let mut app = app();
        press(&mut app, KeyCode::F(2));
        assert!(app.game.settings_visible());
        assert_eq!(app.focus, Focus::Key);
        press(&mut app, KeyCode::Esc);
        assert!(!app.game.settings_visible());
        assert_eq!(app.focus, Focus::Object);

        press(&mut app, KeyCode::F(3));
        assert!(app.show_assistant);

        press(&mut app, KeyCode::F(1));
        assert!(app.has_overlay());
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.buffer(Focus::Object).text(), "");
        press(&mut app, KeyCode::Esc);
        assert!(!app.has_overlay());
    }
}
