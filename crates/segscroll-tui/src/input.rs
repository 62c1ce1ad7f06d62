use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::app::{App, Mode};
use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollUp,
    ScrollDown,
    ScrollHalfPageDown,
    ScrollHalfPageUp,
    JumpToTop,
    JumpToBottom,
    PendingG, // First 'g' press, waiting for second 'g'
    NextSegment,
    PrevSegment,
    /// Tap the tab at this index (digit keys, mouse)
    SelectSegment(usize),
    SwipeNext,
    SwipePrev,
    ToggleHelp,
    ExitMode,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App, keymap: &Keymap) -> Action {
    if app.mode == Mode::Help {
        // Any key closes help
        return Action::ExitMode;
    }

    let binding = KeyBinding::new(key.code, normalize_modifiers(key.code, key.modifiers));

    if keymap.is_g_prefix(&binding) {
        if app.pending_key == Some('g') {
            return keymap.get_pending_g_action().cloned().unwrap_or(Action::None);
        }
        return Action::PendingG;
    }

    if let Some(action) = keymap.get(&binding) {
        return action.clone();
    }

    match (binding.code, binding.modifiers) {
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Action::SelectSegment(c as usize - '1' as usize)
        }
        _ => Action::None,
    }
}

/// Translate a mouse event. Clicks on the segment bar tap a tab, the wheel
/// scrolls the visible page.
pub fn handle_mouse_event(mouse: MouseEvent, app: &App) -> Action {
    if app.mode == Mode::Help {
        return Action::None;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let position = Position::new(mouse.column, mouse.row);
            if !app.segment_bar_area.contains(position) {
                return Action::None;
            }
            app.tab_bar()
                .index_at(mouse.column)
                .map(Action::SelectSegment)
                .unwrap_or(Action::None)
        }
        MouseEventKind::ScrollDown => Action::ScrollDown,
        MouseEventKind::ScrollUp => Action::ScrollUp,
        _ => Action::None,
    }
}

/// Terminals disagree on whether shifted punctuation carries SHIFT; only
/// letters and special keys keep it.
fn normalize_modifiers(code: KeyCode, modifiers: KeyModifiers) -> KeyModifiers {
    match code {
        KeyCode::Char(c) if !c.is_ascii_alphabetic() => modifiers - KeyModifiers::SHIFT,
        _ => modifiers,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyEventKind;
    use ratatui::layout::Rect;
    use segscroll_core::AppConfig;

    use super::*;
    use crate::app::SegmentSpec;
    use crate::theme::Theme;

    fn app() -> App {
        let segments = ["One", "Two", "Three"]
            .into_iter()
            .map(|title| SegmentSpec {
                title: Some(title.to_string()),
                lines: vec!["x".to_string(); 5],
            })
            .collect();
        App::new(Arc::new(AppConfig::default()), Theme::default(), segments).unwrap()
    }

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn click(column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn test_configured_keys() {
        let app = app();
        let keymap = Keymap::default();
        assert_eq!(
            handle_key_event(key(KeyCode::Char('k'), KeyModifiers::NONE), &app, &keymap),
            Action::ScrollUp
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('l'), KeyModifiers::NONE), &app, &keymap),
            Action::SwipeNext
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('G'), KeyModifiers::SHIFT), &app, &keymap),
            Action::JumpToBottom
        );
    }

    #[test]
    fn test_shifted_punctuation() {
        let app = app();
        let keymap = Keymap::default();
        assert_eq!(
            handle_key_event(key(KeyCode::Char('?'), KeyModifiers::SHIFT), &app, &keymap),
            Action::ToggleHelp
        );
    }

    #[test]
    fn test_gg_sequence() {
        let mut app = app();
        let keymap = Keymap::default();
        let g = key(KeyCode::Char('g'), KeyModifiers::NONE);

        assert_eq!(handle_key_event(g, &app, &keymap), Action::PendingG);
        app.pending_key = Some('g');
        assert_eq!(handle_key_event(g, &app, &keymap), Action::JumpToTop);
    }

    #[test]
    fn test_digits_select_segments() {
        let app = app();
        let keymap = Keymap::default();
        assert_eq!(
            handle_key_event(key(KeyCode::Char('2'), KeyModifiers::NONE), &app, &keymap),
            Action::SelectSegment(1)
        );
    }

    #[test]
    fn test_help_mode_swallows_keys() {
        let mut app = app();
        app.mode = Mode::Help;
        let event = KeyEvent {
            kind: KeyEventKind::Press,
            ..key(KeyCode::Char('j'), KeyModifiers::NONE)
        };
        assert_eq!(handle_key_event(event, &app, &Keymap::default()), Action::ExitMode);
    }

    #[test]
    fn test_click_on_segment_bar() {
        let mut app = app();
        app.segment_bar_area = Rect::new(0, 8, 30, 2);
        app.tab_bar_mut().set_regions(vec![(0, 10), (10, 20), (20, 30)]);

        assert_eq!(handle_mouse_event(click(12, 8), &app), Action::SelectSegment(1));
        assert_eq!(handle_mouse_event(click(12, 3), &app), Action::None);
    }

    #[test]
    fn test_wheel_scrolls() {
        let app = app();
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            ..click(0, 0)
        };
        assert_eq!(handle_mouse_event(wheel, &app), Action::ScrollUp);
    }
}
