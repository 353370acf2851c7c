//! Event handling.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::application::services::Route;

/// Keys handled by the app before the active screen sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalKey {
    Quit,
    Navigate(Route),
    Logout,
    DismissToast,
}

/// Maps app-wide shortcuts.
#[must_use]
pub fn global_key(key: &KeyEvent) -> Option<GlobalKey> {
    if is_quit_event(key) {
        return Some(GlobalKey::Quit);
    }
    match (key.code, key.modifiers) {
        (KeyCode::F(1), _) => Some(GlobalKey::Navigate(Route::Builder)),
        (KeyCode::F(2), _) => Some(GlobalKey::Navigate(Route::Viewer)),
        (KeyCode::F(3), _) => Some(GlobalKey::Navigate(Route::Store)),
        (KeyCode::Char('l'), KeyModifiers::CONTROL) => Some(GlobalKey::Logout),
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Some(GlobalKey::DismissToast),
        _ => None,
    }
}

/// Checks if key is a quit event.
#[must_use]
pub fn is_quit_event(key: &KeyEvent) -> bool {
    matches!(
        key,
        KeyEvent {
            code: KeyCode::Char('c' | 'q'),
            modifiers: KeyModifiers::CONTROL,
            ..
        }
    )
}

/// Key presses only; releases and repeats reported by some terminals are dropped.
#[must_use]
pub fn key_press(event: &Event) -> Option<KeyEvent> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => Some(*key),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use test_case::test_case;

    fn make_key_event(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, modifiers, KeyEventKind::Press)
    }

    #[test]
    fn test_quit_events() {
        assert!(is_quit_event(&make_key_event(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(is_quit_event(&make_key_event(KeyCode::Char('q'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_plain_keys_are_not_quit_events() {
        assert!(!is_quit_event(&make_key_event(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(!is_quit_event(&make_key_event(KeyCode::Esc, KeyModifiers::NONE)));
    }

    #[test_case(KeyCode::F(1), KeyModifiers::NONE => Some(GlobalKey::Navigate(Route::Builder)) ; "f1 builder")]
    #[test_case(KeyCode::F(2), KeyModifiers::NONE => Some(GlobalKey::Navigate(Route::Viewer)) ; "f2 viewer")]
    #[test_case(KeyCode::F(3), KeyModifiers::NONE => Some(GlobalKey::Navigate(Route::Store)) ; "f3 store")]
    #[test_case(KeyCode::Char('l'), KeyModifiers::CONTROL => Some(GlobalKey::Logout) ; "ctrl l logout")]
    #[test_case(KeyCode::Char('d'), KeyModifiers::CONTROL => Some(GlobalKey::DismissToast) ; "ctrl d dismiss")]
    #[test_case(KeyCode::Char('l'), KeyModifiers::NONE => None ; "plain l is typed")]
    fn test_global_keys(code: KeyCode, modifiers: KeyModifiers) -> Option<GlobalKey> {
        global_key(&make_key_event(code, modifiers))
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = Event::Key(KeyEvent {
            code: KeyCode::Char('a'),
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        });
        assert_eq!(key_press(&release), None);

        let press = Event::Key(make_key_event(KeyCode::Char('a'), KeyModifiers::NONE));
        assert!(key_press(&press).is_some());
    }
}
