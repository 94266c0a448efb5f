//! Key bindings
//!
//! Maps raw crossterm key events to semantic [`Action`]s. Components only see
//! actions, never raw key codes.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Actions that can be triggered by user input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Tab,
    ShiftTab,
    /// Jump straight to the header slots
    ChromeFocus,
    Enter,
    Esc,
    Space,
    PageUp,
    PageDown,
    HalfPageUp,
    HalfPageDown,
    Home,
    End,
    Help,
    ToggleLog,
    ForceQuit,
    Char(char),
    None,
}

/// Map a key event to an action
pub fn action_for(key: KeyEvent) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }

    match (key.modifiers, key.code) {
        // Global chords first
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Action::ForceQuit,
        (KeyModifiers::CONTROL, KeyCode::Char('l')) => Action::ToggleLog,
        (KeyModifiers::CONTROL, KeyCode::Char('h')) => Action::Help,
        (KeyModifiers::CONTROL, KeyCode::Char(' ')) => Action::ChromeFocus,
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => Action::HalfPageUp,
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => Action::HalfPageDown,

        (_, KeyCode::F(1)) => Action::Help,
        (_, KeyCode::Char('?')) => Action::Help,

        (_, KeyCode::BackTab) => Action::ShiftTab,
        (m, KeyCode::Tab) if m.contains(KeyModifiers::SHIFT) => Action::ShiftTab,
        (_, KeyCode::Tab) => Action::Tab,

        (_, KeyCode::Up) => Action::Up,
        (_, KeyCode::Down) => Action::Down,
        (_, KeyCode::Left) => Action::Left,
        (_, KeyCode::Right) => Action::Right,
        (_, KeyCode::Enter) => Action::Enter,
        (_, KeyCode::Esc) => Action::Esc,
        (_, KeyCode::PageUp) => Action::PageUp,
        (_, KeyCode::PageDown) => Action::PageDown,
        (_, KeyCode::Home) => Action::Home,
        (_, KeyCode::End) => Action::End,
        (_, KeyCode::Char(' ')) => Action::Space,

        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) && !m.contains(KeyModifiers::ALT) => {
            Action::Char(c)
        }

        _ => Action::None,
    }
}

/// One row of the help overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub keys: &'static str,
    pub description: &'static str,
}

/// Bindings listed by the help dialog, in display order
pub const BINDINGS: &[Binding] = &[
    Binding { keys: "↑/↓", description: "move up / down" },
    Binding { keys: "←/→", description: "previous / next button" },
    Binding { keys: "tab", description: "next screen element" },
    Binding { keys: "shift+tab", description: "previous screen element" },
    Binding { keys: "ctrl+space", description: "focus title-bar versions" },
    Binding { keys: "enter", description: "select / confirm" },
    Binding { keys: "esc", description: "back / exit" },
    Binding { keys: "pgup/pgdn", description: "scroll a page" },
    Binding { keys: "ctrl+u/ctrl+d", description: "scroll half a page" },
    Binding { keys: "home/end", description: "jump to top / bottom" },
    Binding { keys: "ctrl+l", description: "toggle log panel" },
    Binding { keys: "?/F1", description: "help" },
    Binding { keys: "ctrl+c", description: "force quit" },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_global_chords() {
        assert_eq!(action_for(key(KeyCode::Char('c'), KeyModifiers::CONTROL)), Action::ForceQuit);
        assert_eq!(action_for(key(KeyCode::Char('l'), KeyModifiers::CONTROL)), Action::ToggleLog);
        assert_eq!(action_for(key(KeyCode::Char(' '), KeyModifiers::CONTROL)), Action::ChromeFocus);
    }

    #[test]
    fn test_help_aliases() {
        assert_eq!(action_for(key(KeyCode::F(1), KeyModifiers::NONE)), Action::Help);
        assert_eq!(action_for(key(KeyCode::Char('?'), KeyModifiers::SHIFT)), Action::Help);
        assert_eq!(action_for(key(KeyCode::Char('h'), KeyModifiers::CONTROL)), Action::Help);
    }

    #[test]
    fn test_shift_tab_variants() {
        assert_eq!(action_for(key(KeyCode::BackTab, KeyModifiers::SHIFT)), Action::ShiftTab);
        assert_eq!(action_for(key(KeyCode::Tab, KeyModifiers::SHIFT)), Action::ShiftTab);
        assert_eq!(action_for(key(KeyCode::Tab, KeyModifiers::NONE)), Action::Tab);
    }

    #[test]
    fn test_plain_chars_pass_through() {
        assert_eq!(action_for(key(KeyCode::Char('y'), KeyModifiers::NONE)), Action::Char('y'));
        assert_eq!(action_for(key(KeyCode::Char('Y'), KeyModifiers::SHIFT)), Action::Char('Y'));
        assert_eq!(action_for(key(KeyCode::Char(' '), KeyModifiers::NONE)), Action::Space);
        assert_eq!(action_for(key(KeyCode::Char('x'), KeyModifiers::ALT)), Action::None);
    }

    #[test]
    fn test_release_events_ignored() {
        let mut event = key(KeyCode::Enter, KeyModifiers::NONE);
        event.kind = KeyEventKind::Release;
        assert_eq!(action_for(event), Action::None);
    }
}
