//! Actions the viewer responds to, and the keys bound to them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "PascalCase")]
pub enum Action {
    // === Navigation ===
    /// Move to the next item in the focused pane
    Next,
    /// Move to the previous item in the focused pane
    Previous,
    First,
    Last,
    PageDown,
    PageUp,
    /// Open the selected document, or jump to the selected heading
    Activate,

    // === Panes ===
    FocusNext,
    FocusPrevious,

    // === Application ===
    CycleTheme,
    Reload,
    Quit,
}

impl Action {
    /// Map a key press to an action.
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            return match key.code {
                KeyCode::Char('c') => Some(Action::Quit),
                KeyCode::Char('d') => Some(Action::PageDown),
                KeyCode::Char('u') => Some(Action::PageUp),
                _ => None,
            };
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::Next),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::Previous),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::First),
            KeyCode::Char('G') | KeyCode::End => Some(Action::Last),
            KeyCode::PageDown | KeyCode::Char(' ') => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::Enter | KeyCode::Char('l') => Some(Action::Activate),
            KeyCode::Tab => Some(Action::FocusNext),
            KeyCode::BackTab => Some(Action::FocusPrevious),
            KeyCode::Char('t') => Some(Action::CycleTheme),
            KeyCode::Char('r') => Some(Action::Reload),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::Quit),
            _ => None,
        }
    }

    /// Primary key shown in hints.
    pub fn key_hint(&self) -> &'static str {
        match self {
            Action::Next => "j",
            Action::Previous => "k",
            Action::First => "g",
            Action::Last => "G",
            Action::PageDown => "Space",
            Action::PageUp => "PgUp",
            Action::Activate => "Enter",
            Action::FocusNext => "Tab",
            Action::FocusPrevious => "S-Tab",
            Action::CycleTheme => "t",
            Action::Reload => "r",
            Action::Quit => "q",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Action::Next => "next",
            Action::Previous => "previous",
            Action::First => "top",
            Action::Last => "bottom",
            Action::PageDown => "page down",
            Action::PageUp => "page up",
            Action::Activate => "open",
            Action::FocusNext => "next pane",
            Action::FocusPrevious => "previous pane",
            Action::CycleTheme => "theme",
            Action::Reload => "reload",
            Action::Quit => "quit",
        }
    }

    /// Compact hint line for the status bar.
    pub fn hint_line() -> String {
        Action::iter()
            .filter(|a| {
                matches!(
                    a,
                    Action::Activate
                        | Action::FocusNext
                        | Action::CycleTheme
                        | Action::Reload
                        | Action::Quit
                )
            })
            .map(|a| format!("{} {}", a.key_hint(), a.description()))
            .collect::<Vec<_>>()
            .join(" · ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_vim_and_arrow_keys() {
        assert_eq!(Action::from_key(key(KeyCode::Char('j'))), Some(Action::Next));
        assert_eq!(Action::from_key(key(KeyCode::Down)), Some(Action::Next));
        assert_eq!(Action::from_key(key(KeyCode::Char('k'))), Some(Action::Previous));
        assert_eq!(Action::from_key(key(KeyCode::Enter)), Some(Action::Activate));
        assert_eq!(Action::from_key(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_control_keys() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(Action::from_key(ctrl_c), Some(Action::Quit));
        let ctrl_j = KeyEvent::new(KeyCode::Char('j'), KeyModifiers::CONTROL);
        assert_eq!(Action::from_key(ctrl_j), None);
    }

    #[test]
    fn test_action_names_parse() {
        assert_eq!("CycleTheme".parse::<Action>().unwrap(), Action::CycleTheme);
        assert_eq!(Action::PageDown.to_string(), "PageDown");
    }

    #[test]
    fn test_hint_line() {
        let hints = Action::hint_line();
        assert!(hints.starts_with("Enter open"));
        assert!(hints.ends_with("q quit"));
    }
}
