use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tabrelay_common::Action;
use tabrelay_config::keybindings::{Key, KeyBinding, KeyTable, Modifiers};

/// The result of processing a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Apply an action to the controller.
    Action(Action),
    /// The prompt changed; redraw the console.
    Redraw,
    /// No action.
    None,
}

/// Console input state machine: bound keys, or the max-records prompt.
pub struct InputHandler {
    key_table: KeyTable,
    prompt: Option<String>,
}

impl InputHandler {
    pub fn new(key_table: KeyTable) -> Self {
        InputHandler {
            key_table,
            prompt: None,
        }
    }

    /// The max-records prompt buffer, if the prompt is open.
    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn open_prompt(&mut self, initial: &str) {
        self.prompt = Some(initial.to_string());
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> KeyAction {
        if self.prompt.is_some() {
            return self.handle_prompt_key(event);
        }

        let Some(binding) = crossterm_to_binding(event) else {
            return KeyAction::None;
        };
        match self.key_table.lookup(&binding) {
            Some(Action::PromptMaxRecords) => {
                self.prompt = Some(String::new());
                KeyAction::Redraw
            }
            Some(action) => KeyAction::Action(action.clone()),
            None => KeyAction::None,
        }
    }

    fn handle_prompt_key(&mut self, event: KeyEvent) -> KeyAction {
        let Some(buffer) = self.prompt.as_mut() else {
            return KeyAction::None;
        };
        match event.code {
            // An empty value clears the limit.
            KeyCode::Enter => {
                let value = std::mem::take(buffer);
                self.prompt = None;
                KeyAction::Action(Action::MaxRecords(value))
            }
            KeyCode::Esc => {
                self.prompt = None;
                KeyAction::Redraw
            }
            KeyCode::Backspace => {
                buffer.pop();
                KeyAction::Redraw
            }
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.prompt = None;
                KeyAction::Redraw
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                KeyAction::Redraw
            }
            _ => KeyAction::None,
        }
    }
}

/// Convert a crossterm KeyEvent to a KeyBinding.
fn crossterm_to_binding(event: KeyEvent) -> Option<KeyBinding> {
    let modifiers = Modifiers {
        ctrl: event.modifiers.contains(KeyModifiers::CONTROL),
        alt: event.modifiers.contains(KeyModifiers::ALT),
        shift: event.modifiers.contains(KeyModifiers::SHIFT),
    };

    let key = match event.code {
        KeyCode::Char(' ') => Key::Space,
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::F(n) => Key::F(n),
        KeyCode::Enter => Key::Enter,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Tab => Key::Tab,
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        KeyCode::PageUp => Key::PageUp,
        KeyCode::PageDown => Key::PageDown,
        KeyCode::Insert => Key::Insert,
        KeyCode::Delete => Key::Delete,
        _ => return None,
    };

    Some(KeyBinding { key, modifiers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabrelay_common::{Mode, ModeChange};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn handler() -> InputHandler {
        InputHandler::new(KeyTable::default_console_keys())
    }

    #[test]
    fn test_bound_keys_map_to_actions() {
        let mut input = handler();
        assert_eq!(input.handle_key(key(KeyCode::Char('s'))), KeyAction::Action(Action::Start));
        assert_eq!(input.handle_key(key(KeyCode::Right)), KeyAction::Action(Action::Next));
        assert_eq!(
            input.handle_key(key(KeyCode::Char('v'))),
            KeyAction::Action(Action::Mode(ModeChange::Set(Mode::Paste)))
        );
        assert_eq!(
            input.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Action(Action::Quit)
        );
        assert_eq!(input.handle_key(key(KeyCode::Char('z'))), KeyAction::None);
    }

    #[test]
    fn test_max_records_prompt_commits_on_enter() {
        let mut input = handler();
        assert_eq!(input.handle_key(key(KeyCode::Char('m'))), KeyAction::Redraw);
        assert_eq!(input.prompt(), Some(""));

        // Bound keys are typed into the prompt while it is open.
        input.handle_key(key(KeyCode::Char('1')));
        input.handle_key(key(KeyCode::Char('s')));
        input.handle_key(key(KeyCode::Backspace));
        input.handle_key(key(KeyCode::Char('2')));
        assert_eq!(input.prompt(), Some("12"));

        assert_eq!(
            input.handle_key(key(KeyCode::Enter)),
            KeyAction::Action(Action::MaxRecords("12".to_string()))
        );
        assert_eq!(input.prompt(), None);
        assert_eq!(input.handle_key(key(KeyCode::Char('s'))), KeyAction::Action(Action::Start));
    }

    #[test]
    fn test_max_records_prompt_cancels_on_escape() {
        let mut input = handler();
        input.open_prompt("5");
        input.handle_key(key(KeyCode::Char('0')));
        assert_eq!(input.handle_key(key(KeyCode::Esc)), KeyAction::Redraw);
        assert_eq!(input.prompt(), None);
    }

    #[test]
    fn test_empty_prompt_clears_limit() {
        let mut input = handler();
        input.open_prompt("");
        assert_eq!(
            input.handle_key(key(KeyCode::Enter)),
            KeyAction::Action(Action::MaxRecords(String::new()))
        );
    }
}
