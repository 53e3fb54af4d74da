use std::collections::HashMap;
use tabrelay_common::{Action, Mode, ModeChange};

/// A key combination that can trigger a binding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: Key,
    pub modifiers: Modifiers,
}

/// Key identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    F(u8),
    Enter,
    Escape,
    Backspace,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,
    Space,
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const SHIFT: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: true,
    };
}

/// A table of key bindings mapping keys to actions.
#[derive(Debug, Clone, Default)]
pub struct KeyTable {
    pub bindings: HashMap<KeyBinding, Action>,
}

impl KeyTable {
    pub fn new() -> Self {
        KeyTable {
            bindings: HashMap::new(),
        }
    }

    /// Global hotkeys, active process-wide.
    pub fn default_hotkeys() -> Self {
        let mut table = KeyTable::new();
        table.bind(Key::Char('1'), Modifiers::SHIFT, Action::Start);
        table.bind(Key::Char('2'), Modifiers::SHIFT, Action::Pause);
        table.bind(Key::Char('3'), Modifiers::SHIFT, Action::Stop);
        table
    }

    /// Keys handled while the console has focus.
    pub fn default_console_keys() -> Self {
        let mut table = KeyTable::new();

        // Session control
        table.bind(Key::Char('s'), Modifiers::default(), Action::Start);
        table.bind(Key::Char('p'), Modifiers::default(), Action::Pause);
        table.bind(Key::Char('x'), Modifiers::default(), Action::Stop);

        // Stepper
        table.bind(Key::Left, Modifiers::default(), Action::Prev);
        table.bind(Key::Right, Modifiers::default(), Action::Next);

        // Mode
        table.bind(
            Key::Char('c'),
            Modifiers::default(),
            Action::Mode(ModeChange::Set(Mode::Copy)),
        );
        table.bind(
            Key::Char('v'),
            Modifiers::default(),
            Action::Mode(ModeChange::Set(Mode::Paste)),
        );
        table.bind(Key::Tab, Modifiers::default(), Action::Mode(ModeChange::Toggle));

        // Data file
        table.bind(Key::Char('f'), Modifiers::default(), Action::Flush);
        table.bind(Key::Char('m'), Modifiers::default(), Action::PromptMaxRecords);

        table.bind(Key::Char('q'), Modifiers::default(), Action::Quit);
        table.bind(
            Key::Char('c'),
            Modifiers {
                ctrl: true,
                ..Default::default()
            },
            Action::Quit,
        );

        table
    }

    /// Add a binding.
    pub fn bind(&mut self, key: Key, modifiers: Modifiers, action: Action) {
        let binding = KeyBinding { key, modifiers };
        self.bindings.insert(binding, action);
    }

    /// Remove a binding.
    pub fn unbind(&mut self, key: Key, modifiers: Modifiers) {
        let binding = KeyBinding { key, modifiers };
        self.bindings.remove(&binding);
    }

    /// Look up the action for a key binding.
    pub fn lookup(&self, binding: &KeyBinding) -> Option<&Action> {
        self.bindings.get(binding)
    }

    /// Bindings sorted by their display form, for `list-keys`.
    pub fn sorted(&self) -> Vec<(String, &Action)> {
        let mut list: Vec<(String, &Action)> = self
            .bindings
            .iter()
            .map(|(binding, action)| (format_key(binding), action))
            .collect();
        list.sort_by(|a, b| a.0.cmp(&b.0));
        list
    }
}

/// Parse a key string like "S-1", "C-v", "shift+1", "Left", "F1" into a KeyBinding.
pub fn parse_key(s: &str) -> Option<KeyBinding> {
    if s.len() > 1 && s.contains('+') && !has_dash_modifier(s) {
        return parse_plus_key(s);
    }

    let mut modifiers = Modifiers::default();
    let mut remaining = s;

    // Parse modifiers
    loop {
        if remaining.starts_with("C-") || remaining.starts_with("c-") {
            modifiers.ctrl = true;
            remaining = &remaining[2..];
        } else if remaining.starts_with("M-") || remaining.starts_with("m-") {
            modifiers.alt = true;
            remaining = &remaining[2..];
        } else if remaining.starts_with("S-") || remaining.starts_with("s-") {
            modifiers.shift = true;
            remaining = &remaining[2..];
        } else {
            break;
        }
    }

    let key = parse_key_name(remaining)?;
    Some(KeyBinding { key, modifiers })
}

fn has_dash_modifier(s: &str) -> bool {
    ["C-", "c-", "M-", "m-", "S-", "s-"]
        .iter()
        .any(|prefix| s.starts_with(prefix))
}

/// Parse the "shift+1" / "ctrl+alt+x" notation.
fn parse_plus_key(s: &str) -> Option<KeyBinding> {
    let mut modifiers = Modifiers::default();
    let mut key = None;

    for part in s.split('+').map(str::trim) {
        match part.to_lowercase().as_str() {
            "ctrl" | "control" => modifiers.ctrl = true,
            "alt" | "option" | "meta" => modifiers.alt = true,
            "shift" => modifiers.shift = true,
            _ if key.is_none() => key = Some(parse_key_name(part)?),
            _ => return None,
        }
    }

    Some(KeyBinding { key: key?, modifiers })
}

fn parse_key_name(s: &str) -> Option<Key> {
    let key = match s {
        "Enter" | "enter" => Key::Enter,
        "Escape" | "escape" | "Esc" | "esc" => Key::Escape,
        "Space" | "space" => Key::Space,
        "Backspace" | "BSpace" | "bspace" => Key::Backspace,
        "Tab" | "tab" => Key::Tab,
        "Up" | "up" => Key::Up,
        "Down" | "down" => Key::Down,
        "Left" | "left" => Key::Left,
        "Right" | "right" => Key::Right,
        "Home" | "home" => Key::Home,
        "End" | "end" => Key::End,
        "PageUp" | "PgUp" | "pgup" => Key::PageUp,
        "PageDown" | "PgDn" | "pgdn" => Key::PageDown,
        "Insert" | "insert" => Key::Insert,
        "Delete" | "delete" | "DC" | "dc" => Key::Delete,
        s if s.len() > 1 && (s.starts_with('F') || s.starts_with('f')) => {
            s[1..].parse::<u8>().ok().map(Key::F)?
        }
        s => {
            let mut chars = s.chars();
            let ch = chars.next()?;
            if chars.next().is_some() {
                return None;
            }
            Key::Char(ch)
        }
    };
    Some(key)
}

/// Format a binding back into the "S-1" notation.
pub fn format_key(binding: &KeyBinding) -> String {
    let mut out = String::new();
    if binding.modifiers.ctrl {
        out.push_str("C-");
    }
    if binding.modifiers.alt {
        out.push_str("M-");
    }
    if binding.modifiers.shift {
        out.push_str("S-");
    }
    match &binding.key {
        Key::Char(c) => out.push(*c),
        Key::F(n) => out.push_str(&format!("F{}", n)),
        other => out.push_str(&format!("{:?}", other)),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_dash_notation() {
        let binding = parse_key("S-1").unwrap();
        assert_eq!(binding.key, Key::Char('1'));
        assert_eq!(binding.modifiers, Modifiers::SHIFT);

        let binding = parse_key("C-M-F5").unwrap();
        assert_eq!(binding.key, Key::F(5));
        assert!(binding.modifiers.ctrl && binding.modifiers.alt);
    }

    #[test]
    fn test_parse_plus_notation() {
        assert_eq!(parse_key("shift+1"), parse_key("S-1"));
        assert_eq!(parse_key("ctrl+Left"), parse_key("C-Left"));
        assert_eq!(parse_key("shift+1+2"), None);
        assert_eq!(parse_key("+"), Some(KeyBinding {
            key: Key::Char('+'),
            modifiers: Modifiers::default(),
        }));
    }

    #[test]
    fn test_parse_dash_notation_plus_key() {
        let binding = parse_key("C-+").unwrap();
        assert_eq!(binding.key, Key::Char('+'));
        assert!(binding.modifiers.ctrl);

        let binding = parse_key("S-M-+").unwrap();
        assert_eq!(binding.key, Key::Char('+'));
        assert!(binding.modifiers.shift && binding.modifiers.alt);
    }

    #[test]
    fn test_parse_rejects_words() {
        assert_eq!(parse_key("banana"), None);
        assert_eq!(parse_key("S-"), None);
    }

    #[test]
    fn test_default_hotkeys() {
        let table = KeyTable::default_hotkeys();
        let lookup = |s: &str| table.lookup(&parse_key(s).unwrap()).cloned();
        assert_eq!(lookup("shift+1"), Some(Action::Start));
        assert_eq!(lookup("shift+2"), Some(Action::Pause));
        assert_eq!(lookup("shift+3"), Some(Action::Stop));
        assert_eq!(lookup("1"), None);
    }

    #[test]
    fn test_format_key() {
        assert_eq!(format_key(&parse_key("shift+1").unwrap()), "S-1");
        assert_eq!(format_key(&parse_key("C-Left").unwrap()), "C-Left");
    }
}
