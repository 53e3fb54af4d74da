use tabrelay_common::Result;

/// A synthetic keystroke sent to whichever application has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keystroke {
    /// The platform copy shortcut (Ctrl-C / Cmd-C).
    Copy,
    /// The platform paste shortcut (Ctrl-V / Cmd-V).
    Paste,
    /// Advance focus to the next field.
    Tab,
}

/// Access to the system clipboard.
pub trait Clipboard: Send + Sync {
    fn read_text(&self) -> Result<String>;
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Keystroke injection into the focused application.
pub trait Keyboard: Send + Sync {
    fn press(&self, stroke: Keystroke) -> Result<()>;
}
