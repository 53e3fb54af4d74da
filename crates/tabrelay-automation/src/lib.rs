//! Platform implementations of the relay's clipboard, keystroke and hotkey seams.

pub mod clipboard;
pub mod hotkeys;
pub mod keyboard;

pub use clipboard::SystemClipboard;
pub use hotkeys::HotkeyListener;
pub use keyboard::SystemKeyboard;
