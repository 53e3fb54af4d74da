use enigo::{Enigo, Key, KeyboardControllable};
use tabrelay_common::Result;
use tabrelay_core::{Keyboard, Keystroke};
use tracing::trace;

/// Modifier held for the copy and paste shortcuts.
#[cfg(target_os = "macos")]
const SHORTCUT_MODIFIER: Key = Key::Meta;
#[cfg(not(target_os = "macos"))]
const SHORTCUT_MODIFIER: Key = Key::Control;

/// Synthetic keystrokes through enigo.
///
/// An `Enigo` handle cannot leave the thread that made it, so one is created
/// per keystroke on the worker's thread.
#[derive(Debug, Default)]
pub struct SystemKeyboard;

impl SystemKeyboard {
    pub fn new() -> Self {
        SystemKeyboard
    }
}

impl Keyboard for SystemKeyboard {
    fn press(&self, stroke: Keystroke) -> Result<()> {
        trace!("Pressing {:?}", stroke);
        let mut enigo = Enigo::new();
        match stroke {
            Keystroke::Copy => shortcut(&mut enigo, 'c'),
            Keystroke::Paste => shortcut(&mut enigo, 'v'),
            Keystroke::Tab => enigo.key_click(Key::Tab),
        }
        Ok(())
    }
}

fn shortcut(enigo: &mut Enigo, letter: char) {
    enigo.key_down(SHORTCUT_MODIFIER);
    enigo.key_click(Key::Layout(letter));
    enigo.key_up(SHORTCUT_MODIFIER);
}
