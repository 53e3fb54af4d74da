use rdev::{Event, EventType};
use std::thread::{self, JoinHandle};
use tabrelay_common::{Action, RelayError, Result};
use tabrelay_config::{Key, KeyBinding, KeyTable, Modifiers};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info};

/// Listens for global hotkeys on a dedicated thread and forwards their actions.
///
/// The callback only sends on the channel; the control loop applies the action.
pub struct HotkeyListener {
    thread: JoinHandle<()>,
}

impl HotkeyListener {
    /// Start listening. The listener runs for the rest of the process.
    pub fn spawn(table: KeyTable, actions: UnboundedSender<Action>) -> Result<Self> {
        if table.bindings.is_empty() {
            debug!("No global hotkeys bound");
        }
        let thread = thread::Builder::new()
            .name("tabrelay-hotkeys".to_string())
            .spawn(move || {
                let mut tracker = HotkeyTracker::new(table);
                let result = rdev::listen(move |event: Event| {
                    if let Some(action) = tracker.handle(&event.event_type) {
                        debug!("Hotkey action: {:?}", action);
                        if actions.send(action).is_err() {
                            debug!("Control loop gone, dropping hotkey");
                        }
                    }
                });
                if let Err(e) = result {
                    error!("Global hotkey listener failed: {:?}", e);
                }
            })
            .map_err(|e| RelayError::Hotkey(e.to_string()))?;

        info!("Global hotkeys active");
        Ok(HotkeyListener { thread })
    }

    pub fn is_running(&self) -> bool {
        !self.thread.is_finished()
    }
}

/// Tracks held modifiers and maps key presses to bound actions.
pub struct HotkeyTracker {
    table: KeyTable,
    modifiers: Modifiers,
}

impl HotkeyTracker {
    pub fn new(table: KeyTable) -> Self {
        HotkeyTracker {
            table,
            modifiers: Modifiers::default(),
        }
    }

    pub fn handle(&mut self, event: &EventType) -> Option<Action> {
        match event {
            EventType::KeyPress(key) => {
                if self.set_modifier(key, true) {
                    return None;
                }
                let binding = KeyBinding {
                    key: translate(key)?,
                    modifiers: self.modifiers,
                };
                self.table.lookup(&binding).cloned()
            }
            EventType::KeyRelease(key) => {
                self.set_modifier(key, false);
                None
            }
            _ => None,
        }
    }

    /// Update modifier state. Returns true if the key was a modifier.
    fn set_modifier(&mut self, key: &rdev::Key, down: bool) -> bool {
        use rdev::Key as K;
        match key {
            K::ShiftLeft | K::ShiftRight => self.modifiers.shift = down,
            K::ControlLeft | K::ControlRight => self.modifiers.ctrl = down,
            K::Alt | K::AltGr => self.modifiers.alt = down,
            _ => return false,
        }
        true
    }
}

/// Map a physical key to the config key it is bound as. Digits stay digits
/// with shift held, so `S-1` matches shift and the 1 key on any layout.
fn translate(key: &rdev::Key) -> Option<Key> {
    use rdev::Key as K;
    let key = match key {
        K::Num0 => Key::Char('0'),
        K::Num1 => Key::Char('1'),
        K::Num2 => Key::Char('2'),
        K::Num3 => Key::Char('3'),
        K::Num4 => Key::Char('4'),
        K::Num5 => Key::Char('5'),
        K::Num6 => Key::Char('6'),
        K::Num7 => Key::Char('7'),
        K::Num8 => Key::Char('8'),
        K::Num9 => Key::Char('9'),
        K::KeyA => Key::Char('a'),
        K::KeyB => Key::Char('b'),
        K::KeyC => Key::Char('c'),
        K::KeyD => Key::Char('d'),
        K::KeyE => Key::Char('e'),
        K::KeyF => Key::Char('f'),
        K::KeyG => Key::Char('g'),
        K::KeyH => Key::Char('h'),
        K::KeyI => Key::Char('i'),
        K::KeyJ => Key::Char('j'),
        K::KeyK => Key::Char('k'),
        K::KeyL => Key::Char('l'),
        K::KeyM => Key::Char('m'),
        K::KeyN => Key::Char('n'),
        K::KeyO => Key::Char('o'),
        K::KeyP => Key::Char('p'),
        K::KeyQ => Key::Char('q'),
        K::KeyR => Key::Char('r'),
        K::KeyS => Key::Char('s'),
        K::KeyT => Key::Char('t'),
        K::KeyU => Key::Char('u'),
        K::KeyV => Key::Char('v'),
        K::KeyW => Key::Char('w'),
        K::KeyX => Key::Char('x'),
        K::KeyY => Key::Char('y'),
        K::KeyZ => Key::Char('z'),
        K::F1 => Key::F(1),
        K::F2 => Key::F(2),
        K::F3 => Key::F(3),
        K::F4 => Key::F(4),
        K::F5 => Key::F(5),
        K::F6 => Key::F(6),
        K::F7 => Key::F(7),
        K::F8 => Key::F(8),
        K::F9 => Key::F(9),
        K::F10 => Key::F(10),
        K::F11 => Key::F(11),
        K::F12 => Key::F(12),
        K::Return => Key::Enter,
        K::Escape => Key::Escape,
        K::Backspace => Key::Backspace,
        K::Tab => Key::Tab,
        K::Space => Key::Space,
        K::UpArrow => Key::Up,
        K::DownArrow => Key::Down,
        K::LeftArrow => Key::Left,
        K::RightArrow => Key::Right,
        K::Home => Key::Home,
        K::End => Key::End,
        K::PageUp => Key::PageUp,
        K::PageDown => Key::PageDown,
        K::Insert => Key::Insert,
        K::Delete => Key::Delete,
        _ => return None,
    };
    Some(key)
}
