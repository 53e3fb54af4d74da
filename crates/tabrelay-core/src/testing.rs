//! In-memory clipboard and keyboard for exercising the workers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tabrelay_common::{Mode, RelayError, Result};

use crate::automation::{Clipboard, Keyboard, Keystroke};
use crate::datafile::DataFile;
use crate::worker::{Shared, Timings};

#[derive(Default)]
pub struct FakeClipboard {
    contents: Mutex<String>,
    /// Values that appear on the clipboard, one per read, as if copied.
    incoming: Mutex<VecDeque<String>>,
    writes: Mutex<Vec<String>>,
}

impl FakeClipboard {
    pub fn with_incoming(values: &[&str]) -> Self {
        let clipboard = FakeClipboard::default();
        clipboard
            .incoming
            .lock()
            .unwrap()
            .extend(values.iter().map(|v| v.to_string()));
        clipboard
    }

    pub fn contents(&self) -> String {
        self.contents.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }
}

impl Clipboard for FakeClipboard {
    fn read_text(&self) -> Result<String> {
        let mut contents = self.contents.lock().unwrap();
        if let Some(next) = self.incoming.lock().unwrap().pop_front() {
            *contents = next;
        }
        Ok(contents.clone())
    }

    fn write_text(&self, text: &str) -> Result<()> {
        *self.contents.lock().unwrap() = text.to_string();
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeKeyboard {
    strokes: Mutex<Vec<Keystroke>>,
    fail_on: Option<Keystroke>,
}

impl FakeKeyboard {
    pub fn failing_on(stroke: Keystroke) -> Self {
        FakeKeyboard {
            fail_on: Some(stroke),
            ..Default::default()
        }
    }

    pub fn strokes(&self) -> Vec<Keystroke> {
        self.strokes.lock().unwrap().clone()
    }
}

impl Keyboard for FakeKeyboard {
    fn press(&self, stroke: Keystroke) -> Result<()> {
        if self.fail_on == Some(stroke) {
            return Err(RelayError::Keystroke(format!("{:?} rejected", stroke)));
        }
        self.strokes.lock().unwrap().push(stroke);
        Ok(())
    }
}

/// Timings with no waiting, apart from a short pause poll.
pub fn instant_timings() -> Timings {
    Timings {
        focus_delay: Duration::ZERO,
        copy_delay: Duration::ZERO,
        paste_delay: Duration::ZERO,
        commit_delay: Duration::ZERO,
        step_interval: Duration::ZERO,
        pause_poll: Duration::from_millis(1),
    }
}

pub fn shared(
    mode: Mode,
    data_file: DataFile,
    clipboard: &Arc<FakeClipboard>,
    keyboard: &Arc<FakeKeyboard>,
) -> Shared {
    Shared::new(
        mode,
        data_file,
        instant_timings(),
        clipboard.clone(),
        keyboard.clone(),
    )
}
