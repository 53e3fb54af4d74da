use std::sync::{Mutex, PoisonError};
use tabrelay_common::{RelayError, Result};
use tabrelay_core::Clipboard;
use tracing::trace;

/// The system clipboard, through arboard.
pub struct SystemClipboard {
    inner: Mutex<arboard::Clipboard>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().map_err(clipboard_error)?;
        Ok(SystemClipboard {
            inner: Mutex::new(inner),
        })
    }
}

impl Clipboard for SystemClipboard {
    fn read_text(&self) -> Result<String> {
        let mut clipboard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        match clipboard.get_text() {
            Ok(text) => Ok(text),
            // Empty or non-text contents read as an empty record.
            Err(arboard::Error::ContentNotAvailable) => {
                trace!("Clipboard holds no text");
                Ok(String::new())
            }
            Err(e) => Err(clipboard_error(e)),
        }
    }

    fn write_text(&self, text: &str) -> Result<()> {
        let mut clipboard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        clipboard.set_text(text).map_err(clipboard_error)
    }
}

fn clipboard_error(e: arboard::Error) -> RelayError {
    RelayError::Clipboard(e.to_string())
}
