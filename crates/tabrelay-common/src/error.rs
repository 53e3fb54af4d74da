use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("Keystroke error: {0}")]
    Keystroke(String),

    #[error("Hotkey error: {0}")]
    Hotkey(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

pub type Result<T> = std::result::Result<T, RelayError>;
