pub mod error;
pub mod protocol;

pub use error::{RelayError, Result};
pub use protocol::{Action, Mode, ModeChange};

use std::path::PathBuf;

/// File name of the data file when none is configured.
pub const DEFAULT_DATA_FILE: &str = "copied_data.txt";

/// Get the default data file path, relative to the working directory.
pub fn default_data_file() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_FILE)
}
