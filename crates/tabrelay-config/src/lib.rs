pub mod config;
pub mod keybindings;
pub mod options;
pub mod parser;

pub use config::Config;
pub use keybindings::{Key, KeyBinding, KeyTable, Modifiers};
pub use options::{Options, OPTION_NAMES};
