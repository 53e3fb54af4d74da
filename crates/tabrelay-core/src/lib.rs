pub mod automation;
pub mod controller;
pub mod copy;
pub mod datafile;
mod paste;
pub mod session;
mod worker;

#[cfg(test)]
mod testing;

pub use automation::{Clipboard, Keyboard, Keystroke};
pub use controller::Controller;
pub use copy::CopyCutoff;
pub use datafile::DataFile;
pub use session::{Phase, Session, Status};
pub use worker::Timings;
