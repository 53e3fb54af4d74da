use std::path::PathBuf;
use std::time::Duration;
use tabrelay_common::Mode;

/// Every option name accepted by `set` and `get`, in display order.
pub const OPTION_NAMES: &[&str] = &[
    "data-file",
    "mode",
    "max-records",
    "focus-delay",
    "copy-delay",
    "paste-delay",
    "commit-delay",
    "step-interval",
    "pause-poll",
    "hotkeys",
];

/// Relay options, settable by name from the config file or the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    // Data
    pub data_file: PathBuf,
    pub mode: Mode,
    pub max_records: String,

    // Timing (milliseconds)
    pub focus_delay: u64,
    pub copy_delay: u64,
    pub paste_delay: u64,
    pub commit_delay: u64,
    pub step_interval: u64,
    pub pause_poll: u64,

    // Input
    pub hotkeys: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            data_file: tabrelay_common::default_data_file(),
            mode: Mode::Copy,
            max_records: String::new(),

            focus_delay: 4000,
            copy_delay: 100,
            paste_delay: 100,
            commit_delay: 600,
            step_interval: 500,
            pause_poll: 500,

            hotkeys: true,
        }
    }
}

impl Options {
    /// Set an option by name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "data-file" => self.data_file = PathBuf::from(unquote(value)),
            "mode" => self.mode = value.parse()?,
            "max-records" => self.max_records = unquote(value),
            "focus-delay" => self.focus_delay = parse_millis(value)?,
            "copy-delay" => self.copy_delay = parse_millis(value)?,
            "paste-delay" => self.paste_delay = parse_millis(value)?,
            "commit-delay" => self.commit_delay = parse_millis(value)?,
            "step-interval" => self.step_interval = parse_millis(value)?,
            "pause-poll" => self.pause_poll = parse_millis(value)?,
            "hotkeys" => self.hotkeys = parse_bool(value)?,
            _ => return Err(format!("Unknown option: {}", name)),
        }
        Ok(())
    }

    /// Get an option value by name (as string).
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "data-file" => Some(self.data_file.display().to_string()),
            "mode" => Some(self.mode.to_string()),
            "max-records" => Some(self.max_records.clone()),
            "focus-delay" => Some(self.focus_delay.to_string()),
            "copy-delay" => Some(self.copy_delay.to_string()),
            "paste-delay" => Some(self.paste_delay.to_string()),
            "commit-delay" => Some(self.commit_delay.to_string()),
            "step-interval" => Some(self.step_interval.to_string()),
            "pause-poll" => Some(self.pause_poll.to_string()),
            "hotkeys" => Some(if self.hotkeys { "on" } else { "off" }.to_string()),
            _ => None,
        }
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay)
    }

    pub fn copy_delay(&self) -> Duration {
        Duration::from_millis(self.copy_delay)
    }

    pub fn paste_delay(&self) -> Duration {
        Duration::from_millis(self.paste_delay)
    }

    pub fn commit_delay(&self) -> Duration {
        Duration::from_millis(self.commit_delay)
    }

    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval)
    }

    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll)
    }
}

fn parse_millis(s: &str) -> Result<u64, String> {
    s.trim().parse().map_err(|e| format!("{}", e))
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Ok(true),
        "off" | "false" | "no" | "0" => Ok(false),
        _ => Err(format!("Invalid boolean value: {}", s)),
    }
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}
