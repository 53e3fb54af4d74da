use std::fmt;
use std::str::FromStr;

/// Which direction records flow during a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Copy fields out of the source application into the data file.
    #[default]
    Copy,
    /// Paste recorded lines into the target application.
    Paste,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Copy => Mode::Paste,
            Mode::Paste => Mode::Copy,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Copy => write!(f, "copy"),
            Mode::Paste => write!(f, "paste"),
        }
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "copy" => Ok(Mode::Copy),
            "paste" => Ok(Mode::Paste),
            other => Err(format!("Invalid mode: {}", other)),
        }
    }
}

/// How a `mode` action changes the selected mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeChange {
    Set(Mode),
    Toggle,
}

/// A control action, triggered by a hotkey, a console key or a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Start a session, or resume a paused one.
    Start,
    /// Pause the running session.
    Pause,
    /// Stop the session and reset the record index.
    Stop,
    /// Truncate the data file and forget loaded records.
    Flush,
    /// Step back one record.
    Prev,
    /// Step forward one record.
    Next,
    /// Select the mode used by the next start.
    Mode(ModeChange),
    /// Set the max-records input for the next copy session.
    MaxRecords(String),
    /// Open the max-records prompt in the console.
    PromptMaxRecords,
    /// Leave the program.
    Quit,
}

impl Action {
    /// Parse a command string such as `start` or `mode paste`.
    pub fn parse(command: &str) -> Option<Action> {
        let parts: Vec<&str> = command.split_whitespace().collect();
        let (&name, args) = parts.split_first()?;

        let action = match name {
            "start" | "resume" => Action::Start,
            "pause" => Action::Pause,
            "stop" => Action::Stop,
            "flush" | "flush-data" => Action::Flush,
            "prev" | "previous" | "previous-record" => Action::Prev,
            "next" | "next-record" => Action::Next,
            "mode" => match args.first() {
                None | Some(&"toggle") => Action::Mode(ModeChange::Toggle),
                Some(m) => Action::Mode(ModeChange::Set(m.parse().ok()?)),
            },
            "max-records" => match args.first() {
                Some(value) => Action::MaxRecords(value.to_string()),
                None => Action::PromptMaxRecords,
            },
            "quit" | "exit" => Action::Quit,
            _ => return None,
        };

        Some(action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Start => write!(f, "start"),
            Action::Pause => write!(f, "pause"),
            Action::Stop => write!(f, "stop"),
            Action::Flush => write!(f, "flush"),
            Action::Prev => write!(f, "prev"),
            Action::Next => write!(f, "next"),
            Action::Mode(ModeChange::Set(mode)) => write!(f, "mode {}", mode),
            Action::Mode(ModeChange::Toggle) => write!(f, "mode toggle"),
            Action::MaxRecords(value) => write!(f, "max-records {}", value),
            Action::PromptMaxRecords => write!(f, "max-records"),
            Action::Quit => write!(f, "quit"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_simple_actions() {
        assert_eq!(Action::parse("start"), Some(Action::Start));
        assert_eq!(Action::parse("  pause "), Some(Action::Pause));
        assert_eq!(Action::parse("previous"), Some(Action::Prev));
        assert_eq!(Action::parse("bogus"), None);
        assert_eq!(Action::parse(""), None);
    }

    #[test]
    fn test_parse_mode_actions() {
        assert_eq!(
            Action::parse("mode paste"),
            Some(Action::Mode(ModeChange::Set(Mode::Paste)))
        );
        assert_eq!(Action::parse("mode"), Some(Action::Mode(ModeChange::Toggle)));
        assert_eq!(Action::parse("mode sideways"), None);
    }

    #[test]
    fn test_parse_max_records() {
        assert_eq!(
            Action::parse("max-records 12"),
            Some(Action::MaxRecords("12".to_string()))
        );
        assert_eq!(Action::parse("max-records"), Some(Action::PromptMaxRecords));
    }

    #[test]
    fn test_display_parses_back() {
        let actions = [
            Action::Start,
            Action::Flush,
            Action::Mode(ModeChange::Set(Mode::Copy)),
            Action::Mode(ModeChange::Toggle),
            Action::MaxRecords("4".to_string()),
            Action::PromptMaxRecords,
            Action::Quit,
        ];
        for action in actions {
            assert_eq!(Action::parse(&action.to_string()), Some(action));
        }
    }
}
