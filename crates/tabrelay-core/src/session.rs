use std::fmt;
use std::time::Instant;
use tabrelay_common::Mode;

/// Lifecycle of a relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running(Mode),
    Paused(Mode),
}

impl Phase {
    /// The mode of the session in progress, if any.
    pub fn active_mode(self) -> Option<Mode> {
        match self {
            Phase::Idle => None,
            Phase::Running(mode) | Phase::Paused(mode) => Some(mode),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Idle => "Idle",
            Phase::Running(_) => "Running",
            Phase::Paused(_) => "Paused",
        }
    }
}

/// State shared between the controller and its worker.
///
/// Invariant: `current_index <= records.len()`. An index equal to the length
/// selects no record and ends a paste session.
#[derive(Debug, Clone)]
pub struct Session {
    pub phase: Phase,
    /// Mode the next start will use.
    pub mode: Mode,
    /// Workers wait until this instant so the user can focus the target window.
    pub hold_until: Option<Instant>,
    pub current_index: usize,
    pub records: Vec<String>,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Session {
            phase: Phase::Idle,
            mode,
            hold_until: None,
            current_index: 0,
            records: Vec::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running(_))
    }

    /// Whether records are loaded for pasting (running or paused).
    pub fn paste_active(&self) -> bool {
        self.phase.active_mode() == Some(Mode::Paste)
    }

    pub fn current_record(&self) -> Option<&str> {
        self.records.get(self.current_index).map(String::as_str)
    }

    /// Running → Paused. Returns false if nothing was running.
    pub fn pause(&mut self) -> bool {
        match self.phase {
            Phase::Running(mode) => {
                self.phase = Phase::Paused(mode);
                self.hold_until = None;
                true
            }
            _ => false,
        }
    }

    /// Back to idle with the index rewound.
    pub fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.hold_until = None;
        self.current_index = 0;
    }

    /// Step back one record; saturates at the first record.
    pub fn prev(&mut self) -> bool {
        if self.paste_active() && self.current_index > 0 {
            self.current_index -= 1;
            true
        } else {
            false
        }
    }

    /// Step forward one record; saturates at the last record.
    pub fn next(&mut self) -> bool {
        if self.paste_active() && self.current_index + 1 < self.records.len() {
            self.current_index += 1;
            true
        } else {
            false
        }
    }

    pub fn clear_records(&mut self) {
        self.records.clear();
        self.current_index = 0;
    }

    pub fn status(&self) -> Status {
        Status {
            mode: self.mode,
            phase: self.phase,
            current_index: self.current_index,
            total: self.records.len(),
            record: self.current_record().map(str::to_string),
        }
    }
}

/// Snapshot published to observers after every change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub mode: Mode,
    pub phase: Phase,
    pub current_index: usize,
    pub total: usize,
    pub record: Option<String>,
}

impl Status {
    /// The record line, e.g. "Record 2 of 5: beta".
    pub fn record_label(&self) -> String {
        match &self.record {
            Some(record) => format!(
                "Record {} of {}: {}",
                self.current_index + 1,
                self.total,
                record
            ),
            None => "No record selected".to_string(),
        }
    }
}

impl Default for Status {
    fn default() -> Self {
        Session::new(Mode::default()).status()
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = self.phase.active_mode().unwrap_or(self.mode);
        write!(f, "[{}] {} | {}", mode, self.phase.label(), self.record_label())
    }
}
