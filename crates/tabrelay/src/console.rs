use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, queue};
use std::io::{self, Write};
use tabrelay_config::KeyTable;
use tabrelay_core::Status;

/// Raw-mode console showing the status line. Restores the terminal on drop.
pub struct Console {
    stdout: io::Stdout,
}

impl Console {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        queue!(stdout, cursor::Hide)?;
        stdout.flush()?;
        Ok(Console { stdout })
    }

    /// Print the key help above the status line.
    pub fn print_keys(&mut self, hotkeys: Option<&KeyTable>, console_keys: &KeyTable) -> io::Result<()> {
        if let Some(hotkeys) = hotkeys {
            write!(self.stdout, "global: {}\r\n", key_summary(hotkeys))?;
        }
        write!(self.stdout, "console: {}\r\n", key_summary(console_keys))?;
        self.stdout.flush()
    }

    pub fn draw(&mut self, status: &Status, prompt: Option<&str>) -> io::Result<()> {
        queue!(
            self.stdout,
            cursor::MoveToColumn(0),
            terminal::Clear(ClearType::CurrentLine)
        )?;
        write!(self.stdout, "{}", render_status(status, prompt))?;
        self.stdout.flush()
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        let _ = write!(self.stdout, "\r\n");
        let _ = queue!(self.stdout, cursor::Show);
        let _ = self.stdout.flush();
        let _ = terminal::disable_raw_mode();
    }
}

pub fn render_status(status: &Status, prompt: Option<&str>) -> String {
    match prompt {
        Some(buffer) => format!("{} | max records: {}_", status, buffer),
        None => status.to_string(),
    }
}

fn key_summary(table: &KeyTable) -> String {
    table
        .sorted()
        .into_iter()
        .map(|(key, action)| format!("{} {}", key, action))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Stderr writer for log lines while the console is in raw mode.
///
/// Clears the status line before writing and ends lines with CRLF. The status
/// line is redrawn by the control loop.
pub struct RawModeStderr;

impl Write for RawModeStderr {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut err = io::stderr().lock();
        err.write_all(b"\r\x1b[2K")?;
        for chunk in buf.split_inclusive(|b| *b == b'\n') {
            match chunk.strip_suffix(b"\n") {
                Some(line) => {
                    err.write_all(line)?;
                    err.write_all(b"\r\n")?;
                }
                None => err.write_all(chunk)?,
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tabrelay_common::Mode;
    use tabrelay_core::Phase;

    #[test]
    fn test_render_status() {
        let status = Status {
            mode: Mode::Paste,
            phase: Phase::Running(Mode::Paste),
            current_index: 0,
            total: 2,
            record: Some("alpha".to_string()),
        };
        assert_eq!(
            render_status(&status, None),
            "[paste] Running | Record 1 of 2: alpha"
        );
        assert_eq!(
            render_status(&status, Some("3")),
            "[paste] Running | Record 1 of 2: alpha | max records: 3_"
        );
    }

    #[test]
    fn test_key_summary_is_sorted() {
        assert_eq!(
            key_summary(&KeyTable::default_hotkeys()),
            "S-1 start, S-2 pause, S-3 stop"
        );
    }
}
