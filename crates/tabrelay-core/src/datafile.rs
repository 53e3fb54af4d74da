use std::fs::{File, OpenOptions};
use std::io::{self, LineWriter, Write};
use std::path::{Path, PathBuf};
use tabrelay_common::Result;
use tracing::debug;

/// The text file records are copied into and pasted from, one record per line.
///
/// Values are written verbatim, so a clipboard value containing newlines comes
/// back as several records when the file is loaded again.
#[derive(Debug, Clone)]
pub struct DataFile {
    path: PathBuf,
}

impl DataFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DataFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every non-blank line, trimmed, in file order. A missing file is empty.
    pub fn load(&self) -> Result<Vec<String>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Data file {} not found, no records", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Open the file for appending, creating it if absent.
    pub fn appender(&self) -> Result<RecordWriter> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        Ok(RecordWriter {
            inner: LineWriter::new(file),
        })
    }

    /// Empty the file, creating it if absent.
    pub fn truncate(&self) -> Result<()> {
        File::create(&self.path)?;
        Ok(())
    }
}

/// Appends records to an open data file.
pub struct RecordWriter {
    inner: LineWriter<File>,
}

impl RecordWriter {
    pub fn append(&mut self, record: &str) -> Result<()> {
        writeln!(self.inner, "{}", record)?;
        self.inner.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("absent.txt"));
        assert_eq!(file.load().unwrap(), Vec::<String>::new());
    }

    #[test]
    fn test_load_skips_blank_lines_and_trims() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.txt");
        std::fs::write(&path, "  alpha \n\n\t\nbeta\r\n gamma\n   \n").unwrap();

        let records = DataFile::new(&path).load().unwrap();
        assert_eq!(records, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn test_append_creates_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("data.txt"));

        file.appender().unwrap().append("first").unwrap();
        let mut writer = file.appender().unwrap();
        writer.append("second").unwrap();
        writer.append("").unwrap();

        let raw = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(raw, "first\nsecond\n\n");
        assert_eq!(file.load().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_multiline_value_splits_on_reload() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("data.txt"));
        file.appender().unwrap().append("line one\nline two").unwrap();
        assert_eq!(file.load().unwrap(), vec!["line one", "line two"]);
    }

    #[test]
    fn test_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let file = DataFile::new(dir.path().join("data.txt"));
        file.appender().unwrap().append("stale").unwrap();
        file.truncate().unwrap();
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "");
    }
}
