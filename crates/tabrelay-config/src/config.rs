use crate::keybindings::KeyTable;
use crate::options::Options;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub options: Options,
    pub hotkeys: KeyTable,
    pub console_keys: KeyTable,
}

impl Config {
    /// Create a default configuration.
    pub fn default_config() -> Self {
        Config {
            options: Options::default(),
            hotkeys: KeyTable::default_hotkeys(),
            console_keys: KeyTable::default_console_keys(),
        }
    }

    /// Load configuration from the default config file (~/.tabrelay.conf).
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                debug!("No config file found at: {}", path.display());
                Ok(Self::default_config())
            }
            None => Ok(Self::default_config()),
        }
    }

    /// Load configuration from an explicit file on top of the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = Self::default_config();
        debug!("Loading config from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed reading config file {}", path.display()))?;
        config.apply_config_string(&content)?;
        Ok(config)
    }

    /// Get the default config file path.
    pub fn config_path() -> Option<PathBuf> {
        std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .ok()
            .map(|home| PathBuf::from(home).join(".tabrelay.conf"))
    }

    /// Apply configuration from a string. Bad lines are logged and skipped.
    pub fn apply_config_string(&mut self, content: &str) -> Result<()> {
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Err(e) = self.apply_config_line(line) {
                warn!("Config error: {} (line: {})", e, line);
            }
        }
        Ok(())
    }

    fn apply_config_line(&mut self, line: &str) -> Result<()> {
        let (command, args) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "set-option" | "set" => {
                crate::parser::parse_set_option(&mut self.options, args)?;
            }
            "bind-key" | "bind" => {
                crate::parser::parse_bind_key(&mut self.hotkeys, &mut self.console_keys, args)?;
            }
            "unbind-key" | "unbind" => {
                crate::parser::parse_unbind_key(&mut self.hotkeys, &mut self.console_keys, args)?;
            }
            "source-file" | "source" => {
                let path = args.trim();
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("failed reading sourced file {}", path))?;
                self.apply_config_string(&content)?;
            }
            _ => {
                warn!("Unknown config command: {}", command);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::parse_key;
    use std::io::Write;
    use tabrelay_common::{Action, Mode};

    #[test]
    fn test_apply_config_string() {
        let mut config = Config::default_config();
        config
            .apply_config_string(
                "# relay settings\n\
                 set mode paste\n\
                 set -g commit-delay 900\n\
                 set nonsense 1\n\
                 bind -g F9 stop\n\
                 unbind q\n",
            )
            .unwrap();

        assert_eq!(config.options.mode, Mode::Paste);
        assert_eq!(config.options.commit_delay, 900);
        assert_eq!(
            config.hotkeys.lookup(&parse_key("F9").unwrap()),
            Some(&Action::Stop)
        );
        assert_eq!(config.console_keys.lookup(&parse_key("q").unwrap()), None);
    }

    #[test]
    fn test_load_from_file_with_source() {
        let dir = tempfile::tempdir().unwrap();
        let extra = dir.path().join("extra.conf");
        std::fs::write(&extra, "set step-interval 50\n").unwrap();

        let main = dir.path().join("main.conf");
        let mut file = std::fs::File::create(&main).unwrap();
        writeln!(file, "set data-file records.txt").unwrap();
        writeln!(file, "source-file {}", extra.display()).unwrap();
        drop(file);

        let config = Config::load_from(&main).unwrap();
        assert_eq!(config.options.data_file, PathBuf::from("records.txt"));
        assert_eq!(config.options.step_interval, 50);
    }

    #[test]
    fn test_load_from_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load_from(&dir.path().join("absent.conf")).is_err());
    }
}
