use crate::keybindings::{self, KeyTable};
use crate::options::Options;
use anyhow::Result;
use tabrelay_common::Action;

/// Parse a `set-option` command line.
pub fn parse_set_option(options: &mut Options, args: &str) -> Result<()> {
    let args = args.trim();

    // Strip -g (global) flag
    let args = args.strip_prefix("-g ").unwrap_or(args).trim();

    // Split into option name and value
    let (name, value) = match args.split_once(' ') {
        Some((n, v)) => (n.trim(), v.trim()),
        None => (args, ""),
    };

    options
        .set(name, value)
        .map_err(|e| anyhow::anyhow!("{}", e))
}

/// Parse a `bind-key` command line. `-g` binds a global hotkey instead of a console key.
pub fn parse_bind_key(hotkeys: &mut KeyTable, console: &mut KeyTable, args: &str) -> Result<()> {
    let (global, args) = split_global_flag(args);

    // Split into key and command
    let (key_str, command) = match args.split_once(' ') {
        Some((k, c)) => (k.trim(), c.trim()),
        None => anyhow::bail!("bind-key needs a key and an action"),
    };

    let binding = keybindings::parse_key(key_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid key: {}", key_str))?;
    let action =
        Action::parse(command).ok_or_else(|| anyhow::anyhow!("Unknown action: {}", command))?;

    let table = if global { hotkeys } else { console };
    table.bind(binding.key, binding.modifiers, action);
    Ok(())
}

/// Parse an `unbind-key` command line.
pub fn parse_unbind_key(hotkeys: &mut KeyTable, console: &mut KeyTable, args: &str) -> Result<()> {
    let (global, key_str) = split_global_flag(args);
    let binding = keybindings::parse_key(key_str)
        .ok_or_else(|| anyhow::anyhow!("Invalid key: {}", key_str))?;

    let table = if global { hotkeys } else { console };
    table.unbind(binding.key, binding.modifiers);
    Ok(())
}

fn split_global_flag(args: &str) -> (bool, &str) {
    let args = args.trim();
    match args.strip_prefix("-g ") {
        Some(rest) => (true, rest.trim()),
        None => (false, args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keybindings::parse_key;

    #[test]
    fn test_set_option_with_global_flag() {
        let mut opts = Options::default();
        parse_set_option(&mut opts, "-g step-interval 250").unwrap();
        assert_eq!(opts.step_interval, 250);
    }

    #[test]
    fn test_set_option_clears_with_empty_value() {
        let mut opts = Options::default();
        opts.max_records = "5".to_string();
        parse_set_option(&mut opts, "max-records").unwrap();
        assert_eq!(opts.max_records, "");
    }

    #[test]
    fn test_bind_and_unbind_global() {
        let mut hotkeys = KeyTable::default_hotkeys();
        let mut console = KeyTable::new();
        parse_bind_key(&mut hotkeys, &mut console, "-g shift+4 flush").unwrap();
        assert_eq!(
            hotkeys.lookup(&parse_key("S-4").unwrap()),
            Some(&Action::Flush)
        );
        assert!(console.bindings.is_empty());

        parse_unbind_key(&mut hotkeys, &mut console, "-g S-1").unwrap();
        assert_eq!(hotkeys.lookup(&parse_key("S-1").unwrap()), None);
    }

    #[test]
    fn test_unbind_console_key_leaves_hotkeys() {
        let mut hotkeys = KeyTable::default_hotkeys();
        let mut console = KeyTable::default_console_keys();
        parse_unbind_key(&mut hotkeys, &mut console, "q").unwrap();
        assert_eq!(console.lookup(&parse_key("q").unwrap()), None);
        assert_eq!(
            console.lookup(&parse_key("s").unwrap()),
            Some(&Action::Start)
        );
        assert_eq!(hotkeys.bindings.len(), 3);
        assert!(parse_unbind_key(&mut hotkeys, &mut console, "banana").is_err());
    }

    #[test]
    fn test_bind_rejects_unknown_action() {
        let mut hotkeys = KeyTable::new();
        let mut console = KeyTable::new();
        assert!(parse_bind_key(&mut hotkeys, &mut console, "n launch-rockets").is_err());
        assert!(parse_bind_key(&mut hotkeys, &mut console, "n").is_err());
    }
}
