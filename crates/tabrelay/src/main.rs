mod console;
mod input_handler;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyEventKind};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tabrelay_automation::{HotkeyListener, SystemClipboard, SystemKeyboard};
use tabrelay_common::{Action, Mode};
use tabrelay_config::{Config, OPTION_NAMES};
use tabrelay_core::{Controller, DataFile};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use console::{Console, RawModeStderr};
use input_handler::{InputHandler, KeyAction};

const INPUT_POLL: Duration = Duration::from_millis(10);
const REDRAW_INTERVAL: Duration = Duration::from_millis(500);

#[derive(Parser)]
#[command(
    name = "tabrelay",
    version,
    about = "Copy form fields into a data file and paste them back, one Tab at a time"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default ~/.tabrelay.conf)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Data file holding one record per line
    #[arg(short, long, global = true)]
    data_file: Option<PathBuf>,

    /// Mode for the first start
    #[arg(short, long, global = true)]
    mode: Option<Mode>,

    /// Stop a copy session after this many records
    #[arg(long, global = true)]
    max_records: Option<String>,

    /// Do not listen for global hotkeys
    #[arg(long, global = true)]
    no_hotkeys: bool,

    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive relay (default)
    Run,

    /// Print the records in the data file
    Show,

    /// Truncate the data file
    Flush,

    /// List global hotkeys and console keys
    #[command(name = "list-keys", alias = "lsk")]
    ListKeys,

    /// Print every option after the config file and flags are applied
    #[command(name = "show-options")]
    ShowOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.as_ref().unwrap_or(&Commands::Run);
    init_tracing(cli.verbose, matches!(command, Commands::Run));

    let config = load_config(&cli)?;

    match command {
        Commands::Run => run_interactive(config).await?,

        Commands::Show => {
            let data_file = DataFile::new(&config.options.data_file);
            let records = data_file
                .load()
                .with_context(|| format!("failed reading {}", data_file.path().display()))?;
            if records.is_empty() {
                println!("No records.");
            }
            for (index, record) in records.iter().enumerate() {
                println!("{}: {}", index + 1, record);
            }
        }

        Commands::Flush => {
            let data_file = DataFile::new(&config.options.data_file);
            data_file
                .truncate()
                .with_context(|| format!("failed truncating {}", data_file.path().display()))?;
            println!("Flushed {}", data_file.path().display());
        }

        Commands::ListKeys => {
            for (key, action) in config.hotkeys.sorted() {
                println!("bind-key -g {} {}", key, action);
            }
            for (key, action) in config.console_keys.sorted() {
                println!("bind-key {} {}", key, action);
            }
        }

        Commands::ShowOptions => {
            for name in OPTION_NAMES {
                if let Some(value) = config.options.get(name) {
                    println!("{} {}", name, value);
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool, raw_console: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if raw_console {
        builder.with_writer(|| RawModeStderr).init();
    } else {
        builder.with_writer(std::io::stderr).init();
    }
}

/// Load the config file, then apply command-line overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let options = &mut config.options;
    if let Some(path) = &cli.data_file {
        options.data_file = path.clone();
    }
    if let Some(mode) = cli.mode {
        options.mode = mode;
    }
    if let Some(max_records) = &cli.max_records {
        options.max_records = max_records.clone();
    }
    if cli.no_hotkeys {
        options.hotkeys = false;
    }

    Ok(config)
}

/// Run the relay with the console and global hotkeys until quit.
async fn run_interactive(config: Config) -> Result<()> {
    let clipboard = SystemClipboard::new().context("failed to open the system clipboard")?;
    let mut controller = Controller::new(
        &config.options,
        Arc::new(clipboard),
        Arc::new(SystemKeyboard::new()),
    );

    let (actions_tx, mut actions_rx) = mpsc::unbounded_channel();
    let hotkeys = if config.options.hotkeys {
        match HotkeyListener::spawn(config.hotkeys.clone(), actions_tx.clone()) {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!("Global hotkeys unavailable: {}", e);
                None
            }
        }
    } else {
        info!("Global hotkeys disabled");
        None
    };

    let mut input = InputHandler::new(config.console_keys.clone());
    let mut status_rx = controller.subscribe();
    let mut console = Console::enter()?;
    console.print_keys(hotkeys.as_ref().map(|_| &config.hotkeys), &config.console_keys)?;
    console.draw(&status_rx.borrow_and_update(), input.prompt())?;

    let mut input_tick = tokio::time::interval(INPUT_POLL);
    let mut redraw_tick = tokio::time::interval(REDRAW_INTERVAL);
    let mut hotkeys_reported = false;

    'control: loop {
        tokio::select! {
            Some(action) = actions_rx.recv() => {
                if !apply_action(&mut controller, &mut input, action) {
                    break 'control;
                }
                console.draw(&status_rx.borrow(), input.prompt())?;
            }

            Ok(()) = status_rx.changed() => {
                console.draw(&status_rx.borrow_and_update(), input.prompt())?;
            }

            _ = input_tick.tick() => {
                while event::poll(Duration::ZERO)? {
                    let Event::Key(key_event) = event::read()? else {
                        continue;
                    };
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    match input.handle_key(key_event) {
                        KeyAction::Action(action) => {
                            if !apply_action(&mut controller, &mut input, action) {
                                break 'control;
                            }
                        }
                        KeyAction::Redraw => {}
                        KeyAction::None => continue,
                    }
                    console.draw(&status_rx.borrow(), input.prompt())?;
                }
            }

            _ = redraw_tick.tick() => {
                if let Some(listener) = &hotkeys {
                    if !listener.is_running() && !hotkeys_reported {
                        warn!("Global hotkey listener stopped; console keys still work");
                        hotkeys_reported = true;
                    }
                }
                console.draw(&status_rx.borrow(), input.prompt())?;
            }
        }
    }

    controller.stop();
    drop(console);
    info!("Bye");
    Ok(())
}

/// Apply one action. Returns false when the relay should quit.
fn apply_action(controller: &mut Controller, input: &mut InputHandler, action: Action) -> bool {
    match action {
        Action::Start => {
            if let Err(e) = controller.start() {
                error!("Failed to start session: {}", e);
            }
        }
        Action::Pause => controller.pause(),
        Action::Stop => controller.stop(),
        Action::Flush => controller.flush(),
        Action::Prev => {
            controller.prev();
        }
        Action::Next => {
            controller.next();
        }
        Action::Mode(change) => {
            let mode = controller.set_mode(change);
            info!("Mode set to {}", mode);
        }
        Action::MaxRecords(value) => controller.set_max_records(&value),
        Action::PromptMaxRecords => input.open_prompt(controller.max_records()),
        Action::Quit => return false,
    }
    true
}
