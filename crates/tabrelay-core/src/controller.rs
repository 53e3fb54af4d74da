use std::sync::Arc;
use std::time::Instant;
use tabrelay_common::{Mode, ModeChange, Result};
use tabrelay_config::Options;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::automation::{Clipboard, Keyboard};
use crate::copy::{self, CopyCutoff};
use crate::datafile::DataFile;
use crate::paste;
use crate::session::{Phase, Status};
use crate::worker::{Shared, Timings, WorkerHandle};

/// Owns the relay session and at most one worker thread.
///
/// Every transition goes through the session mutex shared with the worker, so
/// the methods here can be called from any control thread.
pub struct Controller {
    shared: Arc<Shared>,
    worker: Option<WorkerHandle>,
    max_records: String,
}

impl Controller {
    pub fn new(
        options: &Options,
        clipboard: Arc<dyn Clipboard>,
        keyboard: Arc<dyn Keyboard>,
    ) -> Self {
        let shared = Shared::new(
            options.mode,
            DataFile::new(&options.data_file),
            Timings::from_options(options),
            clipboard,
            keyboard,
        );
        Controller {
            shared: Arc::new(shared),
            worker: None,
            max_records: options.max_records.clone(),
        }
    }

    /// Start a session in the selected mode, or resume a paused one.
    ///
    /// Returns without waiting: the worker holds off for the focus delay
    /// before its first keystroke. A no-op while a session is running.
    pub fn start(&mut self) -> Result<()> {
        let focus_delay = self.shared.timings.focus_delay;
        {
            let mut session = self.shared.lock();
            match session.phase {
                Phase::Running(mode) => {
                    debug!("Start ignored, {} session already running", mode);
                    return Ok(());
                }
                Phase::Paused(mode) => {
                    info!(
                        "Resuming {} session, focus the target window within {:?}",
                        mode, focus_delay
                    );
                    session.phase = Phase::Running(mode);
                    session.hold_until = Some(Instant::now() + focus_delay);
                    self.shared.publish(&session);
                    return Ok(());
                }
                Phase::Idle => {}
            }
        }

        // A worker that ended its own session may still be unwinding.
        self.reap_worker();

        let mut session = self.shared.lock();
        let mode = session.mode;
        if mode == Mode::Paste {
            session.records = self.shared.data_file.load()?;
            info!(
                "Loaded {} records from {}",
                session.records.len(),
                self.shared.data_file.path().display()
            );
        }
        session.phase = Phase::Running(mode);
        session.hold_until = Some(Instant::now() + focus_delay);
        self.shared.publish(&session);
        drop(session);

        info!(
            "Starting {} session, focus the target window within {:?}",
            mode, focus_delay
        );
        let spawned = match mode {
            Mode::Copy => {
                let cutoff = CopyCutoff::parse(&self.max_records);
                WorkerHandle::spawn(mode, Arc::clone(&self.shared), move |shared, pacer| {
                    copy::run(shared, pacer, cutoff)
                })
            }
            Mode::Paste => WorkerHandle::spawn(mode, Arc::clone(&self.shared), paste::run),
        };

        match spawned {
            Ok(handle) => {
                self.worker = Some(handle);
                Ok(())
            }
            Err(e) => {
                let mut session = self.shared.lock();
                self.shared.finish(&mut session);
                Err(e)
            }
        }
    }

    /// Pause the running session, keeping its record index.
    pub fn pause(&mut self) {
        let mut session = self.shared.lock();
        if session.pause() {
            if session.paste_active() {
                info!("Session paused at record {}", session.current_index + 1);
            } else {
                info!("Copy session paused");
            }
            self.shared.publish(&session);
        }
    }

    /// Stop the session, rewind the index and wait for the worker to exit.
    pub fn stop(&mut self) {
        {
            let mut session = self.shared.lock();
            let was_active = session.phase != Phase::Idle;
            session.reset();
            self.shared.publish(&session);
            if was_active {
                info!("Session stopped, index reset to 0");
            }
        }

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.cancel_and_join() {
                warn!("Worker did not shut down cleanly: {}", e);
            }
        }
    }

    /// Truncate the data file and forget the loaded records.
    ///
    /// The in-memory records are cleared even when truncating fails.
    pub fn flush(&mut self) {
        let mut session = self.shared.lock();
        match self.shared.data_file.truncate() {
            Ok(()) => info!("Data file flushed"),
            Err(e) => warn!(
                "Error flushing data file {}: {}",
                self.shared.data_file.path().display(),
                e
            ),
        }
        session.clear_records();
        self.max_records.clear();
        self.shared.publish(&session);
    }

    /// Step back one record while a paste session is active.
    pub fn prev(&mut self) -> bool {
        let mut session = self.shared.lock();
        let moved = session.prev();
        if moved {
            self.shared.publish(&session);
        }
        moved
    }

    /// Step forward one record while a paste session is active.
    pub fn next(&mut self) -> bool {
        let mut session = self.shared.lock();
        let moved = session.next();
        if moved {
            self.shared.publish(&session);
        }
        moved
    }

    /// Select the mode for the next start. A session in progress keeps its mode.
    pub fn set_mode(&mut self, change: ModeChange) -> Mode {
        let mut session = self.shared.lock();
        session.mode = match change {
            ModeChange::Set(mode) => mode,
            ModeChange::Toggle => session.mode.toggled(),
        };
        self.shared.publish(&session);
        session.mode
    }

    /// Set the max-records input read by the next copy session.
    pub fn set_max_records(&mut self, input: &str) {
        self.max_records = input.trim().to_string();
        debug!(
            "Max records set to {:?} (cutoff {:?})",
            self.max_records,
            CopyCutoff::parse(&self.max_records).limit()
        );
    }

    pub fn max_records(&self) -> &str {
        &self.max_records
    }

    pub fn status(&self) -> Status {
        self.shared.lock().status()
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.shared.subscribe()
    }

    pub fn records(&self) -> Vec<String> {
        self.shared.lock().records.clone()
    }

    pub fn data_file(&self) -> &DataFile {
        &self.shared.data_file
    }

    /// Whether a worker thread is still running.
    pub fn worker_alive(&self) -> bool {
        self.worker.as_ref().is_some_and(|w| !w.is_finished())
    }

    fn reap_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.cancel_and_join() {
                warn!("Previous worker ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop();
    }
}
