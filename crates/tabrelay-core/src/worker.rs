use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tabrelay_common::{Mode, RelayError, Result};
use tabrelay_config::Options;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::automation::{Clipboard, Keyboard};
use crate::datafile::DataFile;
use crate::session::{Session, Status};

/// Delays between automation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Time given to focus the target window before the first action.
    pub focus_delay: Duration,
    /// Pause around the copy keystroke for the clipboard to update.
    pub copy_delay: Duration,
    /// Pause between writing the clipboard and pressing paste.
    pub paste_delay: Duration,
    /// Pause after paste so the target application can commit the value.
    pub commit_delay: Duration,
    /// Pause between pasted records.
    pub step_interval: Duration,
    /// Poll interval while paused.
    pub pause_poll: Duration,
}

impl Timings {
    pub fn from_options(options: &Options) -> Self {
        Timings {
            focus_delay: options.focus_delay(),
            copy_delay: options.copy_delay(),
            paste_delay: options.paste_delay(),
            commit_delay: options.commit_delay(),
            step_interval: options.step_interval(),
            pause_poll: options.pause_poll(),
        }
    }
}

impl Default for Timings {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

/// Everything a worker needs, shared with the controller.
pub(crate) struct Shared {
    session: Mutex<Session>,
    status: watch::Sender<Status>,
    pub data_file: DataFile,
    pub timings: Timings,
    pub clipboard: Arc<dyn Clipboard>,
    pub keyboard: Arc<dyn Keyboard>,
}

impl Shared {
    pub fn new(
        mode: Mode,
        data_file: DataFile,
        timings: Timings,
        clipboard: Arc<dyn Clipboard>,
        keyboard: Arc<dyn Keyboard>,
    ) -> Self {
        let session = Session::new(mode);
        let (status, _) = watch::channel(session.status());
        Shared {
            session: Mutex::new(session),
            status,
            data_file,
            timings,
            clipboard,
            keyboard,
        }
    }

    /// Lock the session, recovering it if a worker panicked while holding it.
    pub fn lock(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn publish(&self, session: &Session) {
        self.status.send_replace(session.status());
    }

    pub fn subscribe(&self) -> watch::Receiver<Status> {
        self.status.subscribe()
    }

    /// End the session from inside a worker.
    pub fn finish(&self, session: &mut Session) {
        session.reset();
        self.publish(session);
    }
}

/// What one worker iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// One record was relayed.
    Relayed,
    /// Paused or holding for focus; wait this long and check again.
    Wait(Duration),
    /// The worker ended the session itself.
    Finished,
    /// The session is no longer ours.
    Ended,
}

impl Step {
    /// How long a worker should wait before acting. Only meaningful while the
    /// session is running or paused in the worker's own mode.
    pub fn wait_for(session: &Session, timings: &Timings, now: Instant) -> Option<Step> {
        if let Some(until) = session.hold_until.filter(|_| session.is_running()) {
            if now < until {
                return Some(Step::Wait(until - now));
            }
        }
        if session.is_running() {
            None
        } else {
            Some(Step::Wait(timings.pause_poll))
        }
    }
}

/// Sleeps that end early once the controller cancels the worker.
pub(crate) struct Pacer {
    cancel: Receiver<()>,
}

impl Pacer {
    /// Sleep for `delay`. Returns false if the worker was cancelled.
    pub fn wait(&self, delay: Duration) -> bool {
        if delay.is_zero() {
            return !self.is_cancelled();
        }
        match self.cancel.recv_timeout(delay) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        !matches!(self.cancel.try_recv(), Err(TryRecvError::Empty))
    }
}

/// Cancellation channel for a worker: dropping the sender cancels.
pub(crate) fn cancellation() -> (Sender<()>, Pacer) {
    let (tx, rx) = mpsc::channel();
    (tx, Pacer { cancel: rx })
}

/// A running copy or paste worker thread.
pub(crate) struct WorkerHandle {
    mode: Mode,
    thread: JoinHandle<()>,
    cancel: Sender<()>,
}

impl WorkerHandle {
    /// Spawn a worker thread running `body` until it returns.
    pub fn spawn<F>(mode: Mode, shared: Arc<Shared>, body: F) -> Result<Self>
    where
        F: FnOnce(&Shared, Pacer) -> Result<()> + Send + 'static,
    {
        let (cancel, pacer) = cancellation();
        let thread = thread::Builder::new()
            .name(format!("tabrelay-{}", mode))
            .spawn(move || {
                if let Err(e) = body(&shared, pacer) {
                    error!("{} worker failed: {}", mode, e);
                    let mut session = shared.lock();
                    if session.phase.active_mode() == Some(mode) {
                        shared.finish(&mut session);
                    }
                }
                debug!("{} worker exited", mode);
            })?;

        Ok(WorkerHandle {
            mode,
            thread,
            cancel,
        })
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Cancel the worker and wait for it to exit.
    pub fn cancel_and_join(self) -> Result<()> {
        let WorkerHandle {
            mode,
            thread,
            cancel,
        } = self;
        drop(cancel);

        if thread.thread().id() == thread::current().id() {
            return Ok(());
        }
        debug!("Joining {} worker", mode);
        thread.join().map_err(|_| RelayError::WorkerPanicked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacer_cancel_interrupts_wait() {
        let (cancel, pacer) = cancellation();
        assert!(pacer.wait(Duration::from_millis(1)));
        assert!(!pacer.is_cancelled());

        drop(cancel);
        let started = Instant::now();
        assert!(!pacer.wait(Duration::from_secs(30)));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(pacer.is_cancelled());
        assert!(!pacer.wait(Duration::ZERO));
    }

    #[test]
    fn test_wait_for_hold_then_run() {
        let timings = Timings {
            pause_poll: Duration::from_millis(50),
            ..Timings::default()
        };
        let now = Instant::now();
        let mut session = Session::new(Mode::Paste);
        session.phase = crate::session::Phase::Running(Mode::Paste);
        session.hold_until = Some(now + Duration::from_secs(2));

        assert_eq!(
            Step::wait_for(&session, &timings, now),
            Some(Step::Wait(Duration::from_secs(2)))
        );
        assert_eq!(
            Step::wait_for(&session, &timings, now + Duration::from_secs(3)),
            None
        );

        session.pause();
        assert_eq!(
            Step::wait_for(&session, &timings, now),
            Some(Step::Wait(Duration::from_millis(50)))
        );
    }
}
