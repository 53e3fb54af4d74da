use std::time::Instant;
use tabrelay_common::{Mode, Result};
use tracing::{debug, info};

use crate::automation::Keystroke;
use crate::session::Phase;
use crate::worker::{Pacer, Shared, Step};

/// Pastes the current record into the focused field and tabs to the next one.
pub(crate) struct PasteWorker<'a> {
    shared: &'a Shared,
    pacer: Pacer,
}

impl<'a> PasteWorker<'a> {
    pub fn new(shared: &'a Shared, pacer: Pacer) -> Self {
        PasteWorker { shared, pacer }
    }

    /// One iteration. The session lock is held for the whole paste so the
    /// stepper cannot move the index under it.
    pub fn step(&mut self) -> Result<Step> {
        let mut session = self.shared.lock();
        match session.phase {
            Phase::Running(Mode::Paste) | Phase::Paused(Mode::Paste) => {}
            _ => return Ok(Step::Ended),
        }
        if let Some(wait) = Step::wait_for(&session, &self.shared.timings, Instant::now()) {
            return Ok(wait);
        }

        let Some(record) = session.current_record().map(str::to_string) else {
            info!("No more records to paste");
            self.shared.finish(&mut session);
            return Ok(Step::Finished);
        };

        let timings = self.shared.timings;
        debug!(
            "Pasting record {}/{}: {}",
            session.current_index + 1,
            session.records.len(),
            record
        );
        self.shared.clipboard.write_text(&record)?;
        if !self.pacer.wait(timings.paste_delay) {
            return Ok(Step::Ended);
        }
        self.shared.keyboard.press(Keystroke::Paste)?;
        // A paste that went out is always followed by its Tab.
        self.pacer.wait(timings.commit_delay);
        self.shared.keyboard.press(Keystroke::Tab)?;

        session.current_index += 1;
        self.shared.publish(&session);
        Ok(Step::Relayed)
    }
}

/// Worker body for a paste session.
pub(crate) fn run(shared: &Shared, pacer: Pacer) -> Result<()> {
    let mut worker = PasteWorker::new(shared, pacer);
    let step_interval = shared.timings.step_interval;

    loop {
        let delay = match worker.step()? {
            Step::Relayed => step_interval,
            Step::Wait(delay) => delay,
            Step::Finished | Step::Ended => break,
        };
        if !worker.pacer.wait(delay) {
            break;
        }
    }

    debug!("Paste worker done");
    Ok(())
}
