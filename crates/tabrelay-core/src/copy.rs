use std::time::Instant;
use tabrelay_common::{Mode, Result};
use tracing::{debug, info};

use crate::automation::Keystroke;
use crate::datafile::RecordWriter;
use crate::session::Phase;
use crate::worker::{Pacer, Shared, Step};

/// Keystrokes each copied record costs: copy, then tab.
pub const KEYSTROKES_PER_RECORD: u64 = 2;

/// Optional limit on how many records one copy session takes.
///
/// The limit is stored in keystrokes, so a cutoff of K records is kept as
/// `2 * K` and reached after K copy/tab iterations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyCutoff {
    limit: Option<u64>,
}

impl CopyCutoff {
    /// Parse the max-records input. Blank, non-numeric or zero input means no limit.
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.is_empty() {
            return Self::default();
        }
        match input.parse::<u64>() {
            Ok(records) if records > 0 => CopyCutoff {
                limit: records.checked_mul(KEYSTROKES_PER_RECORD),
            },
            _ => {
                debug!("Ignoring max records input {:?}, copying without limit", input);
                Self::default()
            }
        }
    }

    /// The stored limit, in keystrokes.
    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    pub fn reached(&self, keystrokes: u64) -> bool {
        self.limit.is_some_and(|limit| keystrokes >= limit)
    }
}

/// Copies the focused field, records it, and tabs to the next one.
pub(crate) struct CopyWorker<'a> {
    shared: &'a Shared,
    pacer: Pacer,
    writer: RecordWriter,
    cutoff: CopyCutoff,
    keystrokes: u64,
    copied: u64,
}

impl<'a> CopyWorker<'a> {
    pub fn new(shared: &'a Shared, pacer: Pacer, writer: RecordWriter, cutoff: CopyCutoff) -> Self {
        CopyWorker {
            shared,
            pacer,
            writer,
            cutoff,
            keystrokes: 0,
            copied: 0,
        }
    }

    pub fn copied(&self) -> u64 {
        self.copied
    }

    pub fn step(&mut self) -> Result<Step> {
        {
            let mut session = self.shared.lock();
            match session.phase {
                Phase::Running(Mode::Copy) | Phase::Paused(Mode::Copy) => {}
                _ => return Ok(Step::Ended),
            }
            if let Some(wait) = Step::wait_for(&session, &self.shared.timings, Instant::now()) {
                return Ok(wait);
            }
            if self.cutoff.reached(self.keystrokes) {
                info!("Reached max copy limit of {} records", self.copied);
                self.shared.finish(&mut session);
                return Ok(Step::Finished);
            }
        }

        let timings = self.shared.timings;
        if !self.pacer.wait(timings.copy_delay) {
            return Ok(Step::Ended);
        }
        self.shared.keyboard.press(Keystroke::Copy)?;
        if !self.pacer.wait(timings.copy_delay) {
            return Ok(Step::Ended);
        }

        let text = self.shared.clipboard.read_text()?;
        self.writer.append(&text)?;
        self.shared.keyboard.press(Keystroke::Tab)?;

        self.keystrokes += KEYSTROKES_PER_RECORD;
        self.copied += 1;
        debug!("Copied record {}: {}", self.copied, text);
        Ok(Step::Relayed)
    }
}

/// Worker body for a copy session.
pub(crate) fn run(shared: &Shared, pacer: Pacer, cutoff: CopyCutoff) -> Result<()> {
    let writer = shared.data_file.appender()?;
    info!(
        "Copying into {} (limit: {})",
        shared.data_file.path().display(),
        cutoff
            .limit()
            .map(|keys| (keys / KEYSTROKES_PER_RECORD).to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    let mut worker = CopyWorker::new(shared, pacer, writer, cutoff);
    loop {
        match worker.step()? {
            Step::Relayed => {}
            Step::Wait(delay) => {
                if !worker.pacer.wait(delay) {
                    break;
                }
            }
            Step::Finished | Step::Ended => break,
        }
    }

    info!("Copy worker done after {} records", worker.copied());
    Ok(())
}
