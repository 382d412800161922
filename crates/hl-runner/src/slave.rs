use std::io::BufRead;

use hl_core::{CheckRequest, Result, RunOutcome};
use hl_protocol::{Command, MasterOut, SlaveReader, SlaveSender};

use crate::logger::ProxyLogger;
use crate::runner::CheckRunner;

/// The runner process command loop: read a command, execute it, answer with
/// a VALUE, repeat until FINALIZE.
pub struct SlaveLoop<R: BufRead> {
    reader: SlaveReader<R>,
    sender: SlaveSender,
    logger: ProxyLogger,
    runner: CheckRunner,
}

impl<R: BufRead> SlaveLoop<R> {
    pub fn new(reader: SlaveReader<R>, sender: SlaveSender, test_mode: bool) -> Self {
        let logger = ProxyLogger::new(sender.clone());
        let runner = CheckRunner::new(logger.clone(), test_mode);
        Self { reader, sender, logger, runner }
    }

    /// Handle one command. Returns `true` when FINALIZE was received.
    pub fn step(&mut self) -> Result<bool> {
        match self.reader.read_command()? {
            Command::Run => {
                self.run()?;
                Ok(false)
            }
            Command::Finalize => Ok(true),
        }
    }

    fn run(&mut self) -> Result<()> {
        let payload = self.reader.expect(MasterOut::Value)?;
        let request = CheckRequest::from_json(&payload)?;
        let success = self.runner.run(&request)?;
        let outcome = if success { RunOutcome::Success } else { RunOutcome::Fail };
        self.sender.send_value(&outcome.to_json())?;
        Ok(())
    }

    /// Serve until FINALIZE. Any error is reported over the wire as CRASH
    /// before it propagates, so the master never hangs waiting for a value.
    pub fn serve(&mut self) -> Result<()> {
        loop {
            match self.step() {
                Ok(false) => continue,
                Ok(true) => {
                    self.runner.finalize();
                    // Acknowledge the shutdown so the master's finalize wait
                    // completes without relying on process exit alone.
                    let _ = self.sender.send_value("");
                    return Ok(());
                }
                Err(e) => {
                    self.logger.error(&format!("{e}"));
                    let _ = self.sender.send_value(&RunOutcome::Crash.to_json());
                    self.runner.finalize();
                    return Err(e);
                }
            }
        }
    }
}
