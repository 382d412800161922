use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex};

use hl_core::{Error, Result};

use crate::codec::{self, MasterOut, SlaveOut};
use crate::command::Command;

/// Reading half of the runner-side connection. The runner blocks here until
/// the master sends the next command.
pub struct SlaveReader<R: BufRead> {
    reader: R,
}

impl<R: BufRead> SlaveReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Read the next master message. A closed stream is fatal to the caller.
    pub fn read(&mut self) -> Result<(MasterOut, String)> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line)?;
        if n == 0 {
            return Err(Error::StreamClosed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        codec::decode_master_line(trimmed)
    }

    /// Read the next message and require it to be of the given type.
    pub fn expect(&mut self, expected: MasterOut) -> Result<String> {
        let (kind, payload) = self.read()?;
        if kind != expected {
            return Err(Error::Protocol(format!("Expected: {expected} but was: {kind}")));
        }
        Ok(payload)
    }

    pub fn read_command(&mut self) -> Result<Command> {
        let raw = self.expect(MasterOut::Command)?;
        raw.parse().map_err(Error::Protocol)
    }
}

/// Writing half of the runner-side connection. Cloneable so the logger and
/// the command loop can share the single ordered output stream.
#[derive(Clone)]
pub struct SlaveSender {
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl SlaveSender {
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self { writer: Arc::new(Mutex::new(writer)) }
    }

    /// Write one message, flushed immediately, never batched.
    pub fn send(&self, kind: SlaveOut, payload: &str) -> Result<()> {
        let line = codec::encode(kind.as_str(), payload);
        let mut writer = self.writer.lock().expect("slave writer poisoned");
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }

    pub fn send_value(&self, payload: &str) -> Result<()> {
        self.send(SlaveOut::Value, payload)
    }
}

/// Connect the runner side over its own stdin/stdout. Stdout is reserved for
/// the protocol from this point on; diagnostics must go to stderr.
pub fn stdio_slave() -> (SlaveReader<io::StdinLock<'static>>, SlaveSender) {
    let reader = SlaveReader::new(io::stdin().lock());
    let sender = SlaveSender::new(Box::new(io::stdout()));
    (reader, sender)
}
