use hl_protocol::{SlaveOut, SlaveSender};

/// Logger of the runner process. Lines go to the master over the wire, which
/// re-emits them through its own logger at the matching level.
#[derive(Clone)]
pub struct ProxyLogger {
    sender: SlaveSender,
}

impl ProxyLogger {
    pub fn new(sender: SlaveSender) -> Self {
        Self { sender }
    }

    fn send(&self, kind: SlaveOut, message: &str) {
        if let Err(e) = self.sender.send(kind, message) {
            // The wire is gone; stderr is all that is left.
            eprintln!("[{kind:?}] {message} (wire send failed: {e})");
        }
    }

    pub fn error(&self, message: &str) {
        self.send(SlaveOut::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.send(SlaveOut::Warning, message);
    }

    pub fn info(&self, message: &str) {
        self.send(SlaveOut::Info, message);
    }
}
