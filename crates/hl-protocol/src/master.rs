use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

use hl_core::{Error, Result};

use crate::codec::{self, MasterOut, SlaveFrame};
use crate::command::Command;

/// Master side of the connection, generic over the child's pipes so tests can
/// drive it with in-memory streams.
pub struct MasterConnection<R, W> {
    reader: BufReader<R>,
    writer: W,
}

impl<R, W> MasterConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader: BufReader::new(reader), writer }
    }

    async fn write(&mut self, kind: MasterOut, payload: &str) -> Result<()> {
        let mut line = codec::encode(kind.as_str(), payload);
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }

    pub async fn write_command(&mut self, command: Command) -> Result<()> {
        self.write(MasterOut::Command, command.as_str()).await
    }

    pub async fn write_value(&mut self, payload: &str) -> Result<()> {
        self.write(MasterOut::Value, payload).await
    }

    /// Read the next frame from the runner. Blocks until a line arrives;
    /// a closed stream is fatal to the caller, not retried.
    pub async fn read(&mut self) -> Result<SlaveFrame> {
        let mut line = String::new();
        let n = self.reader.read_line(&mut line).await?;
        if n == 0 {
            return Err(Error::StreamClosed);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']);
        codec::decode_slave_line(trimmed)
    }
}
