//! Newline-delimited JSON transport over stdio

use serde::{de::DeserializeOwned, Serialize};
use std::io;
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter, Stdin, Stdout,
};
use tracing::trace;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Reads and writes single-line JSON messages, with no knowledge of the
/// protocol semantics. Generic over the handles so tests can substitute
/// in-memory readers and writers.
pub struct StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    reader: R,
    writer: BufWriter<W>,
}

impl StdioTransport<BufReader<Stdin>, Stdout> {
    /// Create a transport over the process's stdin/stdout
    pub fn stdio() -> Self {
        Self::from_handles(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> StdioTransport<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn from_handles(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer: BufWriter::new(writer),
        }
    }

    /// Read the next message. `Ok(None)` means EOF; blank lines are skipped.
    pub async fn read_message<T>(&mut self) -> TransportResult<Option<T>>
    where
        T: DeserializeOwned,
    {
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await? == 0 {
                trace!("EOF on transport input");
                return Ok(None);
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            trace!(message = %trimmed, "received");
            return Ok(Some(serde_json::from_str(trimmed)?));
        }
    }

    /// Serialize `message` as one line and flush immediately
    pub async fn write_message<T>(&mut self, message: &T) -> TransportResult<()>
    where
        T: Serialize,
    {
        let json = serde_json::to_string(message)?;
        trace!(message = %json, "sending");

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }
}
