use std::io;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout, Instant};

use crate::error::HarnessError;
use crate::protocol::Command;

/// Size of a single receive chunk. Server replies are short; one chunk
/// usually carries a whole reply.
const RECV_BUFFER: usize = 1024;

/// How long `request` waits for a reply before reporting "no answer yet".
pub const READ_TIMEOUT: Duration = Duration::from_millis(100);

/// Owns one newline-delimited request/response connection to the game server.
///
/// The server occasionally pushes unsolicited lines between requests, for
/// example when another player moves, so replies are not strictly
/// synchronous. `request` therefore discards anything still buffered before
/// sending, which pairs the next incoming data with the command it just
/// wrote.
pub struct LineConnection {
    stream: Option<TcpStream>,
    label: String,
    read_timeout: Duration,
}

impl LineConnection {
    /// Attempts to establish a connection to `address` and return a ready
    /// `LineConnection`. The `label` tags this connection's log lines.
    pub async fn open(
        address: &str,
        label: &str,
        read_timeout: Duration,
    ) -> Result<Self, HarnessError> {
        let stream =
            TcpStream::connect(address)
                .await
                .map_err(|source| HarnessError::Connect {
                    address: address.to_owned(),
                    source,
                })?;
        log::debug!("[{label}] connected to {address}");

        Ok(Self {
            stream: Some(stream),
            label: label.to_owned(),
            read_timeout,
        })
    }

    /// Sends one command and waits briefly for the reply.
    ///
    /// Stale buffered input is drained and discarded first. Returns
    /// `Ok(None)` when nothing arrives within the read timeout; the caller
    /// decides whether to retry. A zero-length read means the server hung
    /// up, which ends this simulation.
    pub async fn request(&mut self, command: &Command) -> Result<Option<String>, HarnessError> {
        let label = self.label.clone();
        let stream = self
            .stream
            .as_mut()
            .ok_or(HarnessError::ConnectionClosed)?;

        let mut chunk = [0u8; RECV_BUFFER];

        // Discard whatever the server pushed since the last read.
        loop {
            match stream.try_read(&mut chunk) {
                Ok(0) => return Err(HarnessError::ConnectionClosed),
                Ok(n) => log::debug!("[{label}] discarded {n} stale bytes"),
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => break,
                Err(e) => return Err(HarnessError::Io(e)),
            }
        }

        stream.write_all(format!("{command}\n").as_bytes()).await?;
        log::debug!("[{label}] sent: {command}");

        // Accumulate chunks until a full line arrived or the deadline
        // passed. A reply without a newline is returned as-is at the
        // deadline.
        let deadline = Instant::now() + self.read_timeout;
        let mut reply = Vec::new();
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match timeout(remaining, stream.read(&mut chunk)).await {
                Err(_) => break,
                Ok(Ok(0)) => {
                    if reply.is_empty() {
                        return Err(HarnessError::ConnectionClosed);
                    }
                    break;
                }
                Ok(Ok(n)) => {
                    reply.extend_from_slice(&chunk[..n]);
                    if reply.contains(&b'\n') {
                        break;
                    }
                }
                Ok(Err(e)) => return Err(HarnessError::Io(e)),
            }
        }

        if reply.is_empty() {
            log::debug!("[{label}] no reply within {:?}", self.read_timeout);
            return Ok(None);
        }

        let text = String::from_utf8_lossy(&reply).into_owned();
        log::debug!("[{label}] received: {}", text.trim_end());
        Ok(Some(text))
    }

    /// Releases the socket. Safe to call more than once; requests issued
    /// after the first close report the connection as closed.
    pub async fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.shutdown().await;
            log::debug!("[{}] connection closed", self.label);
        }
    }
}

// ******************************************************************************************
// ************************************* UNIT TESTS *****************************************
// ******************************************************************************************
