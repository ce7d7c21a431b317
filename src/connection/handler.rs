//! Connection Handler Module
//!
//! This module handles individual client connections to linekv.
//! Each client gets its own handler task that runs in a loop,
//! reading lines and sending responses.
//!
//! ## Connection Lifecycle
//!
//! ```text
//!            ┌──────────────────────────────────────┐
//!            │                                      │
//!            ▼                                      │
//!       ┌─────────┐  line   ┌───────────┐  result  ┌─────────┐
//!  ───> │ Reading │ ──────> │ Executing │ ───────> │ Writing │
//!       └────┬────┘         └───────────┘          └────┬────┘
//!            │ EOF / read error / timeout / shutdown    │ write error / timeout
//!            ▼                                          ▼
//!       ┌──────────────────────────────────────────────────┐
//!       │                     Closed                       │
//!       └──────────────────────────────────────────────────┘
//! ```
//!
//! Requests on one connection are strictly sequential: the response to a
//! line is written and flushed before the next line is parsed.
//!
//! ## Buffer Management
//!
//! TCP is a stream protocol, so a read may return part of a line or several
//! lines at once. Incoming bytes accumulate in a `BytesMut` buffer and
//! complete lines are split off the front of it.

use crate::commands::CommandExecutor;
use crate::config::ConnectionConfig;
use crate::protocol::{parse_command, split_line, CommandResult};
use bytes::BytesMut;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufWriter};
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, info, trace, warn};

/// Initial buffer capacity
const INITIAL_BUFFER_SIZE: usize = 4096;

/// Statistics for connection handling
#[derive(Debug, Default)]
pub struct ConnectionStats {
    /// Total number of connections accepted
    pub connections_accepted: AtomicU64,
    /// Currently active connections
    pub active_connections: AtomicU64,
    /// Total commands processed
    pub commands_processed: AtomicU64,
    /// Commands answered with `ERROR:`
    pub protocol_errors: AtomicU64,
    /// Total bytes read
    pub bytes_read: AtomicU64,
    /// Total bytes written
    pub bytes_written: AtomicU64,
}

impl ConnectionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection_opened(&self) {
        self.connections_accepted.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn command_processed(&self, result: &CommandResult) {
        self.commands_processed.fetch_add(1, Ordering::Relaxed);
        if result.is_error() {
            self.protocol_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn bytes_read(&self, count: usize) {
        self.bytes_read.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn bytes_written(&self, count: usize) {
        self.bytes_written
            .fetch_add(count as u64, Ordering::Relaxed);
    }
}

/// Handles a single client connection.
///
/// This struct owns the stream, the read buffer and the per-connection
/// limits for one connected client. Nothing else touches the stream.
pub struct ConnectionHandler<S> {
    /// The client stream
    stream: BufWriter<S>,

    /// Client's address (for logging)
    addr: SocketAddr,

    /// Buffer for incoming data
    buffer: BytesMut,

    /// Executes commands against the shared table
    executor: CommandExecutor,

    limits: ConnectionConfig,

    /// Flips to `true` when the server is shutting down
    shutdown: watch::Receiver<bool>,

    /// Connection statistics (shared)
    stats: Arc<ConnectionStats>,
}

impl<S> ConnectionHandler<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Creates a new connection handler.
    ///
    /// # Arguments
    ///
    /// * `stream` - The client stream for this connection
    /// * `addr` - The client's socket address
    /// * `executor` - Executes commands against the shared table
    /// * `limits` - Line length and timeout limits
    /// * `shutdown` - Server shutdown notification
    /// * `stats` - Shared connection statistics
    pub fn new(
        stream: S,
        addr: SocketAddr,
        executor: CommandExecutor,
        limits: ConnectionConfig,
        shutdown: watch::Receiver<bool>,
        stats: Arc<ConnectionStats>,
    ) -> Self {
        stats.connection_opened();

        Self {
            stream: BufWriter::new(stream),
            addr,
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_SIZE),
            executor,
            limits,
            shutdown,
            stats,
        }
    }

    /// Runs the connection until the client disconnects, an error occurs,
    /// or the server shuts down.
    ///
    /// A clean close by the client is reported as `Ok(())`.
    pub async fn run(mut self) -> Result<(), ConnectionError> {
        info!(client = %self.addr, "Client connected");

        let result = match self.main_loop().await {
            Err(ConnectionError::ClientDisconnected) => Ok(()),
            other => other,
        };

        match &result {
            Ok(()) => info!(client = %self.addr, "Client disconnected"),
            Err(e) if e.is_expected() => debug!(client = %self.addr, reason = %e, "Connection closed"),
            Err(e) => warn!(client = %self.addr, error = %e, "Connection error"),
        }

        result
    }

    /// The read-execute-respond loop.
    async fn main_loop(&mut self) -> Result<(), ConnectionError> {
        loop {
            while let Some(line) = split_line(&mut self.buffer) {
                // A shutdown lets the request being executed finish, but no
                // further buffered line is started.
                if *self.shutdown.borrow() {
                    return Err(ConnectionError::Shutdown);
                }

                if line.len() > self.limits.max_line_length {
                    return Err(self.line_too_long(line.len()));
                }

                let command = parse_command(line);
                trace!(client = %self.addr, command = command.name(), "Parsed line");
                let result = self.executor.execute(command);
                self.stats.command_processed(&result);

                self.send_response(&result).await?;
            }

            self.read_more_data().await?;
        }
    }

    /// Reads more data from the stream into the buffer.
    async fn read_more_data(&mut self) -> Result<(), ConnectionError> {
        // No complete line is buffered, so the whole buffer is one partial
        // line. One extra byte is allowed for a CR that framing strips.
        if self.buffer.len() > self.limits.max_line_length + 1 {
            return Err(self.line_too_long(self.buffer.len()));
        }

        if self.buffer.capacity() - self.buffer.len() < 1024 {
            self.buffer.reserve(INITIAL_BUFFER_SIZE);
        }

        let read = read_with_timeout(
            self.stream.get_mut(),
            &mut self.buffer,
            self.limits.idle_timeout,
        );

        let n = tokio::select! {
            biased;
            _ = shutdown_requested(&mut self.shutdown) => {
                return Err(ConnectionError::Shutdown);
            }
            n = read => n?,
        };

        if n == 0 {
            if self.buffer.is_empty() {
                return Err(ConnectionError::ClientDisconnected);
            } else {
                // Partial line in buffer
                return Err(ConnectionError::UnexpectedEof);
            }
        }

        self.stats.bytes_read(n);
        trace!(client = %self.addr, bytes = n, "Read data");

        Ok(())
    }

    fn line_too_long(&self, size: usize) -> ConnectionError {
        warn!(client = %self.addr, size, "Request line too long");
        ConnectionError::LineTooLong(self.limits.max_line_length)
    }

    /// Writes one response line and flushes it to the client.
    async fn send_response(&mut self, result: &CommandResult) -> Result<(), ConnectionError> {
        let bytes = result.serialize();
        let write_timeout = self.limits.write_timeout;

        let stream = &mut self.stream;
        let write = async {
            stream.write_all(&bytes).await?;
            stream.flush().await
        };
        match write_timeout {
            Some(limit) => timeout(limit, write)
                .await
                .map_err(|_| ConnectionError::WriteTimeout(limit))??,
            None => write.await?,
        }

        self.stats.bytes_written(bytes.len());
        trace!(client = %self.addr, bytes = bytes.len(), "Sent response");
        Ok(())
    }
}

impl<S> Drop for ConnectionHandler<S> {
    // Also runs when the task is aborted at the end of the grace period.
    fn drop(&mut self) {
        self.stats.connection_closed();
    }
}

async fn read_with_timeout<S>(
    stream: &mut S,
    buffer: &mut BytesMut,
    limit: Option<Duration>,
) -> Result<usize, ConnectionError>
where
    S: AsyncRead + Unpin,
{
    match limit {
        Some(limit) => timeout(limit, stream.read_buf(buffer))
            .await
            .map_err(|_| ConnectionError::ReadTimeout(limit))?
            .map_err(ConnectionError::from),
        None => Ok(stream.read_buf(buffer).await?),
    }
}

/// Resolves once shutdown has been signalled.
///
/// If the sender is gone no shutdown can ever arrive, so this never resolves.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let sender_gone = shutdown.wait_for(|stop| *stop).await.is_err();
    if sender_gone {
        std::future::pending::<()>().await;
    }
}

/// Errors that can end a connection.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// I/O error (network issue)
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Client disconnected normally
    #[error("Client disconnected")]
    ClientDisconnected,

    /// Stream ended in the middle of a line
    #[error("Unexpected end of stream")]
    UnexpectedEof,

    /// A request line is longer than the configured limit
    #[error("Request line exceeds {0} bytes")]
    LineTooLong(usize),

    #[error("No request received within {0:?}")]
    ReadTimeout(Duration),

    #[error("Response not written within {0:?}")]
    WriteTimeout(Duration),

    /// The server is shutting down
    #[error("Server shutting down")]
    Shutdown,
}

impl ConnectionError {
    /// Returns true for the ordinary ways a connection ends.
    pub fn is_expected(&self) -> bool {
        match self {
            ConnectionError::ClientDisconnected
            | ConnectionError::UnexpectedEof
            | ConnectionError::ReadTimeout(_)
            | ConnectionError::Shutdown => true,
            ConnectionError::IoError(e) => matches!(
                e.kind(),
                std::io::ErrorKind::ConnectionReset | std::io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

/// Handles a TCP client connection.
///
/// This is a convenience function that creates a ConnectionHandler
/// and runs it to completion. Errors are logged by the handler itself.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    executor: CommandExecutor,
    limits: ConnectionConfig,
    shutdown: watch::Receiver<bool>,
    stats: Arc<ConnectionStats>,
) {
    let handler = ConnectionHandler::new(stream, addr, executor, limits, shutdown, stats);
    let _ = handler.run().await;
}
